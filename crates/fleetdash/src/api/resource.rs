//! The CRUD routes shared by every collection.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ApiError, AppState, Operation};
use crate::error::Result;
use crate::listing::{ListQuery, Listable, Listing};
use crate::model::EntityKind;
use crate::storage::Storage;

/// A record type served under `/api/{collection}`.
pub trait Resource: Listable + Serialize + Send + Sized + 'static {
    /// Which collection this is.
    const KIND: EntityKind;

    /// Create payload.
    type New: DeserializeOwned + Send + 'static;
    /// Update payload.
    type Patch: DeserializeOwned + Send + 'static;

    /// All records, ordered by id.
    fn list(storage: &Storage) -> Result<Vec<Self>>;
    /// One record, if it exists.
    fn get(storage: &Storage, id: i64) -> Result<Option<Self>>;
    /// Insert a record.
    fn create(storage: &Storage, new: Self::New) -> Result<Self>;
    /// Patch an existing record.
    fn update(storage: &Storage, id: i64, patch: Self::Patch) -> Result<Self>;
    /// Remove a record; `false` if it was absent.
    fn delete(storage: &Storage, id: i64) -> Result<bool>;
}

/// `GET`/`POST` on the collection and `GET`/`PUT`/`DELETE` on one record.
pub(super) fn routes<R: Resource>() -> Router<AppState> {
    let collection = format!("/{}", R::KIND.collection());
    let record = format!("{collection}/{{id}}");

    Router::new()
        .route(&collection, get(list::<R>).post(create::<R>))
        .route(&record, get(fetch::<R>).put(update::<R>).delete(remove::<R>))
}

async fn list<R: Resource>(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> std::result::Result<Json<Listing<R>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_query(&rejection))?;
    let records = state
        .with_storage(R::list)
        .map_err(|err| ApiError::from_error(R::KIND, Operation::List, &err))?;
    Ok(Json(query.apply(records, &state.config().pagination)))
}

async fn fetch<R: Resource>(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> std::result::Result<Json<R>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::bad_path(R::KIND, &rejection))?;
    state
        .with_storage(|storage| R::get(storage, id))
        .map_err(|err| ApiError::from_error(R::KIND, Operation::Fetch, &err))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(R::KIND))
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    body: std::result::Result<Json<R::New>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<R>), ApiError> {
    let Json(new) =
        body.map_err(|rejection| ApiError::bad_body(R::KIND, Operation::Create, &rejection))?;
    let record = state
        .with_storage(|storage| R::create(storage, new))
        .map_err(|err| ApiError::from_error(R::KIND, Operation::Create, &err))?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update<R: Resource>(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<R::Patch>, JsonRejection>,
) -> std::result::Result<Json<R>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::bad_path(R::KIND, &rejection))?;
    let Json(patch) =
        body.map_err(|rejection| ApiError::bad_body(R::KIND, Operation::Update, &rejection))?;
    state
        .with_storage(|storage| R::update(storage, id, patch))
        .map(Json)
        .map_err(|err| ApiError::from_error(R::KIND, Operation::Update, &err))
}

async fn remove<R: Resource>(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> std::result::Result<StatusCode, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::bad_path(R::KIND, &rejection))?;
    state
        .with_storage(|storage| R::delete(storage, id))
        .map_err(|err| ApiError::from_error(R::KIND, Operation::Delete, &err))?;
    Ok(StatusCode::NO_CONTENT)
}
