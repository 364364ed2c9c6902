use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::resource::{self, Resource};
use super::{ApiError, AppState, Operation};
use crate::error::{Error, Result};
use crate::listing::OrganizationStats;
use crate::model::{Device, EntityKind, NewOrganization, Organization, OrganizationPatch, User};
use crate::storage::Storage;

impl Resource for Organization {
    const KIND: EntityKind = EntityKind::Organization;
    type New = NewOrganization;
    type Patch = OrganizationPatch;

    fn list(storage: &Storage) -> Result<Vec<Self>> {
        storage.list_organizations()
    }

    fn get(storage: &Storage, id: i64) -> Result<Option<Self>> {
        storage.get_organization(id)
    }

    fn create(storage: &Storage, new: Self::New) -> Result<Self> {
        storage.create_organization(new)
    }

    fn update(storage: &Storage, id: i64, patch: Self::Patch) -> Result<Self> {
        storage.update_organization(id, patch)
    }

    fn delete(storage: &Storage, id: i64) -> Result<bool> {
        storage.delete_organization(id)
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations/stats", get(stats))
        .route("/organizations/{id}/devices", get(devices))
        .route("/organizations/{id}/users", get(users))
        .merge(resource::routes::<Organization>())
}

async fn stats(State(state): State<AppState>) -> std::result::Result<Json<OrganizationStats>, ApiError> {
    state
        .with_storage(|storage| storage.list_organizations())
        .map(|orgs| Json(OrganizationStats::tally(&orgs)))
        .map_err(|err| ApiError::from_error(EntityKind::Organization, Operation::Stats, &err))
}

/// Run `f` for an existing organization, or fail with not-found.
fn members<T>(
    state: &AppState,
    id: i64,
    entity: EntityKind,
    f: impl FnOnce(&Storage) -> Result<Vec<T>>,
) -> std::result::Result<Json<Vec<T>>, ApiError> {
    state
        .with_storage(|storage| {
            storage
                .get_organization(id)?
                .ok_or_else(|| Error::not_found(EntityKind::Organization, id))?;
            f(storage)
        })
        .map(Json)
        .map_err(|err| ApiError::from_error(entity, Operation::List, &err))
}

async fn devices(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> std::result::Result<Json<Vec<Device>>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::bad_path(EntityKind::Organization, &rejection))?;
    members(&state, id, EntityKind::Device, |storage| {
        storage.devices_by_organization(id)
    })
}

async fn users(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> std::result::Result<Json<Vec<User>>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::bad_path(EntityKind::Organization, &rejection))?;
    members(&state, id, EntityKind::User, |storage| {
        storage.users_by_organization(id)
    })
}
