use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::resource::{self, Resource};
use super::{ApiError, AppState, Operation};
use crate::error::Result;
use crate::listing::UserStats;
use crate::model::{EntityKind, NewUser, User, UserPatch};
use crate::storage::Storage;

impl Resource for User {
    const KIND: EntityKind = EntityKind::User;
    type New = NewUser;
    type Patch = UserPatch;

    fn list(storage: &Storage) -> Result<Vec<Self>> {
        storage.list_users()
    }

    fn get(storage: &Storage, id: i64) -> Result<Option<Self>> {
        storage.get_user(id)
    }

    fn create(storage: &Storage, new: Self::New) -> Result<Self> {
        storage.create_user(new)
    }

    fn update(storage: &Storage, id: i64, patch: Self::Patch) -> Result<Self> {
        storage.update_user(id, patch)
    }

    fn delete(storage: &Storage, id: i64) -> Result<bool> {
        storage.delete_user(id)
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/stats", get(stats))
        .merge(resource::routes::<User>())
}

async fn stats(State(state): State<AppState>) -> std::result::Result<Json<UserStats>, ApiError> {
    state
        .with_storage(|storage| storage.list_users())
        .map(|users| Json(UserStats::tally(&users)))
        .map_err(|err| ApiError::from_error(EntityKind::User, Operation::Stats, &err))
}
