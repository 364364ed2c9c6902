use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use super::resource::{self, Resource};
use super::{ApiError, AppState, Operation};
use crate::error::Result;
use crate::listing::SimStats;
use crate::model::{EntityKind, NewSim, Sim, SimPatch};
use crate::storage::Storage;

impl Resource for Sim {
    const KIND: EntityKind = EntityKind::Sim;
    type New = NewSim;
    type Patch = SimPatch;

    fn list(storage: &Storage) -> Result<Vec<Self>> {
        storage.list_sims()
    }

    fn get(storage: &Storage, id: i64) -> Result<Option<Self>> {
        storage.get_sim(id)
    }

    fn create(storage: &Storage, new: Self::New) -> Result<Self> {
        storage.create_sim(new)
    }

    fn update(storage: &Storage, id: i64, patch: Self::Patch) -> Result<Self> {
        storage.update_sim(id, patch)
    }

    fn delete(storage: &Storage, id: i64) -> Result<bool> {
        storage.delete_sim(id)
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/sims/stats", get(stats))
        .merge(resource::routes::<Sim>())
}

async fn stats(State(state): State<AppState>) -> std::result::Result<Json<SimStats>, ApiError> {
    state
        .with_storage(|storage| storage.list_sims())
        .map(|sims| Json(SimStats::tally(&sims)))
        .map_err(|err| ApiError::from_error(EntityKind::Sim, Operation::Stats, &err))
}
