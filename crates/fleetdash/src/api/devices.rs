use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::resource::{self, Resource};
use super::{ApiError, AppState, Operation};
use crate::error::Result;
use crate::listing::DeviceStats;
use crate::model::{Device, DevicePatch, EntityKind, NewDevice};
use crate::storage::Storage;

impl Resource for Device {
    const KIND: EntityKind = EntityKind::Device;
    type New = NewDevice;
    type Patch = DevicePatch;

    fn list(storage: &Storage) -> Result<Vec<Self>> {
        storage.list_devices()
    }

    fn get(storage: &Storage, id: i64) -> Result<Option<Self>> {
        storage.get_device(id)
    }

    fn create(storage: &Storage, new: Self::New) -> Result<Self> {
        storage.create_device(new)
    }

    fn update(storage: &Storage, id: i64, patch: Self::Patch) -> Result<Self> {
        storage.update_device(id, patch)
    }

    fn delete(storage: &Storage, id: i64) -> Result<bool> {
        storage.delete_device(id)
    }
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices/stats", get(stats))
        .route("/devices/{id}/assign", post(assign))
        .merge(resource::routes::<Device>())
}

async fn stats(State(state): State<AppState>) -> std::result::Result<Json<DeviceStats>, ApiError> {
    state
        .with_storage(|storage| storage.list_devices())
        .map(|devices| Json(DeviceStats::tally(&devices)))
        .map_err(|err| ApiError::from_error(EntityKind::Device, Operation::Stats, &err))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody {
    organization_id: i64,
}

async fn assign(
    State(state): State<AppState>,
    path: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<AssignBody>, JsonRejection>,
) -> std::result::Result<Json<Device>, ApiError> {
    let Path(id) = path.map_err(|rejection| ApiError::bad_path(EntityKind::Device, &rejection))?;
    let Json(body) = body
        .map_err(|rejection| ApiError::bad_body(EntityKind::Device, Operation::Assign, &rejection))?;
    state
        .with_storage(|storage| storage.assign_device(id, body.organization_id))
        .map(Json)
        .map_err(|err| ApiError::from_error(EntityKind::Device, Operation::Assign, &err))
}
