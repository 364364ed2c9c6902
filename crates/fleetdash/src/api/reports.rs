use axum::Router;

use super::resource::{self, Resource};
use super::AppState;
use crate::error::Result;
use crate::model::{EntityKind, NewReport, Report, ReportPatch};
use crate::storage::Storage;

impl Resource for Report {
    const KIND: EntityKind = EntityKind::Report;
    type New = NewReport;
    type Patch = ReportPatch;

    fn list(storage: &Storage) -> Result<Vec<Self>> {
        storage.list_reports()
    }

    fn get(storage: &Storage, id: i64) -> Result<Option<Self>> {
        storage.get_report(id)
    }

    fn create(storage: &Storage, new: Self::New) -> Result<Self> {
        storage.create_report(new)
    }

    fn update(storage: &Storage, id: i64, patch: Self::Patch) -> Result<Self> {
        storage.update_report(id, patch)
    }

    fn delete(storage: &Storage, id: i64) -> Result<bool> {
        storage.delete_report(id)
    }
}

pub(super) fn routes() -> Router<AppState> {
    resource::routes::<Report>()
}
