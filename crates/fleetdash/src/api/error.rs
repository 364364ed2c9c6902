//! HTTP error responses.
//!
//! Handlers turn a crate [`Error`] into an [`ApiError`] that carries only a
//! generic message; the detailed error goes to the log.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::Error;
use crate::model::EntityKind;

/// What a handler was doing when it failed. Picks the response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Listing a collection.
    List,
    /// Reading one record.
    Fetch,
    /// Creating a record.
    Create,
    /// Updating a record.
    Update,
    /// Deleting a record.
    Delete,
    /// Moving a device to an organization.
    Assign,
    /// Tallying a collection.
    Stats,
}

/// An error response: status code plus `{"message": "..."}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl ApiError {
    /// An error response with the given status and message.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map a storage failure on `entity` during `op`.
    ///
    /// Not-found becomes 404 naming the missing record's kind, bad input
    /// 400, anything else 500. An update that names a missing record is
    /// bad input like any other failed update.
    #[must_use]
    pub fn from_error(entity: EntityKind, op: Operation, err: &Error) -> Self {
        if let Error::NotFound { entity: missing, .. } = err {
            if op != Operation::Update {
                debug!("{op:?} {} rejected: {err}", entity.plural());
                return Self::not_found(*missing);
            }
        }

        let status = if err.is_invalid_input() || err.is_not_found() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            error!("{op:?} {} failed: {err}", entity.plural());
        } else {
            debug!("{op:?} {} rejected: {err}", entity.plural());
        }

        Self::new(status, message(entity, op, status))
    }

    /// The record addressed by the path does not exist.
    #[must_use]
    pub fn not_found(entity: EntityKind) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} not found", entity.title()))
    }

    /// The request body could not be read as the expected JSON.
    #[must_use]
    pub fn bad_body(entity: EntityKind, op: Operation, rejection: &JsonRejection) -> Self {
        debug!("Rejected {} body: {rejection}", entity.singular());
        Self::new(
            StatusCode::BAD_REQUEST,
            message(entity, op, StatusCode::BAD_REQUEST),
        )
    }

    /// The id in the path is not an integer.
    #[must_use]
    pub fn bad_path(entity: EntityKind, rejection: &PathRejection) -> Self {
        debug!("Rejected {} path: {rejection}", entity.singular());
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Invalid {} id", entity.singular()),
        )
    }

    /// The query string could not be parsed.
    #[must_use]
    pub fn bad_query(rejection: &QueryRejection) -> Self {
        debug!("Rejected query string: {rejection}");
        Self::new(StatusCode::BAD_REQUEST, "Invalid query parameters")
    }

    /// Generic 500 for failures that are not about one entity.
    #[must_use]
    pub fn internal(message: impl Into<String>, err: &Error) -> Self {
        let message = message.into();
        error!("{message}: {err}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

fn message(entity: EntityKind, op: Operation, status: StatusCode) -> String {
    let one = entity.singular();
    match (op, status) {
        (Operation::Create, StatusCode::BAD_REQUEST) => format!("Invalid {one} data"),
        (Operation::List, _) => format!("Failed to fetch {}", entity.plural()),
        (Operation::Fetch, _) => format!("Failed to fetch {one}"),
        (Operation::Create, _) => format!("Failed to create {one}"),
        (Operation::Update, _) => format!("Failed to update {one}"),
        (Operation::Delete, _) => format!("Failed to delete {one}"),
        (Operation::Assign, _) => format!("Failed to assign {one}"),
        (Operation::Stats, _) => format!("Failed to fetch {one} stats"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            message: &self.message,
        });
        (self.status, body).into_response()
    }
}
