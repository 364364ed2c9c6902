//! REST API.
//!
//! Every collection gets the same five routes under `/api/{collection}`;
//! the per-entity modules add their stats and relation routes on top.

mod analytics;
mod devices;
mod error;
mod organizations;
mod reports;
mod resource;
mod server;
mod sims;
mod users;

use std::sync::{Arc, Mutex};

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

pub use error::{ApiError, Operation};
pub use resource::Resource;
pub use server::serve;

/// Shared router state.
///
/// The connection sits behind a mutex so every storage call is serialised.
#[derive(Debug, Clone)]
pub struct AppState {
    storage: Arc<Mutex<Storage>>,
    config: Arc<Config>,
}

impl AppState {
    /// Wrap an open storage and the active configuration.
    #[must_use]
    pub fn new(storage: Storage, config: Config) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            config: Arc::new(config),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `f` with exclusive access to the storage.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or an internal error if a previous
    /// holder of the lock panicked.
    pub fn with_storage<T>(&self, f: impl FnOnce(&Storage) -> Result<T>) -> Result<T> {
        let storage = self
            .storage
            .lock()
            .map_err(|_| Error::internal("storage lock poisoned"))?;
        f(&storage)
    }
}

/// Build the full router: `/health`, the `/api` tree, request tracing and
/// CORS.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(organizations::routes())
        .merge(devices::routes())
        .merge(sims::routes())
        .merge(users::routes())
        .merge(reports::routes())
        .merge(analytics::routes())
}

/// `["*"]` allows any origin; otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| origin.parse().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
