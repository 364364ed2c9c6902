//! `fleetdash` - Device and SIM fleet administration service
//!
//! This library provides the record model, `SQLite` storage, listing and
//! analytics computations, and the REST API served by the `fleetdash`
//! binary.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod listing;
pub mod logging;
pub mod model;
pub mod password;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::Storage;
