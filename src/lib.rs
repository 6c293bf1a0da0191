//! Correlation is a Tower middleware that attaches a correlation ID to every
//! HTTP request and, optionally, to its response.
//!
//! If an inbound request already carries a non-empty value under the
//! configured header it is forwarded unchanged; otherwise a new identifier
//! is generated with the configured strategy. Generation never fails the
//! request: on entropy or clock errors a degraded identifier is used.
//!
//! ```rust,no_run
//! use axum::{routing::get, Router};
//! use correlation::{Correlation, CorrelationId, IdType, Options};
//!
//! let correlation = Correlation::new(Options {
//!     id_type: IdType::Cuid,
//!     ..Options::default()
//! });
//!
//! let app: Router = Router::new()
//!     .route("/foo", get(|id: CorrelationId| async move { id.to_string() }))
//!     .layer(correlation.layer());
//! ```
//!
//! # Architecture
//!
//! - [`middleware`] -- [`Correlation`], the tower layer/service pair, the
//!   axum chain functions, and the [`CorrelationId`] extractor.
//! - [`id`] -- Identifier strategies (UUID, CUID, random, time, custom) with
//!   fail-open fallbacks.
//! - [`config`] -- [`Options`] model, validation, and loading from files and
//!   environment variables.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Optional `tracing-subscriber` setup for hosts.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML options file support _(enabled by default)_ |
//! | `json` | JSON options file support |
//! | `toml` | TOML options file support |

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod id;
pub mod logging;
pub mod middleware;

pub use config::model::Options;
pub use error::CorrelationError;
pub use id::IdType;
pub use middleware::{
    with_next, with_next_request_only, Correlation, CorrelationId, CorrelationLayer,
    CorrelationService, DEFAULT_HEADER,
};
