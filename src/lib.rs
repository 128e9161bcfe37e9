//! hello-eks: a greeting and health-check HTTP service.
//!
//! Serves `GET /` with a fixed greeting and `GET /health` with `OK` for
//! Kubernetes probes. Every other path is a plain-text 404.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use crate::http::{start_server, ServerError};
pub use routes::create_router;
