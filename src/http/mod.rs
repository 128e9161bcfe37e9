//! HTTP server module.
//!
//! Binds the listener, announces the bound port, serves the router and drains
//! connections on SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{bind, serve, start_server, ServerError};
pub use shutdown::shutdown_signal;
