//! Health check endpoint for container orchestration.
//!
//! Serves both the liveness and readiness probes of the Deployment. The
//! service holds no state, so being able to answer is the whole check.

use crate::config::HEALTH_OK;

/// Health check handler.
pub async fn health() -> &'static str {
    HEALTH_OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_returns_ok() {
        assert_eq!(health().await, "OK");
    }
}
