//! Greeting handler for the root path.

use tracing::instrument;

use crate::config::GREETING;

/// Root handler. Always answers with the same greeting.
#[instrument(name = "home::index")]
pub async fn index() -> &'static str {
    GREETING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn index_returns_greeting() {
        assert_eq!(index().await, "Hello from Node.js on EKS!");
    }
}
