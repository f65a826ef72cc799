//! Health check endpoints.
//!
//! These endpoints are used by load balancers and orchestrators to verify
//! service health.

use axum::{Json, extract::State, http::StatusCode};
use openhouse_core::providers::PersistenceGateway;
use serde::Serialize;
use std::sync::Arc;

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the process is serving requests. Does NOT check
/// the database.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    /// `ready` or `unavailable`.
    pub status: &'static str,
    /// `ok` or `unreachable`.
    pub database: &'static str,
}

/// Readiness check: pings the database through the gateway.
///
/// # Status Codes
///
/// - 200 OK: database reachable
/// - 503 Service Unavailable: ping failed
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
///
/// # Response
///
/// ```json
/// { "status": "ready", "database": "ok" }
/// ```
pub async fn readiness_check<G>(State(gateway): State<Arc<G>>) -> (StatusCode, Json<Readiness>)
where
    G: PersistenceGateway,
{
    match gateway.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Readiness {
                status: "ready",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Readiness {
                    status: "unavailable",
                    database: "unreachable",
                }),
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use openhouse_core::DomainError;
    use openhouse_core::providers::UnitOfWork;

    struct NoopTx;

    impl UnitOfWork for NoopTx {
        async fn commit(self) -> openhouse_core::Result<()> {
            Ok(())
        }

        async fn rollback(self) -> openhouse_core::Result<()> {
            Ok(())
        }
    }

    struct StubGateway {
        reachable: bool,
    }

    impl PersistenceGateway for StubGateway {
        type Tx = NoopTx;

        async fn begin(&self) -> openhouse_core::Result<NoopTx> {
            Ok(NoopTx)
        }

        async fn ping(&self) -> openhouse_core::Result<()> {
            if self.reachable {
                Ok(())
            } else {
                Err(DomainError::Database("connection refused".to_string()))
            }
        }
    }

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_readiness_with_reachable_database() {
        let gateway = Arc::new(StubGateway { reachable: true });
        let (status, Json(report)) = readiness_check(State(gateway)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, "ready");
    }

    #[tokio::test]
    async fn test_readiness_with_unreachable_database() {
        let gateway = Arc::new(StubGateway { reachable: false });
        let (status, Json(report)) = readiness_check(State(gateway)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.database, "unreachable");
    }
}
