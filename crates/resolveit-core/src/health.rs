use axum::http::StatusCode;

/// Handler for `GET /healthz`: the process is up and serving HTTP.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Map a readiness probe outcome to a status code.
///
/// Services run their own dependency checks (database ping etc.) and pass the
/// result here so every `/readyz` answers the same way.
pub fn readiness<E: std::fmt::Display>(probe: Result<(), E>) -> StatusCode {
    match probe {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
