pub mod catalog;
pub mod reports;
pub mod u501_closures;
pub mod u502_billing;
pub mod u503_positions;
pub mod u504_tanks;
pub mod u505_catalog;

use axum::{http::StatusCode, Json};
use contracts::shared::response::ApiErrorBody;

/// Error half of every business handler
pub type ApiError = (StatusCode, Json<ApiErrorBody>);

/// 500 with a fixed message and the cause in `message`
pub fn failure(error: &str, cause: &anyhow::Error) -> ApiError {
    tracing::error!("{}: {:#}", error, cause);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorBody {
            ok: false,
            error: Some(error.to_string()),
            message: Some(format!("{:#}", cause)),
        }),
    )
}

pub fn bad_request(error: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ApiErrorBody::error(error)))
}

pub fn not_found(error: impl Into<String>) -> ApiError {
    (StatusCode::NOT_FOUND, Json(ApiErrorBody::error(error)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_keeps_cause_chain() {
        let cause = anyhow::anyhow!("connection refused").context("loading closures");
        let (status, Json(body)) = failure("Error al sincronizar cierres", &cause);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.ok);
        assert_eq!(body.error.as_deref(), Some("Error al sincronizar cierres"));
        assert_eq!(
            body.message.as_deref(),
            Some("loading closures: connection refused")
        );
    }
}
