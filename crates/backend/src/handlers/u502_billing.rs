use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::shared::logger::IngestKind;
use contracts::shared::response::{ApiErrorBody, ApiResponse};
use contracts::usecases::common::{ImportProgress, ImportResponse};
use contracts::usecases::u502_sync_billing::{
    BillingSyncQuery, BillingSyncResult, IngestLogQuery, PassthroughQuery, SyncBillingRequest,
    SyncCounts,
};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{failure, not_found, ApiError};
use crate::shared::dates::yesterday;
use crate::shared::ingest_log::repository as ingest_log;
use crate::shared::station_api::{api_error, ApiError as VendorError};
use crate::usecases::common::ProgressTracker;
use crate::usecases::u502_sync_billing::{executor::resolve_range, SyncBillingExecutor};

const DEFAULT_LOG_LIMIT: u64 = 50;

static BILLING_EXECUTOR: Lazy<Arc<SyncBillingExecutor>> =
    Lazy::new(|| Arc::new(SyncBillingExecutor::new(Arc::new(ProgressTracker::new()))));

fn range_of(query: &BillingSyncQuery) -> (String, String) {
    resolve_range(query.fecha_inicio.as_deref(), query.fecha_fin.as_deref())
}

/// GET|POST /api/facturas/sync
pub async fn sync_invoices(
    Query(query): Query<BillingSyncQuery>,
) -> Result<Json<ApiResponse<SyncCounts>>, ApiError> {
    let (from, to) = range_of(&query);
    BILLING_EXECUTOR
        .sync_invoices(&from, &to)
        .await
        .map(|counts| Json(ApiResponse::with_message("Sincronización de facturas completada", counts)))
        .map_err(|e| failure("Error al sincronizar facturas", &e))
}

/// GET|POST /api/recibos/sync
pub async fn sync_receipts(
    Query(query): Query<BillingSyncQuery>,
) -> Result<Json<ApiResponse<SyncCounts>>, ApiError> {
    let (from, to) = range_of(&query);
    BILLING_EXECUTOR
        .sync_receipts(&from, &to)
        .await
        .map(|counts| Json(ApiResponse::with_message("Sincronización de recibos completada", counts)))
        .map_err(|e| failure("Error al sincronizar recibos", &e))
}

/// GET|POST /api/sync-facturacion
pub async fn sync_all(
    Query(query): Query<BillingSyncQuery>,
) -> Result<Json<ApiResponse<BillingSyncResult>>, ApiError> {
    let (from, to) = range_of(&query);
    BILLING_EXECUTOR
        .sync_all(&from, &to)
        .await
        .map(|result| Json(ApiResponse::with_message("Sincronización completa exitosa", result)))
        .map_err(|e| failure("Error en sincronización completa", &e))
}

/// POST /api/sync-historia
pub async fn sync_history() -> Result<Json<Value>, ApiError> {
    let result = BILLING_EXECUTOR
        .sync_history()
        .await
        .map_err(|e| failure("Error al descargar historia", &e))?;
    Ok(Json(json!({
        "ok": true,
        "message": "Descarga de historia completada",
        "periodos": result.data.len(),
        "data": result.data,
        "resumen": result.resumen
    })))
}

/// POST /api/test-sync. Each missing date falls back to yesterday.
pub async fn test_sync(Query(query): Query<BillingSyncQuery>) -> Result<Json<Value>, ApiError> {
    let ayer = yesterday().format("%Y-%m-%d").to_string();
    let pick = |value: Option<String>| {
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| ayer.clone())
    };
    let inicio = pick(query.fecha_inicio);
    let fin = pick(query.fecha_fin);
    tracing::info!("Manual billing sync: {} to {}", inicio, fin);

    let data = BILLING_EXECUTOR
        .sync_all(&inicio, &fin)
        .await
        .map_err(|e| failure("Error en sincronización manual", &e))?;
    Ok(Json(json!({
        "ok": true,
        "message": "Sincronización manual ejecutada",
        "fechas": { "inicio": inicio, "fin": fin },
        "data": data
    })))
}

/// GET /api/logs-facturacion?tipo=FACTURAS|RECIBOS&limit=50
pub async fn logs(Query(query): Query<IngestLogQuery>) -> Result<Json<Value>, ApiError> {
    let kind = query.tipo.as_deref().and_then(IngestKind::parse);
    let rows = ingest_log::list(kind, query.limit.unwrap_or(DEFAULT_LOG_LIMIT))
        .await
        .map_err(|e| failure("Error al obtener logs", &e))?;
    Ok(Json(json!({ "ok": true, "data": rows })))
}

/// POST /api/u502/start
pub async fn start(
    Json(request): Json<SyncBillingRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    BILLING_EXECUTOR
        .start(request)
        .await
        .map(Json)
        .map_err(|e| failure("No se pudo iniciar la sincronización", &e))
}

/// GET /api/u502/:session_id/progress
pub async fn progress(Path(session_id): Path<String>) -> Result<Json<ImportProgress>, ApiError> {
    BILLING_EXECUTOR
        .get_progress(&session_id)
        .map(Json)
        .ok_or_else(|| not_found("Sesión no encontrada"))
}

fn missing_dates(path: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Debes enviar desdeFecha y hastaFecha como parámetros de consulta (formato YYYY-MM-DD)",
            "ejemplo": format!("/api/{}?desdeFecha=2023-01-01&hastaFecha=2023-01-31", path)
        })),
    )
        .into_response()
}

/// Vendor status errors keep their status, HTML pages and everything else become 500
fn passthrough_error(what: &str, e: &anyhow::Error) -> Response {
    tracing::error!("Passthrough {} failed: {:#}", what, e);
    let (status, body) = match api_error(e) {
        Some(VendorError::Status { status, .. }) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            ApiErrorBody::error(format!("Error al obtener {}: {}", what, e)),
        ),
        Some(VendorError::HtmlPage) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorBody {
                ok: false,
                error: Some("Error en la respuesta de la API externa".into()),
                message: Some("La API devolvió una respuesta HTML en lugar de XML".into()),
            },
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorBody {
                ok: false,
                error: Some(format!("Error al obtener {}", what)),
                message: Some(format!("{:#}", e)),
            },
        ),
    };
    (status, Json(body)).into_response()
}

fn passthrough_dates(query: PassthroughQuery) -> Option<(String, String)> {
    let desde = query.desde_fecha.filter(|d| !d.trim().is_empty())?;
    let hasta = query.hasta_fecha.filter(|d| !d.trim().is_empty())?;
    Some((desde, hasta))
}

/// GET /api/Facturacion/GetFacturasVenta?desdeFecha&hastaFecha
pub async fn passthrough_invoices(Query(query): Query<PassthroughQuery>) -> Response {
    let Some((desde, hasta)) = passthrough_dates(query) else {
        return missing_dates("Facturacion/GetFacturasVenta");
    };
    match BILLING_EXECUTOR.passthrough_invoices(&desde, &hasta).await {
        Ok(facturas) => {
            tracing::debug!("Passthrough invoices: {}", facturas.len());
            Json(facturas).into_response()
        }
        Err(e) => passthrough_error("facturas", &e),
    }
}

/// GET /api/CtaCte/GetRecibosEntreFechas?desdeFecha&hastaFecha
pub async fn passthrough_receipts(Query(query): Query<PassthroughQuery>) -> Response {
    let Some((desde, hasta)) = passthrough_dates(query) else {
        return missing_dates("CtaCte/GetRecibosEntreFechas");
    };
    match BILLING_EXECUTOR.passthrough_receipts(&desde, &hasta).await {
        Ok(recibos) => Json(recibos).into_response(),
        Err(e) => passthrough_error("recibos", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_status_is_passed_through() {
        let err = anyhow::Error::from(VendorError::Status {
            status: 503,
            body: "down".into(),
        });
        assert_eq!(
            passthrough_error("facturas", &err).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let html = anyhow::Error::from(VendorError::HtmlPage).context("GetFacturasVenta");
        assert_eq!(
            passthrough_error("facturas", &html).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn both_passthrough_dates_are_required() {
        let only_from = PassthroughQuery {
            desde_fecha: Some("2024-01-01".into()),
            hasta_fecha: None,
        };
        assert!(passthrough_dates(only_from).is_none());
        assert_eq!(
            missing_dates("Facturacion/GetFacturasVenta").status(),
            StatusCode::BAD_REQUEST
        );

        let both = PassthroughQuery {
            desde_fecha: Some("2024-01-01".into()),
            hasta_fecha: Some("2024-01-31".into()),
        };
        assert_eq!(
            passthrough_dates(both),
            Some(("2024-01-01".to_string(), "2024-01-31".to_string()))
        );
    }
}
