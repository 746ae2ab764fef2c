use axum::{
    extract::{Path, Query},
    Json,
};
use contracts::usecases::u503_sync_positions::{
    PositionHistoryQuery, PositionsQuery, SyncPositionsRequest,
};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{bad_request, failure, not_found, ApiError};
use crate::usecases::common::ProgressTracker;
use crate::usecases::u503_sync_positions::executor::{DEFAULT_HISTORY_LIMIT, DEFAULT_LIMIT};
use crate::usecases::u503_sync_positions::SyncPositionsExecutor;

static POSITIONS_EXECUTOR: Lazy<Arc<SyncPositionsExecutor>> =
    Lazy::new(|| Arc::new(SyncPositionsExecutor::new(Arc::new(ProgressTracker::new()))));

fn plate_param(placa: &str) -> Result<&str, ApiError> {
    let placa = placa.trim();
    if placa.is_empty() {
        return Err(bad_request("La placa es requerida"));
    }
    Ok(placa)
}

/// GET /api/positions?plate&limit
pub async fn list(Query(query): Query<PositionsQuery>) -> Result<Json<Value>, ApiError> {
    let posiciones = POSITIONS_EXECUTOR
        .positions(query.plate.as_deref(), query.limit.unwrap_or(DEFAULT_LIMIT))
        .await
        .map_err(|e| failure("Error al obtener posiciones", &e))?;
    Ok(Json(json!({
        "ok": true,
        "count": posiciones.len(),
        "data": posiciones
    })))
}

/// GET /api/positions/ultima-posicion/:placa
pub async fn last_position(Path(placa): Path<String>) -> Result<Json<Value>, ApiError> {
    let placa = plate_param(&placa)?;
    let posicion = POSITIONS_EXECUTOR
        .last_position(placa)
        .await
        .map_err(|e| failure("Error al obtener la última posición", &e))?
        .ok_or_else(|| not_found("No se encontraron posiciones para este vehículo"))?;
    Ok(Json(json!({ "ok": true, "data": posicion })))
}

/// GET /api/positions/historial/:placa?limit
pub async fn history(
    Path(placa): Path<String>,
    Query(query): Query<PositionHistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let placa = plate_param(&placa)?;
    let historial = POSITIONS_EXECUTOR
        .history(placa, query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await
        .map_err(|e| failure("Error al obtener el historial", &e))?;
    Ok(Json(json!({
        "ok": true,
        "count": historial.len(),
        "data": historial
    })))
}

/// POST /api/positions/sincronizar
pub async fn sync(body: Option<Json<SyncPositionsRequest>>) -> Result<Json<Value>, ApiError> {
    let plate = body.and_then(|Json(r)| r.plate).filter(|p| !p.trim().is_empty());
    tracing::info!(
        "Positions sync requested for {}",
        plate.as_deref().unwrap_or("all vehicles")
    );

    let resultado = POSITIONS_EXECUTOR
        .sync(plate.as_deref())
        .await
        .map_err(|e| failure("Error al sincronizar posiciones", &e))?;
    Ok(Json(json!({
        "ok": true,
        "message": "Sincronización completada",
        "data": resultado
    })))
}
