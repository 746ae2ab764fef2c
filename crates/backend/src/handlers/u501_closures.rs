use axum::{
    extract::{Path, Query},
    Json,
};
use contracts::usecases::common::{ImportProgress, ImportResponse};
use contracts::usecases::u501_sync_closures::{
    ClosureDetailQuery, ClosureListQuery, ClosureSyncResult, SyncClosuresRequest, SyncRangeQuery,
};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{bad_request, failure, not_found, ApiError};
use crate::shared::dates::{parse_date, today};
use crate::usecases::common::ProgressTracker;
use crate::usecases::u501_sync_closures::SyncClosuresExecutor;

static CLOSURES_EXECUTOR: Lazy<Arc<SyncClosuresExecutor>> =
    Lazy::new(|| Arc::new(SyncClosuresExecutor::new(Arc::new(ProgressTracker::new()))));

fn origin(id_estacion: Option<i64>, id_caja: Option<i64>) -> Result<(i64, i64), ApiError> {
    let (station, register) = SyncClosuresExecutor::default_origin()
        .map_err(|e| failure("Configuración no disponible", &e))?;
    Ok((id_estacion.unwrap_or(station), id_caja.unwrap_or(register)))
}

/// GET /api/cierres
pub async fn list(Query(query): Query<ClosureListQuery>) -> Result<Json<Value>, ApiError> {
    let (id_estacion, id_caja) = origin(query.id_estacion, query.id_caja)?;
    let fecha = query
        .fecha
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| today().format("%Y-%m-%d").to_string());

    let lista = CLOSURES_EXECUTOR
        .list_closures(id_estacion, id_caja, &fecha)
        .await
        .map_err(|e| failure("No se pudieron obtener los cierres", &e))?;
    Ok(Json(json!({
        "ok": true,
        "cantidad": lista.len(),
        "data": lista
    })))
}

/// GET /api/cierres/detalle
pub async fn detail(Query(query): Query<ClosureDetailQuery>) -> Result<Json<Value>, ApiError> {
    let Some(fecha_hora_cierre) = query.fecha_hora_cierre.filter(|f| !f.trim().is_empty()) else {
        return Err(bad_request("Falta parámetro fechaHoraCierre"));
    };
    let (id_estacion, id_caja) = origin(query.id_estacion, query.id_caja)?;

    CLOSURES_EXECUTOR
        .closure_detail(id_estacion, id_caja, &fecha_hora_cierre)
        .await
        .map(Json)
        .map_err(|e| failure("No se pudo obtener detalle del cierre", &e))
}

/// POST /api/cierres/sync?fechaInicio&fechaFin
pub async fn sync(
    Query(query): Query<SyncRangeQuery>,
) -> Result<Json<ClosureSyncResult>, ApiError> {
    let (Some(inicio), Some(fin)) = (query.fecha_inicio, query.fecha_fin) else {
        return Err(bad_request(
            "Debes enviar fechaInicio y fechaFin en el query string",
        ));
    };
    let from = parse_date(&inicio).ok_or_else(|| bad_request("fechaInicio inválida"))?;
    let to = parse_date(&fin).ok_or_else(|| bad_request("fechaFin inválida"))?;

    CLOSURES_EXECUTOR
        .sync_range(from, to)
        .await
        .map(Json)
        .map_err(|e| failure("Error al sincronizar cierres", &e))
}

/// POST /api/cierres/sync-auto
pub async fn sync_auto() -> Result<Json<ClosureSyncResult>, ApiError> {
    CLOSURES_EXECUTOR
        .sync_auto()
        .await
        .map(Json)
        .map_err(|e| failure("Error en la sincronización automática de cierres", &e))
}

/// POST /api/u501/start
pub async fn start(
    Json(request): Json<SyncClosuresRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    CLOSURES_EXECUTOR
        .start(request)
        .await
        .map(Json)
        .map_err(|e| failure("No se pudo iniciar la sincronización", &e))
}

/// GET /api/u501/:session_id/progress
pub async fn progress(Path(session_id): Path<String>) -> Result<Json<ImportProgress>, ApiError> {
    CLOSURES_EXECUTOR
        .get_progress(&session_id)
        .map(Json)
        .ok_or_else(|| not_found("Sesión no encontrada"))
}
