use axum::Json;
use contracts::domain::a005_tank::aggregate::TankLevel;
use contracts::usecases::u504_sync_tanks::TankSyncResult;
use once_cell::sync::Lazy;

use super::{failure, ApiError};
use crate::usecases::u504_sync_tanks::SyncTanksExecutor;

static TANKS_EXECUTOR: Lazy<SyncTanksExecutor> = Lazy::new(SyncTanksExecutor::new);

/// GET /api/tanques/niveles
pub async fn live_levels() -> Result<Json<Vec<TankLevel>>, ApiError> {
    TANKS_EXECUTOR
        .current_levels()
        .await
        .map(Json)
        .map_err(|e| failure("Error consultando la API externa", &e))
}

/// GET /api/tanques/estado
pub async fn stored_levels() -> Result<Json<Vec<TankLevel>>, ApiError> {
    TANKS_EXECUTOR
        .stored_levels()
        .await
        .map(Json)
        .map_err(|e| failure("Error al obtener el estado de los tanques", &e))
}

/// POST /api/tanques/sync
pub async fn sync() -> Result<Json<TankSyncResult>, ApiError> {
    TANKS_EXECUTOR
        .sync()
        .await
        .map(Json)
        .map_err(|e| failure("Error al actualizar los tanques", &e))
}
