use axum::Json;
use contracts::domain::a007_station_catalog::aggregate::StationMappings;

use super::{failure, ApiError};
use crate::domain::a007_station_catalog::service;
use crate::shared::station_api::StationApiClient;

/// GET /api/catalog/mappings
pub async fn mappings() -> Json<StationMappings> {
    Json(service::current())
}

/// POST /api/catalog/mappings/reload
pub async fn reload() -> Result<Json<StationMappings>, ApiError> {
    let client = StationApiClient::from_config()
        .map_err(|e| failure("API de estación no configurada", &e))?;
    service::reload(&client)
        .await
        .map(Json)
        .map_err(|e| failure("Error al recargar estaciones y cajas", &e))
}
