use axum::Json;
use contracts::domain::a006_product::aggregate::Product;
use contracts::usecases::u505_sync_catalog::{CatalogSyncResult, RecategorizeResult};
use once_cell::sync::Lazy;

use super::{failure, ApiError};
use crate::usecases::u505_sync_catalog::SyncCatalogExecutor;

static CATALOG_EXECUTOR: Lazy<SyncCatalogExecutor> = Lazy::new(SyncCatalogExecutor::new);

/// POST /api/articulos/combustibles/sync
pub async fn sync_fuels() -> Result<Json<CatalogSyncResult>, ApiError> {
    CATALOG_EXECUTOR
        .sync_fuels()
        .await
        .map(Json)
        .map_err(|e| failure("Error al guardar los combustibles", &e))
}

/// POST /api/articulos/productos/sync
pub async fn sync_products() -> Result<Json<CatalogSyncResult>, ApiError> {
    CATALOG_EXECUTOR
        .sync_products()
        .await
        .map(Json)
        .map_err(|e| failure("Error al guardar los productos", &e))
}

/// POST /api/articulos/productos/recategorizar
pub async fn recategorize() -> Result<Json<RecategorizeResult>, ApiError> {
    CATALOG_EXECUTOR
        .recategorize()
        .await
        .map(Json)
        .map_err(|e| failure("Error al recategorizar productos", &e))
}

/// GET /api/articulos/productos
pub async fn list_products() -> Result<Json<Vec<Product>>, ApiError> {
    CATALOG_EXECUTOR
        .list_products()
        .await
        .map(Json)
        .map_err(|e| failure("Error al obtener productos", &e))
}
