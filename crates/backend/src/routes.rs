use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::system::{self, auth::middleware::require_auth};

const BANNER: &str = "Servidor de reportes de estación funcionando";

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/", get(|| async { BANNER }))
        .route("/health", get(|| async { "ok" }))
        // Vendor passthrough, open like the legacy clients expect
        .route(
            "/api/Facturacion/GetFacturasVenta",
            get(handlers::u502_billing::passthrough_invoices),
        )
        .route(
            "/api/CtaCte/GetRecibosEntreFechas",
            get(handlers::u502_billing::passthrough_receipts),
        )
        .merge(system::api::routes::configure_system_routes())
        .merge(protected_routes().route_layer(middleware::from_fn(require_auth)))
}

fn protected_routes() -> Router {
    Router::new()
        // ========================================
        // U501 CIERRES DE TURNO
        // ========================================
        .route("/api/cierres", get(handlers::u501_closures::list))
        .route("/api/cierres/detalle", get(handlers::u501_closures::detail))
        .route("/api/cierres/sync", post(handlers::u501_closures::sync))
        .route(
            "/api/cierres/sync-auto",
            post(handlers::u501_closures::sync_auto),
        )
        .route("/api/u501/start", post(handlers::u501_closures::start))
        .route(
            "/api/u501/:session_id/progress",
            get(handlers::u501_closures::progress),
        )
        // ========================================
        // U502 FACTURAS Y RECIBOS
        // ========================================
        .route(
            "/api/facturas/sync",
            get(handlers::u502_billing::sync_invoices).post(handlers::u502_billing::sync_invoices),
        )
        .route(
            "/api/recibos/sync",
            get(handlers::u502_billing::sync_receipts).post(handlers::u502_billing::sync_receipts),
        )
        .route(
            "/api/sync-facturacion",
            get(handlers::u502_billing::sync_all).post(handlers::u502_billing::sync_all),
        )
        .route(
            "/api/sync-historia",
            post(handlers::u502_billing::sync_history),
        )
        .route("/api/test-sync", post(handlers::u502_billing::test_sync))
        .route("/api/logs-facturacion", get(handlers::u502_billing::logs))
        .route("/api/u502/start", post(handlers::u502_billing::start))
        .route(
            "/api/u502/:session_id/progress",
            get(handlers::u502_billing::progress),
        )
        // ========================================
        // U503 POSICIONES GPS
        // ========================================
        .route("/api/positions", get(handlers::u503_positions::list))
        .route(
            "/api/positions/ultima-posicion/:placa",
            get(handlers::u503_positions::last_position),
        )
        .route(
            "/api/positions/historial/:placa",
            get(handlers::u503_positions::history),
        )
        .route(
            "/api/positions/sincronizar",
            post(handlers::u503_positions::sync),
        )
        // ========================================
        // U504 TANQUES
        // ========================================
        .route("/api/tanques/niveles", get(handlers::u504_tanks::live_levels))
        .route("/api/tanques/estado", get(handlers::u504_tanks::stored_levels))
        .route("/api/tanques/sync", post(handlers::u504_tanks::sync))
        // ========================================
        // U505 ARTICULOS
        // ========================================
        .route(
            "/api/articulos/combustibles/sync",
            post(handlers::u505_catalog::sync_fuels),
        )
        .route(
            "/api/articulos/productos/sync",
            post(handlers::u505_catalog::sync_products),
        )
        .route(
            "/api/articulos/productos/recategorizar",
            post(handlers::u505_catalog::recategorize),
        )
        .route(
            "/api/articulos/productos",
            get(handlers::u505_catalog::list_products),
        )
        // A007 estaciones y cajas
        .route("/api/catalog/mappings", get(handlers::catalog::mappings))
        .route(
            "/api/catalog/mappings/reload",
            post(handlers::catalog::reload),
        )
        // ========================================
        // REPORTES
        // ========================================
        .route("/api/pcMensual", get(handlers::reports::pc_monthly))
        .route("/api/pcResumenMensual", get(handlers::reports::pc_summary))
        .route("/api/reportes", get(handlers::reports::by_type))
        .route("/api/reportes/test", get(handlers::reports::ping))
        .route("/api/reportes/subdiario", get(handlers::reports::subdiary))
        .route(
            "/api/reportes/mensual",
            get(handlers::reports::closures_monthly),
        )
        .route(
            "/api/reportes/facturacion-diaria-cliente",
            get(handlers::reports::billing_by_customer),
        )
        .route(
            "/api/reportes/facturacion-diaria-gnc",
            get(handlers::reports::billing_gnc),
        )
        .route(
            "/api/reportes/facturacion-diaria-liquidos",
            get(handlers::reports::billing_liquids),
        )
        .route(
            "/api/reportes/facturacion-diaria-otros",
            get(handlers::reports::billing_other),
        )
        .route(
            "/api/reportes/facturacion-diaria-shop",
            get(handlers::reports::billing_shop),
        )
        .route(
            "/api/reportes/recibo-diario-cliente",
            get(handlers::reports::receipts_by_customer),
        )
}
