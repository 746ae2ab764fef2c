use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contracts::dashboards::d401_pc_monthly::dto::{PcMonthlyRow, PcSummaryRow};
use contracts::dashboards::d402_subdiary::dto::SubdiaryRow;
use contracts::dashboards::d403_closures_monthly::dto::ClosureTotalsRow;
use contracts::dashboards::d404_billing_daily::dto::{
    BillingCategory, DailyArticleBillingRow, DailyCustomerBillingRow, DailyReceiptRow,
};
use contracts::shared::date_range::{DateRangeQuery, ReportQuery};
use contracts::shared::response::ApiResponse;
use serde_json::json;

use super::{failure, ApiError};
use crate::dashboards::{d401_pc_monthly, d402_subdiary, d403_closures_monthly, d404_billing_daily};

type ReportResult<T> = Result<Json<ApiResponse<Vec<T>>>, ApiError>;

/// GET /api/pcMensual
pub async fn pc_monthly(Query(query): Query<DateRangeQuery>) -> ReportResult<PcMonthlyRow> {
    d401_pc_monthly::service::get_monthly(&query)
        .await
        .map(|rows| Json(ApiResponse::data(rows)))
        .map_err(|e| failure("Error al obtener PC Mensual", &e))
}

/// GET /api/pcResumenMensual
pub async fn pc_summary(Query(query): Query<DateRangeQuery>) -> ReportResult<PcSummaryRow> {
    d401_pc_monthly::service::get_summary(&query)
        .await
        .map(|rows| Json(ApiResponse::data(rows)))
        .map_err(|e| failure("Error al obtener resumen mensual", &e))
}

/// GET /api/reportes/subdiario
pub async fn subdiary(Query(query): Query<DateRangeQuery>) -> ReportResult<SubdiaryRow> {
    d402_subdiary::service::get_subdiary(&query)
        .await
        .map(|rows| Json(ApiResponse::data(rows)))
        .map_err(|e| failure("Error al obtener reporte subdiario", &e))
}

/// GET /api/reportes/mensual
pub async fn closures_monthly(
    Query(query): Query<DateRangeQuery>,
) -> ReportResult<ClosureTotalsRow> {
    d403_closures_monthly::service::get_closure_totals(&query)
        .await
        .map(|rows| Json(ApiResponse::data(rows)))
        .map_err(|e| failure("Error al obtener reporte mensual", &e))
}

/// GET /api/reportes/facturacion-diaria-cliente
pub async fn billing_by_customer(
    Query(query): Query<DateRangeQuery>,
) -> ReportResult<DailyCustomerBillingRow> {
    d404_billing_daily::service::billing_by_customer(&query)
        .await
        .map(|rows| Json(ApiResponse::data(rows)))
        .map_err(|e| failure("Error al obtener facturación diaria por cliente", &e))
}

async fn billing_by_article(
    category: BillingCategory,
    query: DateRangeQuery,
) -> ReportResult<DailyArticleBillingRow> {
    d404_billing_daily::service::billing_by_article(category, &query)
        .await
        .map(|rows| Json(ApiResponse::data(rows)))
        .map_err(|e| {
            failure(
                &format!("Error al obtener facturación diaria {}", category.as_str()),
                &e,
            )
        })
}

/// GET /api/reportes/facturacion-diaria-gnc
pub async fn billing_gnc(Query(query): Query<DateRangeQuery>) -> ReportResult<DailyArticleBillingRow> {
    billing_by_article(BillingCategory::Gnc, query).await
}

/// GET /api/reportes/facturacion-diaria-liquidos
pub async fn billing_liquids(
    Query(query): Query<DateRangeQuery>,
) -> ReportResult<DailyArticleBillingRow> {
    billing_by_article(BillingCategory::Liquidos, query).await
}

/// GET /api/reportes/facturacion-diaria-shop
pub async fn billing_shop(Query(query): Query<DateRangeQuery>) -> ReportResult<DailyArticleBillingRow> {
    billing_by_article(BillingCategory::Shop, query).await
}

/// GET /api/reportes/facturacion-diaria-otros
pub async fn billing_other(Query(query): Query<DateRangeQuery>) -> ReportResult<DailyArticleBillingRow> {
    billing_by_article(BillingCategory::Otros, query).await
}

/// GET /api/reportes/recibo-diario-cliente
pub async fn receipts_by_customer(
    Query(query): Query<DateRangeQuery>,
) -> ReportResult<DailyReceiptRow> {
    d404_billing_daily::service::receipts_by_customer(&query)
        .await
        .map(|rows| Json(ApiResponse::data(rows)))
        .map_err(|e| failure("Error al obtener recibos diarios por cliente", &e))
}

/// GET /api/reportes?tipo=unidades-empresa
pub async fn by_type(Query(query): Query<ReportQuery>) -> Response {
    let Some(kind) = d404_billing_daily::service::ReportKind::parse(query.tipo.as_deref()) else {
        return unknown_type();
    };
    match d404_billing_daily::service::run_report(kind, &query).await {
        Ok(report) => Json(json!({ "ok": true, "data": report })).into_response(),
        Err(e) => failure("Error al obtener reporte", &e).into_response(),
    }
}

fn unknown_type() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Parámetro 'tipo' requerido o no válido",
            "tipos_disponibles": d404_billing_daily::service::available_types(),
            "ejemplo": "/api/reportes?tipo=unidades-empresa&fechaInicio=2023-01-01&fechaFin=2023-01-31"
        })),
    )
        .into_response()
}

/// GET /api/reportes/test
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "message": "Rutas de reportes funcionando correctamente" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_type_is_rejected_before_touching_the_database() {
        let response = by_type(Query(ReportQuery::default())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = by_type(Query(ReportQuery {
            tipo: Some("ventas".into()),
            ..Default::default()
        }))
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
