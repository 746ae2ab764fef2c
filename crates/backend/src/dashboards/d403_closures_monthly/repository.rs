use anyhow::Result;
use chrono::NaiveDate;
use contracts::dashboards::d403_closures_monthly::dto::ClosureTotalsRow;
use sea_orm::{DatabaseBackend, FromQueryResult, Statement};

use crate::shared::data::db::get_connection;

#[derive(Debug, Clone, FromQueryResult)]
struct Row {
    fecha: NaiveDate,
    id_estacion: Option<i64>,
    nombre_estacion: Option<String>,
    caja_id: Option<i64>,
    nombre_caja: Option<String>,
    total_efectivo_recaudado: f64,
    importe_ventas_totales_contado: f64,
}

pub async fn closure_totals(from: NaiveDate, to: NaiveDate) -> Result<Vec<ClosureTotalsRow>> {
    let db = get_connection()?;
    let sql = r#"
        SELECT
            fecha::date AS fecha,
            id_estacion::BIGINT AS id_estacion,
            nombre_estacion,
            caja_id::BIGINT AS caja_id,
            nombre_caja,
            COALESCE(total_efectivo_recaudado, 0)::float8 AS total_efectivo_recaudado,
            COALESCE(importe_ventas_totales_contado, 0)::float8 AS importe_ventas_totales_contado
        FROM cierres_turno
        WHERE fecha::date BETWEEN $1::date AND $2::date
        ORDER BY fecha, id_estacion, caja_id
    "#;
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        sql,
        [from.into(), to.into()],
    );
    let rows = Row::find_by_statement(stmt).all(db).await?;
    Ok(rows
        .into_iter()
        .map(|r| ClosureTotalsRow {
            fecha: r.fecha,
            id_estacion: r.id_estacion,
            nombre_estacion: r.nombre_estacion,
            caja_id: r.caja_id,
            nombre_caja: r.nombre_caja,
            total_efectivo_recaudado: r.total_efectivo_recaudado,
            importe_ventas_totales_contado: r.importe_ventas_totales_contado,
        })
        .collect())
}
