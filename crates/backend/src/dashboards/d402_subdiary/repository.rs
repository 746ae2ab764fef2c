use anyhow::Result;
use chrono::NaiveDate;
use contracts::dashboards::d402_subdiary::dto::SubdiaryRow;
use sea_orm::{DatabaseBackend, FromQueryResult, Statement};

use crate::shared::data::db::get_connection;

#[derive(Debug, Clone, FromQueryResult)]
struct Row {
    fecha: NaiveDate,
    estacion_id: Option<i64>,
    nombre_estacion: Option<String>,
    caja_id: Option<i64>,
    nombre_caja: Option<String>,
    categoria: Option<String>,
    nombre: Option<String>,
    litros: f64,
    importe: f64,
    total_efectivo_recaudado: f64,
    importe_ventas_totales_contado: f64,
}

impl From<Row> for SubdiaryRow {
    fn from(r: Row) -> Self {
        Self {
            fecha: r.fecha,
            estacion_id: r.estacion_id,
            nombre_estacion: r.nombre_estacion,
            caja_id: r.caja_id,
            nombre_caja: r.nombre_caja,
            categoria: r.categoria,
            nombre: r.nombre,
            litros: r.litros,
            importe: r.importe,
            total_efectivo_recaudado: r.total_efectivo_recaudado,
            importe_ventas_totales_contado: r.importe_ventas_totales_contado,
        }
    }
}

/// Sales per day, station, register and product joined with the shift closure of that day.
/// A `None` bound leaves that side of the range open.
pub async fn subdiary(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<SubdiaryRow>> {
    let db = get_connection()?;
    let sql = r#"
        SELECT
            m.fecha::date AS fecha,
            m.estacion_id::BIGINT AS estacion_id,
            m.nombre_estacion,
            m.caja_id::BIGINT AS caja_id,
            m.nombre_caja,
            d.categoria,
            d.nombre,
            COALESCE(SUM(m.cantidad), 0)::float8 AS litros,
            COALESCE(SUM(m.importe), 0)::float8 AS importe,
            COALESCE(MAX(ct.total_efectivo_recaudado), 0)::float8 AS total_efectivo_recaudado,
            COALESCE(MAX(ct.importe_ventas_totales_contado), 0)::float8 AS importe_ventas_totales_contado
        FROM datos_metricas m
        JOIN dim_producto d ON d.producto_id = m.producto_id
        LEFT JOIN cierres_turno ct
            ON ct.fecha::date = m.fecha::date
           AND ct.id_estacion = m.estacion_id
           AND ct.caja_id = m.caja_id
        WHERE ($1::date IS NULL OR m.fecha::date >= $1::date)
          AND ($2::date IS NULL OR m.fecha::date <= $2::date)
        GROUP BY m.fecha::date, m.estacion_id, m.nombre_estacion, m.caja_id, m.nombre_caja,
                 d.categoria, d.nombre
        ORDER BY m.fecha::date, m.estacion_id, m.caja_id, d.categoria
    "#;
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        sql,
        [from.into(), to.into()],
    );
    let rows = Row::find_by_statement(stmt).all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
