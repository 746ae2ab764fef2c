use anyhow::Result;
use chrono::NaiveDate;
use contracts::dashboards::d401_pc_monthly::dto::{PcMonthlyRow, PcSummaryRow};
use sea_orm::{DatabaseBackend, FromQueryResult, Statement};

use crate::shared::data::db::get_connection;

#[derive(Debug, Clone, FromQueryResult)]
struct MonthlyRow {
    fecha: NaiveDate,
    estacion_id: Option<i64>,
    nombre_estacion: Option<String>,
    caja_id: Option<i64>,
    nombre_caja: Option<String>,
    categoria: Option<String>,
    producto: Option<String>,
    total_importe: f64,
    total_cantidad: f64,
}

impl From<MonthlyRow> for PcMonthlyRow {
    fn from(r: MonthlyRow) -> Self {
        Self {
            fecha: r.fecha,
            estacion_id: r.estacion_id,
            nombre_estacion: r.nombre_estacion,
            caja_id: r.caja_id,
            nombre_caja: r.nombre_caja,
            categoria: r.categoria,
            producto: r.producto,
            total_importe: r.total_importe,
            total_cantidad: r.total_cantidad,
        }
    }
}

#[derive(Debug, Clone, FromQueryResult)]
struct SummaryRow {
    tipo: String,
    total_cantidad: f64,
    total_importe: f64,
}

/// Product type bucket for the monthly summary
const PRODUCT_TYPE_SQL: &str = r#"
    CASE
        WHEN p.nombre ILIKE '%nafta%' OR p.nombre ILIKE '%quantium%' OR p.nombre ILIKE '%diesel%' THEN 'liquidos'
        WHEN p.nombre ILIKE '%gnc%' THEN 'gnc'
        WHEN p.nombre ILIKE '%lubricante%' THEN 'lubricantes'
        WHEN p.nombre ILIKE '%adblue%' THEN 'adblue'
        WHEN p.categoria ILIKE 'shop' OR p.nombre ILIKE '%spot%' OR p.nombre ILIKE '%bar%' THEN 'shop'
        ELSE 'otros'
    END
"#;

/// Daily sales per station, register and product
pub async fn monthly_sales(from: NaiveDate, to: NaiveDate) -> Result<Vec<PcMonthlyRow>> {
    let db = get_connection()?;
    let sql = r#"
        SELECT
            m.fecha::date AS fecha,
            m.estacion_id::BIGINT AS estacion_id,
            m.nombre_estacion,
            m.caja_id::BIGINT AS caja_id,
            m.nombre_caja,
            p.categoria,
            p.nombre AS producto,
            COALESCE(SUM(m.importe), 0)::float8 AS total_importe,
            COALESCE(SUM(m.cantidad), 0)::float8 AS total_cantidad
        FROM datos_metricas m
        JOIN departamentos d ON m.depto_id = d.depto_id
        JOIN dim_producto p ON m.producto_id = p.producto_id
        WHERE m.fecha::date BETWEEN $1::date AND $2::date
        GROUP BY m.fecha::date, m.estacion_id, m.nombre_estacion, m.caja_id, m.nombre_caja,
                 p.categoria, p.nombre
        ORDER BY m.fecha::date DESC, m.estacion_id, m.caja_id, p.nombre
    "#;
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        sql,
        [from.into(), to.into()],
    );
    let rows = MonthlyRow::find_by_statement(stmt).all(db).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Totals per product type
pub async fn monthly_summary(from: NaiveDate, to: NaiveDate) -> Result<Vec<PcSummaryRow>> {
    let db = get_connection()?;
    let sql = format!(
        r#"
        SELECT
            {} AS tipo,
            COALESCE(SUM(m.cantidad), 0)::float8 AS total_cantidad,
            COALESCE(SUM(m.importe), 0)::float8 AS total_importe
        FROM datos_metricas m
        JOIN dim_producto p ON m.producto_id = p.producto_id
        WHERE m.fecha::date BETWEEN $1::date AND $2::date
        GROUP BY tipo
        ORDER BY tipo
    "#,
        PRODUCT_TYPE_SQL
    );
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        &sql,
        [from.into(), to.into()],
    );
    let rows = SummaryRow::find_by_statement(stmt).all(db).await?;
    Ok(rows
        .into_iter()
        .map(|r| PcSummaryRow::new(r.tipo, r.total_cantidad, r.total_importe))
        .collect())
}
