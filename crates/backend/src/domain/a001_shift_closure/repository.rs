use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use contracts::domain::a001_shift_closure::aggregate::{ShiftClosure, ShiftClosureInfo};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

/// Where a closure was taken
#[derive(Debug, Clone)]
pub struct ClosureOrigin {
    pub estacion_id: i64,
    pub nombre_estacion: Option<String>,
    pub caja_id: i64,
    pub nombre_caja: Option<String>,
}

/// One row of `datos_metricas`
#[derive(Debug, Clone)]
pub struct MetricRow {
    pub fecha: NaiveDateTime,
    pub depto_id: i64,
    pub producto_id: i64,
    pub cantidad: f64,
    pub importe: f64,
}

const UPSERT_METRIC_SQL: &str = "INSERT INTO datos_metricas
    (fecha, empresa_id, depto_id, producto_id, cantidad, importe,
     estacion_id, caja_id, nombre_estacion, nombre_caja)
 VALUES ($1, 1, $2, $3, $4, $5, $6, $7, $8, $9)
 ON CONFLICT (fecha, estacion_id, caja_id, producto_id) DO UPDATE SET
    depto_id = EXCLUDED.depto_id,
    cantidad = EXCLUDED.cantidad,
    importe = EXCLUDED.importe,
    nombre_estacion = EXCLUDED.nombre_estacion,
    nombre_caja = EXCLUDED.nombre_caja";

/// Upsert keyed by moment, station, register and product
pub async fn store_metric(metric: &MetricRow, origin: &ClosureOrigin) -> Result<()> {
    let conn = get_connection()?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        UPSERT_METRIC_SQL,
        [
            metric.fecha.into(),
            metric.depto_id.into(),
            metric.producto_id.into(),
            metric.cantidad.into(),
            metric.importe.into(),
            origin.estacion_id.into(),
            origin.caja_id.into(),
            origin.nombre_estacion.clone().into(),
            origin.nombre_caja.clone().into(),
        ],
    ))
    .await
    .context("Failed to upsert datos_metricas")?;

    Ok(())
}

/// Upsert into `cierres_turno`. Closures without an id cannot be keyed and are skipped.
pub async fn store_closure_totals(
    closure: &ShiftClosure,
    fecha: NaiveDateTime,
    info: &ShiftClosureInfo,
    origin: &ClosureOrigin,
) -> Result<bool> {
    let Some(id_cierre_turno) = closure.id_cierre_turno else {
        return Ok(false);
    };
    let conn = get_connection()?;

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "INSERT INTO cierres_turno
            (id_cierre_turno, fecha, id_estacion, nombre_estacion, caja_id, nombre_caja, numero_turno,
             total_efectivo_recaudado, importe_ventas_totales_contado, total_litros_despachados)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (id_cierre_turno) DO UPDATE SET
            fecha = EXCLUDED.fecha,
            nombre_estacion = EXCLUDED.nombre_estacion,
            nombre_caja = EXCLUDED.nombre_caja,
            total_efectivo_recaudado = EXCLUDED.total_efectivo_recaudado,
            importe_ventas_totales_contado = EXCLUDED.importe_ventas_totales_contado,
            total_litros_despachados = EXCLUDED.total_litros_despachados",
        [
            id_cierre_turno.into(),
            fecha.into(),
            origin.estacion_id.into(),
            origin.nombre_estacion.clone().into(),
            origin.caja_id.into(),
            origin
                .nombre_caja
                .clone()
                .or_else(|| closure.caja.clone())
                .into(),
            closure.numero_turno.into(),
            info.total_efectivo_recaudado.into(),
            info.importe_ventas_totales_contado.into(),
            info.total_litros_despachados.into(),
        ],
    ))
    .await
    .context("Failed to upsert cierres_turno")?;

    Ok(true)
}

/// Date of the most recent metric row
pub async fn last_metric_date() -> Result<Option<NaiveDate>> {
    let conn = get_connection()?;

    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT MAX(fecha) AS max_fecha FROM datos_metricas".to_string(),
        ))
        .await?;

    let max: Option<NaiveDateTime> = match row {
        Some(row) => row.try_get("", "max_fecha")?,
        None => None,
    };
    Ok(max.map(|d| d.date()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../../../../migrations/0001_initial_schema.sql");

    #[test]
    fn metric_conflict_target_matches_the_schema_key() {
        assert!(UPSERT_METRIC_SQL
            .contains("ON CONFLICT (fecha, estacion_id, caja_id, producto_id) DO UPDATE"));
        assert!(SCHEMA.contains("UNIQUE (fecha, estacion_id, caja_id, producto_id)"));
        assert!(UPSERT_METRIC_SQL.contains("cantidad = EXCLUDED.cantidad"));
        assert!(UPSERT_METRIC_SQL.contains("importe = EXCLUDED.importe"));
    }
}
