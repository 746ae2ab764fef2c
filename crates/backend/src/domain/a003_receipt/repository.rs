use anyhow::{Context, Result};
use contracts::domain::a003_receipt::aggregate::{Receipt, ReceiptHeader};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::data::db::get_connection;

/// Stores the receipt and its collections. Returns `true` when the header was new.
pub async fn upsert_receipt(receipt: &Receipt) -> Result<bool> {
    let conn = get_connection()?;
    let (id_recibo, inserted) = upsert_header(conn, &receipt.header).await?;

    for c in &receipt.imputed {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO recibos_comprobantes_imputados (
                id_recibo, fecha_comprobante, tipo_comprobante, punto_venta_comprobante,
                numero_comprobante, total_comprobante, total_imputado
            ) VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT DO NOTHING",
            [
                id_recibo.into(),
                c.fecha_comprobante.into(),
                c.tipo_comprobante.clone().into(),
                c.punto_venta_comprobante.into(),
                c.numero_comprobante.into(),
                c.total_comprobante.into(),
                c.total_imputado.into(),
            ],
        ))
        .await
        .context("Failed to insert recibos_comprobantes_imputados")?;
    }

    for c in &receipt.checks {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO recibos_cheques_terceros (
                id_recibo, fecha_cheque, banco_cheques, caja_cheque, numero_cheque,
                emisor, cuit_emisor, total_cheques, fecha_entrada, fecha_salida, rechazado
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) ON CONFLICT DO NOTHING",
            [
                id_recibo.into(),
                c.fecha_cheque.into(),
                c.banco_cheques.clone().into(),
                c.caja_cheque.clone().into(),
                c.numero_cheque.into(),
                c.emisor.clone().into(),
                c.cuit_emisor.clone().into(),
                c.total_cheques.into(),
                c.fecha_entrada.into(),
                c.fecha_salida.into(),
                c.rechazado.into(),
            ],
        ))
        .await
        .context("Failed to insert recibos_cheques_terceros")?;
    }

    for t in &receipt.cards {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO recibos_tarjetas (id_recibo, id_tarjeta, total_tarjetas)
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            [id_recibo.into(), t.id_tarjeta.into(), t.total_tarjetas.into()],
        ))
        .await
        .context("Failed to insert recibos_tarjetas")?;
    }

    for t in &receipt.transfers {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO recibos_transferencias (id_recibo, banco_transferencias, numero_cuenta, total_transferencias)
             VALUES ($1, $2, $3, $4) ON CONFLICT DO NOTHING",
            [
                id_recibo.into(),
                t.banco_transferencias.clone().into(),
                t.numero_cuenta.clone().into(),
                t.total_transferencias.into(),
            ],
        ))
        .await
        .context("Failed to insert recibos_transferencias")?;
    }

    for w in &receipt.withholdings {
        conn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "INSERT INTO recibos_retenciones (id_recibo, tipo_retencion, total_retenciones)
             VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            [
                id_recibo.into(),
                w.tipo_retencion.clone().into(),
                w.total_retenciones.into(),
            ],
        ))
        .await
        .context("Failed to insert recibos_retenciones")?;
    }

    Ok(inserted)
}

const UPSERT_HEADER_SQL: &str = "INSERT INTO recibos (
    fecha_recibo, punto_venta_recibo, numero_recibo, razon_social,
    numero_documento, total_efectivo, total_sin_imputar
) VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (punto_venta_recibo, numero_recibo) DO UPDATE SET
    razon_social = EXCLUDED.razon_social,
    total_efectivo = EXCLUDED.total_efectivo,
    total_sin_imputar = EXCLUDED.total_sin_imputar
RETURNING id_recibo, (xmax = 0) AS insertado";

async fn upsert_header(conn: &DatabaseConnection, h: &ReceiptHeader) -> Result<(i64, bool)> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            UPSERT_HEADER_SQL,
            [
                h.fecha_recibo.into(),
                h.punto_venta_recibo.into(),
                h.numero_recibo.into(),
                h.razon_social.clone().into(),
                h.numero_documento.clone().into(),
                h.total_efectivo.into(),
                h.total_sin_imputar.into(),
            ],
        ))
        .await
        .with_context(|| format!("Failed to upsert receipt {}", h.numero_recibo))?
        .ok_or_else(|| anyhow::anyhow!("Receipt upsert returned no row"))?;

    Ok((row.try_get("", "id_recibo")?, row.try_get("", "insertado")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../../../../migrations/0001_initial_schema.sql");

    #[test]
    fn receipt_id_is_not_the_receipt_number() {
        let columns = &UPSERT_HEADER_SQL[..UPSERT_HEADER_SQL.find(") VALUES").unwrap()];
        assert!(!columns.contains("id_recibo"));
        assert!(UPSERT_HEADER_SQL.contains("$7)"));
        assert!(UPSERT_HEADER_SQL.contains("RETURNING id_recibo"));
        assert!(SCHEMA.contains("id_recibo          BIGSERIAL PRIMARY KEY"));
        assert!(SCHEMA.contains("UNIQUE (punto_venta_recibo, numero_recibo)"));
    }
}
