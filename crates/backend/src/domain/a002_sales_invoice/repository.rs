use anyhow::{Context, Result};
use contracts::domain::a002_sales_invoice::aggregate::{
    CardCoupon, InvoiceLine, InvoicePayments, SalesInvoice, SalesInvoiceHeader,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::data::db::get_connection;

/// `id_factura` is generated; the voucher type, point of sale and number identify the invoice
const UPSERT_HEADER_SQL: &str = "INSERT INTO facturas_venta (
    tipo_comprobante, punto_venta, numero, fecha, codigo, razon_social,
    numero_documento, domicilio, localidad, id_localidad, codigo_postal,
    patente, moneda, tipo_pago, neto_gravado, neto_no_gravado, iva,
    impuesto_interno, tasas, tasa_vial, jurisdiccion, percepcion_iibb,
    percepcion_iva, otras_percepciones, total, id_cliente_seleccionado,
    id_estacion, chofer, id_movimiento_fac, id_movimiento_cancelado
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
    $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30
)
ON CONFLICT (tipo_comprobante, punto_venta, numero) DO UPDATE SET
    fecha = EXCLUDED.fecha,
    razon_social = EXCLUDED.razon_social,
    total = EXCLUDED.total,
    id_movimiento_fac = EXCLUDED.id_movimiento_fac,
    id_movimiento_cancelado = EXCLUDED.id_movimiento_cancelado
RETURNING id_factura, (xmax = 0) AS insertado";

/// Stores header, payments, lines and coupons. Returns `true` when the header was new.
pub async fn upsert_invoice(invoice: &SalesInvoice) -> Result<bool> {
    let conn = get_connection()?;

    let (id_factura, inserted) = upsert_header(conn, &invoice.header).await?;
    upsert_payments(conn, id_factura, &invoice.payments).await?;
    for line in &invoice.lines {
        insert_line(conn, id_factura, line).await?;
    }
    for coupon in &invoice.coupons {
        insert_coupon(conn, id_factura, coupon).await?;
    }

    Ok(inserted)
}

async fn upsert_header(conn: &DatabaseConnection, h: &SalesInvoiceHeader) -> Result<(i64, bool)> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            UPSERT_HEADER_SQL,
            [
                h.tipo_comprobante.clone().into(),
                h.punto_venta.into(),
                h.numero.into(),
                h.fecha.into(),
                h.codigo.clone().into(),
                h.razon_social.clone().into(),
                h.numero_documento.clone().into(),
                h.domicilio.clone().into(),
                h.localidad.clone().into(),
                h.id_localidad.clone().into(),
                h.codigo_postal.into(),
                h.patente.clone().into(),
                h.moneda.clone().into(),
                h.tipo_pago.clone().into(),
                h.neto_gravado.into(),
                h.neto_no_gravado.into(),
                h.iva.into(),
                h.impuesto_interno.into(),
                h.tasas.into(),
                h.tasa_vial.into(),
                h.jurisdiccion.into(),
                h.percepcion_iibb.into(),
                h.percepcion_iva.into(),
                h.otras_percepciones.into(),
                h.total.into(),
                h.id_cliente_seleccionado.clone().into(),
                h.id_estacion.into(),
                h.chofer.clone().into(),
                h.id_movimiento_fac.into(),
                h.id_movimiento_cancelado.into(),
            ],
        ))
        .await
        .with_context(|| format!("Failed to upsert invoice {}", h.numero))?
        .ok_or_else(|| anyhow::anyhow!("Invoice upsert returned no row"))?;

    let id_factura: i64 = row.try_get("", "id_factura")?;
    let inserted: bool = row.try_get("", "insertado")?;
    Ok((id_factura, inserted))
}

async fn upsert_payments(
    conn: &DatabaseConnection,
    id_factura: i64,
    p: &InvoicePayments,
) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "INSERT INTO facturas_venta_valores (
            id_factura, efectivo, cheques_propios, cheques_terceros,
            tarjetas, transferencias, debito_automatico
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id_factura) DO UPDATE SET
            efectivo = EXCLUDED.efectivo,
            cheques_terceros = EXCLUDED.cheques_terceros,
            tarjetas = EXCLUDED.tarjetas",
        [
            id_factura.into(),
            p.efectivo.into(),
            p.cheques_propios.into(),
            p.cheques_terceros.into(),
            p.tarjetas.into(),
            p.transferencias.into(),
            p.debito_automatico.into(),
        ],
    ))
    .await
    .context("Failed to upsert facturas_venta_valores")?;
    Ok(())
}

async fn insert_line(conn: &DatabaseConnection, id_factura: i64, d: &InvoiceLine) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "INSERT INTO facturas_venta_detalle (
            id_factura, cantidad, codigo_articulo, descripcion_articulo, id_grupo_articulo,
            descripcion_grupo, precio, iva_unitario, impuesto_interno_unitario, tasas_unitario,
            tasa_vial_unitario, costo_unitario, id_articulo, id_caja, identificador_caja,
            id_cierre_turno, total_neto, neto_unitario, total_iva, total_impuesto_interno,
            total_tasas, total_tasa_vial, alicuota_iva, total_renglon
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
            $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24
        )
        ON CONFLICT DO NOTHING",
        [
            id_factura.into(),
            d.cantidad.into(),
            d.codigo_articulo.into(),
            d.descripcion_articulo.clone().into(),
            d.id_grupo_articulo.into(),
            d.descripcion_grupo.clone().into(),
            d.precio.into(),
            d.iva_unitario.into(),
            d.impuesto_interno_unitario.into(),
            d.tasas_unitario.into(),
            d.tasa_vial_unitario.into(),
            d.costo_unitario.into(),
            d.id_articulo.into(),
            d.id_caja.into(),
            d.identificador_caja.clone().into(),
            d.id_cierre_turno.into(),
            d.total_neto.into(),
            d.neto_unitario.into(),
            d.total_iva.into(),
            d.total_impuesto_interno.into(),
            d.total_tasas.into(),
            d.total_tasa_vial.into(),
            d.alicuota_iva.clone().into(),
            d.total_renglon.into(),
        ],
    ))
    .await
    .context("Failed to insert facturas_venta_detalle")?;
    Ok(())
}

async fn insert_coupon(conn: &DatabaseConnection, id_factura: i64, c: &CardCoupon) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "INSERT INTO facturas_venta_cupones_tarjeta (
            id_factura, id_tarjeta, tarjeta, caja_tarjeta, numero_cupon,
            fecha_cupon, total_tarjetas, numero_lote, numero_tarjeta, codigo_aprobacion
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT DO NOTHING",
        [
            id_factura.into(),
            c.id_tarjeta.into(),
            c.tarjeta.clone().into(),
            c.caja_tarjeta.clone().into(),
            c.numero_cupon.into(),
            c.fecha_cupon.clone().into(),
            c.total_tarjetas.into(),
            c.numero_lote.clone().into(),
            c.numero_tarjeta.into(),
            c.codigo_aprobacion.clone().into(),
        ],
    ))
    .await
    .context("Failed to insert facturas_venta_cupones_tarjeta")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../../../../migrations/0001_initial_schema.sql");

    fn insert_columns(sql: &str) -> Vec<&str> {
        let start = sql.find('(').unwrap() + 1;
        let end = sql.find(") VALUES").unwrap();
        sql[start..end].split(',').map(str::trim).collect()
    }

    #[test]
    fn header_id_comes_from_the_sequence() {
        let columns = insert_columns(UPSERT_HEADER_SQL);
        assert!(!columns.contains(&"id_factura"));
        assert_eq!(columns.len(), 30);
        assert!(UPSERT_HEADER_SQL.contains("$30"));
        assert!(!UPSERT_HEADER_SQL.contains("$31"));
        assert!(UPSERT_HEADER_SQL.contains("RETURNING id_factura"));
        assert!(SCHEMA.contains("id_factura              BIGSERIAL PRIMARY KEY"));
        assert!(SCHEMA.contains("UNIQUE (tipo_comprobante, punto_venta, numero)"));
    }
}
