use contracts::domain::a002_sales_invoice::aggregate::{
    CardCoupon, InvoiceLine, InvoicePayments, InvoiceSummary, SalesInvoice, SalesInvoiceHeader,
};
use serde_json::Value;

use crate::shared::dates::parse_api_datetime;
use crate::shared::numbers::{non_zero, opt_int, safe_int, safe_number};
use crate::shared::xml::{as_list, field, field_f64, field_i64, field_str, pick};

/// Invoices in a `Facturacion/GetFacturasVenta` document
pub fn invoice_nodes(doc: &Value) -> Vec<&Value> {
    pick(
        doc,
        &[
            "root.FacturasVenta",
            "FacturasVenta",
            "ArrayOfFacturasVenta.FacturasVenta",
        ],
    )
    .map(as_list)
    .unwrap_or_default()
}

fn text(v: &Value, name: &str) -> Option<String> {
    field_str(v, &[name])
}

fn int_or_null(v: &Value, name: &str) -> Option<i64> {
    non_zero(safe_int(v.get(name)))
}

pub fn map_header(cab: &Value) -> SalesInvoiceHeader {
    SalesInvoiceHeader {
        tipo_comprobante: text(cab, "TipoComprobante"),
        punto_venta: safe_int(cab.get("PuntoVenta")),
        numero: safe_int(cab.get("Numero")),
        fecha: parse_api_datetime(&text(cab, "Fecha").unwrap_or_default()),
        codigo: text(cab, "Codigo"),
        razon_social: text(cab, "RazonSocial"),
        numero_documento: text(cab, "NumeroDocumento"),
        domicilio: text(cab, "Domicilio"),
        localidad: text(cab, "Localidad"),
        id_localidad: text(cab, "IdLocalidad"),
        codigo_postal: int_or_null(cab, "CodigoPostal"),
        patente: text(cab, "Patente"),
        moneda: text(cab, "Moneda").unwrap_or_else(|| "PES".to_string()),
        tipo_pago: text(cab, "TipoPago"),
        neto_gravado: safe_number(cab.get("NetoGravado"), 2),
        neto_no_gravado: safe_number(cab.get("NetoNoGravado"), 2),
        iva: safe_number(cab.get("IVA"), 2),
        impuesto_interno: safe_number(cab.get("ImpuestoInterno"), 2),
        tasas: safe_number(cab.get("Tasas"), 2),
        tasa_vial: safe_number(cab.get("TasaVial"), 2),
        jurisdiccion: opt_int(cab.get("Jurisdiccion")),
        percepcion_iibb: safe_number(cab.get("PercepcionIIBB"), 2),
        percepcion_iva: safe_number(cab.get("PercepcionIVA"), 2),
        otras_percepciones: safe_number(cab.get("OtrasPercepciones"), 2),
        total: safe_number(cab.get("Total"), 2),
        id_cliente_seleccionado: text(cab, "IdClienteSeleccionado"),
        id_estacion: int_or_null(cab, "IdEstacion"),
        chofer: text(cab, "Chofer"),
        id_movimiento_fac: int_or_null(cab, "idMovimientoFac"),
        id_movimiento_cancelado: opt_int(cab.get("IdMovimientoCancelado")),
    }
}

pub fn map_payments(val: &Value) -> InvoicePayments {
    InvoicePayments {
        efectivo: safe_number(val.get("Efectivo"), 2),
        cheques_propios: safe_int(val.get("ChequesPropios")),
        cheques_terceros: safe_number(val.get("ChequesTerceros"), 2),
        tarjetas: safe_number(val.get("Tarjetas"), 2),
        transferencias: safe_int(val.get("Transferencias")),
        debito_automatico: safe_int(val.get("DebitoAutomatico")),
    }
}

pub fn map_line(d: &Value) -> InvoiceLine {
    InvoiceLine {
        cantidad: safe_number(d.get("Cantidad"), 4),
        codigo_articulo: safe_number(d.get("CodigoArticulo"), 4),
        descripcion_articulo: text(d, "DescripcionArticulo"),
        id_grupo_articulo: int_or_null(d, "IdGrupoArticulo"),
        descripcion_grupo: text(d, "DescripcionGrupo"),
        precio: safe_number(d.get("Precio"), 4),
        iva_unitario: safe_number(d.get("IvaUnitario"), 4),
        impuesto_interno_unitario: safe_number(d.get("ImpuestoInternoUnitario"), 4),
        tasas_unitario: safe_number(d.get("TasasUnitario"), 4),
        tasa_vial_unitario: safe_number(d.get("TasaVialUnitario"), 4),
        costo_unitario: safe_number(d.get("CostoUnitario"), 4),
        id_articulo: int_or_null(d, "IdArticulo"),
        id_caja: int_or_null(d, "IdCaja"),
        identificador_caja: text(d, "IdentificadorCaja"),
        id_cierre_turno: safe_int(d.get("IdCierreTurno")),
        total_neto: safe_number(d.get("TotalNeto"), 2),
        neto_unitario: safe_number(d.get("NetoUnitario"), 4),
        total_iva: safe_number(d.get("TotalIva"), 2),
        total_impuesto_interno: safe_number(d.get("TotalImpuestoInterno"), 2),
        total_tasas: safe_number(d.get("TotalTasas"), 2),
        total_tasa_vial: safe_number(d.get("TotalTasaVial"), 2),
        alicuota_iva: text(d, "AlicuotaIva"),
        total_renglon: safe_number(d.get("TotalRenglon"), 2),
    }
}

pub fn map_coupon(c: &Value) -> CardCoupon {
    CardCoupon {
        id_tarjeta: int_or_null(c, "IdTarjeta"),
        tarjeta: text(c, "Tarjeta"),
        caja_tarjeta: text(c, "CajaTarjeta"),
        numero_cupon: int_or_null(c, "NumeroCupon"),
        fecha_cupon: text(c, "FechaCupon"),
        total_tarjetas: safe_number(c.get("TotalTarjetas"), 2),
        numero_lote: text(c, "NumeroLote"),
        numero_tarjeta: int_or_null(c, "NumeroTarjeta"),
        codigo_aprobacion: text(c, "CodigoAprobacion"),
    }
}

/// Full invoice. Lines not tied to a shift closure are dropped.
pub fn map_invoice(node: &Value) -> SalesInvoice {
    let cab = node.get("cabecera").unwrap_or(&Value::Null);
    let det = node.get("detalle").unwrap_or(&Value::Null);
    let val = node.get("valores").unwrap_or(&Value::Null);

    let lines = det
        .get("Detalle")
        .map(as_list)
        .unwrap_or_default()
        .into_iter()
        .map(map_line)
        .filter(|l| l.id_cierre_turno > 0)
        .collect();

    let coupons = pick(cab, &["CuponesTarjeta.CuponTarjeta"])
        .map(as_list)
        .unwrap_or_default()
        .into_iter()
        .map(map_coupon)
        .collect();

    SalesInvoice {
        header: map_header(cab),
        payments: map_payments(val),
        lines,
        coupons,
    }
}

/// Simplified rows for the passthrough endpoint (`ArrayOfFacturaVenta.FacturaVenta`)
pub fn summarize(doc: &Value) -> Vec<InvoiceSummary> {
    pick(doc, &["ArrayOfFacturaVenta.FacturaVenta", "FacturaVenta"])
        .map(as_list)
        .unwrap_or_default()
        .into_iter()
        .map(|f| {
            let cab = field(f, &["cabecera"]).unwrap_or(f);
            InvoiceSummary {
                id_factura: field_i64(cab, &["IdFactura", "Numero"]),
                fecha_emision: field_str(cab, &["FechaEmision", "Fecha"]),
                monto_total: field_f64(cab, &["MontoTotal", "Total"]).unwrap_or(0.0),
                nombre_cliente: field_str(cab, &["NombreCliente", "RazonSocial"])
                    .unwrap_or_else(|| "Sin nombre".to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::xml::xml_to_value;
    use chrono::NaiveDate;

    const INVOICE_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ArrayOfFacturasVenta xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <FacturasVenta>
    <cabecera>
      <TipoComprobante>FCB</TipoComprobante>
      <PuntoVenta>3</PuntoVenta>
      <Numero>1501</Numero>
      <Fecha>05/03/2024 10:20:30</Fecha>
      <RazonSocial>CONSUMIDOR FINAL</RazonSocial>
      <IdLocalidad xsi:nil="true" />
      <CodigoPostal>0</CodigoPostal>
      <Moneda />
      <NetoGravado>1000.456</NetoGravado>
      <IVA>210.1</IVA>
      <Total>1210.556</Total>
      <Jurisdiccion>902</Jurisdiccion>
      <IdEstacion>1</IdEstacion>
      <idMovimientoFac>0</idMovimientoFac>
      <CuponesTarjeta>
        <CuponTarjeta>
          <IdTarjeta>5</IdTarjeta>
          <Tarjeta>VISA</Tarjeta>
          <NumeroCupon>778</NumeroCupon>
          <TotalTarjetas>1210.56</TotalTarjetas>
        </CuponTarjeta>
      </CuponesTarjeta>
    </cabecera>
    <detalle>
      <Detalle>
        <Cantidad>10.12346</Cantidad>
        <DescripcionArticulo>NAFTA SUPER</DescripcionArticulo>
        <Precio>99.87654</Precio>
        <IdCierreTurno>77</IdCierreTurno>
        <TotalRenglon>1010.556</TotalRenglon>
      </Detalle>
      <Detalle>
        <Cantidad>1</Cantidad>
        <DescripcionArticulo>SIN CIERRE</DescripcionArticulo>
        <IdCierreTurno>0</IdCierreTurno>
      </Detalle>
    </detalle>
    <valores>
      <Efectivo>0</Efectivo>
      <Tarjetas>1210.56</Tarjetas>
      <ChequesPropios>0</ChequesPropios>
    </valores>
  </FacturasVenta>
</ArrayOfFacturasVenta>"#;

    #[test]
    fn maps_invoice_document() {
        let doc = xml_to_value(INVOICE_XML).unwrap();
        let nodes = invoice_nodes(&doc);
        assert_eq!(nodes.len(), 1);

        let invoice = map_invoice(nodes[0]);
        let h = &invoice.header;
        assert_eq!(h.numero, 1501);
        assert_eq!(h.punto_venta, 3);
        assert_eq!(h.tipo_comprobante.as_deref(), Some("FCB"));
        assert_eq!(
            h.fecha,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(10, 20, 30).unwrap()
        );
        assert_eq!(h.id_localidad, None);
        assert_eq!(h.codigo_postal, None);
        assert_eq!(h.moneda, "PES");
        assert_eq!(h.neto_gravado, 1000.46);
        assert_eq!(h.total, 1210.56);
        assert_eq!(h.jurisdiccion, Some(902));
        assert_eq!(h.id_estacion, Some(1));
        assert_eq!(h.id_movimiento_fac, None);
        assert_eq!(h.id_movimiento_cancelado, None);

        assert_eq!(invoice.payments.tarjetas, 1210.56);
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].cantidad, 10.1235);
        assert_eq!(invoice.lines[0].precio, 99.8765);
        assert_eq!(invoice.lines[0].total_renglon, 1010.56);
        assert_eq!(invoice.coupons.len(), 1);
        assert_eq!(invoice.coupons[0].tarjeta.as_deref(), Some("VISA"));
    }

    #[test]
    fn alternative_roots() {
        let doc = serde_json::json!({"FacturasVenta": [{"cabecera": {}}, {"cabecera": {}}]});
        assert_eq!(invoice_nodes(&doc).len(), 2);
        assert!(invoice_nodes(&Value::Null).is_empty());
    }

    #[test]
    fn summary_defaults_customer_name() {
        let doc = xml_to_value(
            "<ArrayOfFacturaVenta><FacturaVenta><IdFactura>9</IdFactura><MontoTotal>10.5</MontoTotal>\
             </FacturaVenta></ArrayOfFacturaVenta>",
        )
        .unwrap();
        let rows = summarize(&doc);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id_factura, Some(9));
        assert_eq!(rows[0].monto_total, 10.5);
        assert_eq!(rows[0].nombre_cliente, "Sin nombre");
    }
}
