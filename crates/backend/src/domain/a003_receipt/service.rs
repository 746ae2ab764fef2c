use contracts::domain::a003_receipt::aggregate::{
    ImputedVoucher, Receipt, ReceiptCard, ReceiptHeader, ReceiptSummary, ReceiptTransfer,
    ReceiptWithholding, ThirdPartyCheck,
};
use serde_json::Value;

use crate::shared::dates::parse_api_datetime;
use crate::shared::numbers::{non_zero, safe_int, safe_number, truthy};
use crate::shared::xml::{as_list, field_f64, field_i64, field_str, pick};

/// Receipts in a `CtaCte/GetRecibosEntreFechas` document
pub fn receipt_nodes(doc: &Value) -> Vec<&Value> {
    pick(doc, &["root.Recibos", "Recibos", "ArrayOfRecibos.Recibos"])
        .map(as_list)
        .unwrap_or_default()
}

/// `Parent.Parent` collections, e.g. `ChequesTerceros.ChequesTerceros`
fn children<'a>(node: &'a Value, name: &str) -> Vec<&'a Value> {
    node.get(name)
        .and_then(|c| c.get(name))
        .map(as_list)
        .unwrap_or_default()
}

fn text(v: &Value, name: &str) -> Option<String> {
    field_str(v, &[name])
}

fn optional_date(v: &Value, name: &str) -> Option<chrono::NaiveDateTime> {
    text(v, name).map(|s| parse_api_datetime(&s))
}

pub fn map_receipt(r: &Value) -> Receipt {
    let header = ReceiptHeader {
        fecha_recibo: parse_api_datetime(&text(r, "FechaRecibo").unwrap_or_default()),
        punto_venta_recibo: safe_int(r.get("PuntoVentaRecibo")),
        numero_recibo: safe_int(r.get("NumeroRecibo")),
        razon_social: text(r, "RazonSocial"),
        numero_documento: text(r, "NumeroDocumento"),
        total_efectivo: safe_number(r.get("TotalEfectivo"), 2),
        total_sin_imputar: safe_number(r.get("TotalSinImputar"), 2),
    };

    let imputed = children(r, "ComprobantesImputados")
        .into_iter()
        .map(|c| ImputedVoucher {
            fecha_comprobante: parse_api_datetime(
                &text(c, "FechaComprobante").unwrap_or_default(),
            ),
            tipo_comprobante: text(c, "TipoComprobante"),
            punto_venta_comprobante: safe_int(c.get("PuntoVentaComprobante")),
            numero_comprobante: safe_int(c.get("NumeroComprobante")),
            total_comprobante: safe_number(c.get("TotalComprobante"), 2),
            total_imputado: safe_number(c.get("TotalImputado"), 2),
        })
        .collect();

    let checks = children(r, "ChequesTerceros")
        .into_iter()
        .map(|c| ThirdPartyCheck {
            fecha_cheque: optional_date(c, "FechaCheque"),
            banco_cheques: text(c, "BancoCheques"),
            caja_cheque: text(c, "CajaCheque"),
            numero_cheque: non_zero(safe_int(c.get("NumeroCheque"))),
            emisor: text(c, "Emisor"),
            cuit_emisor: text(c, "CuitEmisor"),
            total_cheques: safe_number(c.get("TotalCheques"), 2),
            fecha_entrada: optional_date(c, "FechaEntrada"),
            fecha_salida: optional_date(c, "FechaSalida"),
            rechazado: truthy(c.get("Rechazado")),
        })
        .collect();

    let cards = children(r, "Tarjetas")
        .into_iter()
        .map(|c| ReceiptCard {
            id_tarjeta: non_zero(safe_int(c.get("idTarjeta").or_else(|| c.get("IdTarjeta")))),
            total_tarjetas: safe_number(c.get("TotalTarjetas"), 2),
        })
        .collect();

    let transfers = children(r, "Transferencias")
        .into_iter()
        .map(|t| ReceiptTransfer {
            banco_transferencias: text(t, "BancoTransferencias"),
            numero_cuenta: text(t, "NumeroCuenta"),
            total_transferencias: safe_number(t.get("TotalTransferencias"), 2),
        })
        .collect();

    let withholdings = children(r, "Retenciones")
        .into_iter()
        .map(|w| ReceiptWithholding {
            tipo_retencion: text(w, "TipoRetencion"),
            total_retenciones: safe_number(w.get("TotalRetenciones"), 2),
        })
        .collect();

    Receipt {
        header,
        imputed,
        checks,
        cards,
        transfers,
        withholdings,
    }
}

/// Simplified rows for the passthrough endpoint. Field names vary between
/// vendor versions, so every known alias is tried.
pub fn summarize(doc: &Value) -> Vec<ReceiptSummary> {
    pick(
        doc,
        &[
            "ArrayOfRecibo.Recibo",
            "ArrayOfReciboCtaCte.ReciboCtaCte",
            "Recibos.Recibo",
            "Recibo",
        ],
    )
    .map(as_list)
    .unwrap_or_default()
    .into_iter()
    .map(|r| ReceiptSummary {
        id_recibo: field_i64(r, &["IdRecibo", "NumeroRecibo", "Numero", "Id"]),
        fecha_emision: field_str(r, &["FechaEmision", "FechaRecibo", "Fecha"]),
        monto: field_f64(r, &["Monto", "Total", "Importe", "TotalRecibo", "TotalEfectivo"])
            .unwrap_or(0.0),
        id_cliente: field_i64(r, &["IdCliente", "CodigoCliente", "IdClienteSeleccionado"]),
        nombre_cliente: field_str(r, &["NombreCliente", "RazonSocial", "Cliente"])
            .unwrap_or_else(|| "Sin nombre".to_string()),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::xml::xml_to_value;

    const RECEIPT_XML: &str = r#"<ArrayOfRecibos>
  <Recibos>
    <NumeroRecibo>4410</NumeroRecibo>
    <FechaRecibo>2024-03-05T09:00:00</FechaRecibo>
    <PuntoVentaRecibo>2</PuntoVentaRecibo>
    <RazonSocial>TRANSPORTES SUR SA</RazonSocial>
    <TotalEfectivo>5000</TotalEfectivo>
    <TotalSinImputar>0</TotalSinImputar>
    <ComprobantesImputados>
      <ComprobantesImputados>
        <FechaComprobante>01/03/2024</FechaComprobante>
        <TipoComprobante>FCA</TipoComprobante>
        <PuntoVentaComprobante>3</PuntoVentaComprobante>
        <NumeroComprobante>1200</NumeroComprobante>
        <TotalComprobante>7000</TotalComprobante>
        <TotalImputado>7000</TotalImputado>
      </ComprobantesImputados>
    </ComprobantesImputados>
    <ChequesTerceros>
      <ChequesTerceros>
        <BancoCheques>NACION</BancoCheques>
        <NumeroCheque>555</NumeroCheque>
        <TotalCheques>1000</TotalCheques>
      </ChequesTerceros>
      <ChequesTerceros>
        <BancoCheques>GALICIA</BancoCheques>
        <TotalCheques>1000</TotalCheques>
        <Rechazado>true</Rechazado>
      </ChequesTerceros>
    </ChequesTerceros>
    <Tarjetas>
      <Tarjetas><idTarjeta>4</idTarjeta><TotalTarjetas>10</TotalTarjetas></Tarjetas>
    </Tarjetas>
    <Retenciones />
  </Recibos>
</ArrayOfRecibos>"#;

    #[test]
    fn maps_receipt_with_children() {
        let doc = xml_to_value(RECEIPT_XML).unwrap();
        let nodes = receipt_nodes(&doc);
        assert_eq!(nodes.len(), 1);

        let receipt = map_receipt(nodes[0]);
        assert_eq!(receipt.header.numero_recibo, 4410);
        assert_eq!(receipt.header.punto_venta_recibo, 2);
        assert_eq!(receipt.header.total_efectivo, 5000.0);
        assert_eq!(receipt.imputed.len(), 1);
        assert_eq!(receipt.imputed[0].numero_comprobante, 1200);
        assert_eq!(receipt.checks.len(), 2);
        assert_eq!(receipt.checks[0].numero_cheque, Some(555));
        assert!(!receipt.checks[0].rechazado);
        assert!(receipt.checks[1].rechazado);
        assert_eq!(receipt.checks[1].fecha_cheque, None);
        assert_eq!(receipt.cards[0].id_tarjeta, Some(4));
        assert!(receipt.transfers.is_empty());
        assert!(receipt.withholdings.is_empty());
    }

    #[test]
    fn summary_aliases() {
        let doc = xml_to_value(
            "<ArrayOfReciboCtaCte><ReciboCtaCte><NumeroRecibo>12</NumeroRecibo><Total>99.5</Total>\
             <RazonSocial>ACME</RazonSocial></ReciboCtaCte><ReciboCtaCte><IdRecibo>13</IdRecibo>\
             </ReciboCtaCte></ArrayOfReciboCtaCte>",
        )
        .unwrap();
        let rows = summarize(&doc);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id_recibo, Some(12));
        assert_eq!(rows[0].monto, 99.5);
        assert_eq!(rows[0].nombre_cliente, "ACME");
        assert_eq!(rows[1].nombre_cliente, "Sin nombre");
        assert_eq!(rows[1].monto, 0.0);
    }
}
