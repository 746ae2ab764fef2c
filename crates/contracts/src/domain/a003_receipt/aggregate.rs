use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptHeader {
    pub fecha_recibo: NaiveDateTime,
    pub punto_venta_recibo: i64,
    pub numero_recibo: i64,
    pub razon_social: Option<String>,
    pub numero_documento: Option<String>,
    pub total_efectivo: f64,
    pub total_sin_imputar: f64,
}

/// Comprobante cancelado por el recibo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputedVoucher {
    pub fecha_comprobante: NaiveDateTime,
    pub tipo_comprobante: Option<String>,
    pub punto_venta_comprobante: i64,
    pub numero_comprobante: i64,
    pub total_comprobante: f64,
    pub total_imputado: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThirdPartyCheck {
    pub fecha_cheque: Option<NaiveDateTime>,
    pub banco_cheques: Option<String>,
    pub caja_cheque: Option<String>,
    pub numero_cheque: Option<i64>,
    pub emisor: Option<String>,
    pub cuit_emisor: Option<String>,
    pub total_cheques: f64,
    pub fecha_entrada: Option<NaiveDateTime>,
    pub fecha_salida: Option<NaiveDateTime>,
    pub rechazado: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptCard {
    pub id_tarjeta: Option<i64>,
    pub total_tarjetas: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptTransfer {
    pub banco_transferencias: Option<String>,
    pub numero_cuenta: Option<String>,
    pub total_transferencias: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptWithholding {
    pub tipo_retencion: Option<String>,
    pub total_retenciones: f64,
}

/// Recibo de cuenta corriente con todas sus partes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub header: ReceiptHeader,
    pub imputed: Vec<ImputedVoucher>,
    pub checks: Vec<ThirdPartyCheck>,
    pub cards: Vec<ReceiptCard>,
    pub transfers: Vec<ReceiptTransfer>,
    pub withholdings: Vec<ReceiptWithholding>,
}

/// Vista resumida que devuelve `GET /api/CtaCte/GetRecibosEntreFechas`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReceiptSummary {
    pub id_recibo: Option<i64>,
    pub fecha_emision: Option<String>,
    pub monto: f64,
    pub id_cliente: Option<i64>,
    pub nombre_cliente: String,
}
