use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Cabecera de factura de venta, ya normalizada para `facturas_venta`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesInvoiceHeader {
    pub tipo_comprobante: Option<String>,
    pub punto_venta: i64,
    pub numero: i64,
    pub fecha: NaiveDateTime,
    pub codigo: Option<String>,
    pub razon_social: Option<String>,
    pub numero_documento: Option<String>,
    pub domicilio: Option<String>,
    pub localidad: Option<String>,
    pub id_localidad: Option<String>,
    pub codigo_postal: Option<i64>,
    pub patente: Option<String>,
    pub moneda: String,
    pub tipo_pago: Option<String>,
    pub neto_gravado: f64,
    pub neto_no_gravado: f64,
    pub iva: f64,
    pub impuesto_interno: f64,
    pub tasas: f64,
    pub tasa_vial: f64,
    pub jurisdiccion: Option<i64>,
    pub percepcion_iibb: f64,
    pub percepcion_iva: f64,
    pub otras_percepciones: f64,
    pub total: f64,
    pub id_cliente_seleccionado: Option<String>,
    pub id_estacion: Option<i64>,
    pub chofer: Option<String>,
    pub id_movimiento_fac: Option<i64>,
    pub id_movimiento_cancelado: Option<i64>,
}

/// Medios de pago (`facturas_venta_valores`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePayments {
    pub efectivo: f64,
    pub cheques_propios: i64,
    pub cheques_terceros: f64,
    pub tarjetas: f64,
    pub transferencias: i64,
    pub debito_automatico: i64,
}

/// Renglon de factura. Only lines tied to a shift closure are stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub cantidad: f64,
    pub codigo_articulo: f64,
    pub descripcion_articulo: Option<String>,
    pub id_grupo_articulo: Option<i64>,
    pub descripcion_grupo: Option<String>,
    pub precio: f64,
    pub iva_unitario: f64,
    pub impuesto_interno_unitario: f64,
    pub tasas_unitario: f64,
    pub tasa_vial_unitario: f64,
    pub costo_unitario: f64,
    pub id_articulo: Option<i64>,
    pub id_caja: Option<i64>,
    pub identificador_caja: Option<String>,
    pub id_cierre_turno: i64,
    pub total_neto: f64,
    pub neto_unitario: f64,
    pub total_iva: f64,
    pub total_impuesto_interno: f64,
    pub total_tasas: f64,
    pub total_tasa_vial: f64,
    pub alicuota_iva: Option<String>,
    pub total_renglon: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardCoupon {
    pub id_tarjeta: Option<i64>,
    pub tarjeta: Option<String>,
    pub caja_tarjeta: Option<String>,
    pub numero_cupon: Option<i64>,
    pub fecha_cupon: Option<String>,
    pub total_tarjetas: f64,
    pub numero_lote: Option<String>,
    pub numero_tarjeta: Option<i64>,
    pub codigo_aprobacion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesInvoice {
    pub header: SalesInvoiceHeader,
    pub payments: InvoicePayments,
    pub lines: Vec<InvoiceLine>,
    pub coupons: Vec<CardCoupon>,
}

/// Vista resumida que devuelve `GET /api/Facturacion/GetFacturasVenta`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceSummary {
    pub id_factura: Option<i64>,
    pub fecha_emision: Option<String>,
    pub monto_total: f64,
    pub nombre_cliente: String,
}
