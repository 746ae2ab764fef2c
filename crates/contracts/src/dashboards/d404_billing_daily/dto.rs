use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filtro de categoria para la facturacion diaria por articulo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCategory {
    Gnc,
    Liquidos,
    Shop,
    Otros,
}

impl BillingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCategory::Gnc => "gnc",
            BillingCategory::Liquidos => "liquidos",
            BillingCategory::Shop => "shop",
            BillingCategory::Otros => "otros",
        }
    }
}

/// Report kinds accepted by `GET /api/reportes?tipo=`
pub const REPORT_TYPES: [&str; 1] = ["unidades-empresa"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCustomerBillingRow {
    pub fecha: NaiveDate,
    pub razon_social: Option<String>,
    pub numero_documento: Option<String>,
    pub cantidad_facturas: i64,
    pub neto_gravado: f64,
    pub iva: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyArticleBillingRow {
    pub fecha: NaiveDate,
    pub id_articulo: Option<i64>,
    pub descripcion_articulo: Option<String>,
    pub descripcion_grupo: Option<String>,
    pub cantidad: f64,
    pub total_neto: f64,
    pub total_iva: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReceiptRow {
    pub fecha: NaiveDate,
    pub razon_social: Option<String>,
    pub numero_documento: Option<String>,
    pub cantidad_recibos: i64,
    pub total_efectivo: f64,
    pub total_sin_imputar: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyUnitsRow {
    pub fecha: NaiveDate,
    pub id_estacion: Option<i64>,
    pub razon_social: Option<String>,
    pub cantidad: f64,
    pub total: f64,
}
