use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Una fila por dia, estacion, caja y producto, con los totales del cierre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubdiaryRow {
    pub fecha: NaiveDate,
    pub estacion_id: Option<i64>,
    pub nombre_estacion: Option<String>,
    pub caja_id: Option<i64>,
    pub nombre_caja: Option<String>,
    pub categoria: Option<String>,
    pub nombre: Option<String>,
    pub litros: f64,
    pub importe: f64,
    pub total_efectivo_recaudado: f64,
    pub importe_ventas_totales_contado: f64,
}
