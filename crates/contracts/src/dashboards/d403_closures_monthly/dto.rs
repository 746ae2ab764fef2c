use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureTotalsRow {
    pub fecha: NaiveDate,
    pub id_estacion: Option<i64>,
    pub nombre_estacion: Option<String>,
    pub caja_id: Option<i64>,
    pub nombre_caja: Option<String>,
    pub total_efectivo_recaudado: f64,
    pub importe_ventas_totales_contado: f64,
}
