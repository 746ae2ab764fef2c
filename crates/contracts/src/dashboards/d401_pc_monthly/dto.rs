use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fila de `GET /api/pcMensual`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcMonthlyRow {
    pub fecha: NaiveDate,
    pub estacion_id: Option<i64>,
    pub nombre_estacion: Option<String>,
    pub caja_id: Option<i64>,
    pub nombre_caja: Option<String>,
    pub categoria: Option<String>,
    pub producto: Option<String>,
    pub total_importe: f64,
    pub total_cantidad: f64,
}

/// Fila de `GET /api/pcResumenMensual`, agrupada por tipo de producto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcSummaryRow {
    /// liquidos, gnc, lubricantes, adblue, shop u otros
    pub tipo: String,
    pub total_cantidad: f64,
    pub total_importe: f64,
    pub promedio_precio: f64,
}

impl PcSummaryRow {
    pub fn new(tipo: String, total_cantidad: f64, total_importe: f64) -> Self {
        let promedio_precio = if total_cantidad > 0.0 {
            total_importe / total_cantidad
        } else {
            0.0
        };
        Self {
            tipo,
            total_cantidad,
            total_importe,
            promedio_precio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_price_is_zero_without_quantity() {
        let row = PcSummaryRow::new("shop".into(), 0.0, 1500.0);
        assert_eq!(row.promedio_precio, 0.0);

        let row = PcSummaryRow::new("liquidos".into(), 4.0, 10.0);
        assert!((row.promedio_precio - 2.5).abs() < f64::EPSILON);
    }
}
