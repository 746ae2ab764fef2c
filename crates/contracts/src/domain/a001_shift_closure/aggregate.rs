use serde::{Deserialize, Serialize};

/// Cierre de turno tal como lo devuelve `Cierres/GetUltimosCierresTurno`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShiftClosure {
    /// Fecha y hora del cierre, en el formato del proveedor
    pub fecha: Option<String>,
    pub id_cierre_turno: Option<i64>,
    pub numero_turno: Option<i64>,
    pub id_caja: Option<i64>,
    /// Nombre de la caja (PLAYA, SHOP, LUBRICENTRO...)
    pub caja: Option<String>,
    pub id_cierre_caja_tesoreria: Option<i64>,
}

/// Totales de un cierre (`Cierres/GetInformacionCierreTurno`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShiftClosureInfo {
    pub importe_ventas_totales_contado: f64,
    pub total_litros_despachados: f64,
    pub total_efectivo_recaudado: f64,
}

impl ShiftClosureInfo {
    /// Importe a registrar: ventas de contado, o lo recaudado en efectivo si no hay ventas
    pub fn effective_amount(&self) -> f64 {
        if self.importe_ventas_totales_contado != 0.0 {
            self.importe_ventas_totales_contado
        } else {
            self.total_efectivo_recaudado
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftClosureListResponse {
    pub ok: bool,
    pub cantidad: usize,
    pub data: Vec<ShiftClosure>,
}
