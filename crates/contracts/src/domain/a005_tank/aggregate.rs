use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Productos cuyos tanques se monitorean
pub const VALID_TANK_PRODUCTS: [&str; 4] =
    ["NAFTA SUPER", "QUANTIUM NAFTA", "DIESEL X10", "QUANTIUM DIESEL"];

/// Estado actual de un tanque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankLevel {
    pub id_tanque: i64,
    pub producto: String,
    /// litros + litrosVacio
    pub capacidad: f64,
    pub nivel_actual: f64,
    pub temperatura: Option<f64>,
    pub fecha_actualizacion: NaiveDateTime,
}
