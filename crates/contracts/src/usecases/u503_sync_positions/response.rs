use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionSyncResult {
    pub insertados: i64,
    pub actualizados: i64,
    pub total: usize,
    pub errores: Vec<String>,
}
