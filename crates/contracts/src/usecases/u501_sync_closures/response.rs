use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub desde: String,
    pub hasta: String,
}

/// Resultado de `POST /api/cierres/sync`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureSyncResult {
    pub ok: bool,
    pub message: String,
    pub total_cierres: usize,
    pub rango: DateRange,
}
