use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fila de `logs_ingesta`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestLogEntry {
    pub id: i32,
    pub fecha: NaiveDateTime,
    pub registros_insertados: Option<i64>,
    /// `EXITO - FACTURAS`, `ERROR - RECIBOS`...
    pub estado: String,
    pub mensaje_error: Option<String>,
}

/// Kind of ingestion recorded in `logs_ingesta`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IngestKind {
    Facturas,
    Recibos,
}

impl IngestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestKind::Facturas => "FACTURAS",
            IngestKind::Recibos => "RECIBOS",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "FACTURAS" => Some(IngestKind::Facturas),
            "RECIBOS" => Some(IngestKind::Recibos),
            _ => None,
        }
    }
}
