use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSyncResult {
    pub mensaje: String,
    pub total: usize,
    pub guardados: usize,
    pub errores: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecategorizeResult {
    pub actualizados: usize,
}
