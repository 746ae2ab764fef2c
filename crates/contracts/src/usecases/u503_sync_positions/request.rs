use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionsQuery {
    pub plate: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionHistoryQuery {
    pub limit: Option<u64>,
}

/// Body of `POST /api/positions/sincronizar`. Without a plate every vehicle is synced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncPositionsRequest {
    #[serde(default)]
    pub plate: Option<String>,
}
