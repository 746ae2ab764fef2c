use serde::{Deserialize, Serialize};

/// Query of the invoice/receipt sync endpoints.
/// `fechaInicio` defaults to yesterday, `fechaFin` to `fechaInicio`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSyncQuery {
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

/// Query of the vendor passthrough endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassthroughQuery {
    pub desde_fecha: Option<String>,
    pub hasta_fecha: Option<String>,
}

/// `GET /api/logs-facturacion?tipo=FACTURAS|RECIBOS&limit=50`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestLogQuery {
    pub tipo: Option<String>,
    pub limit: Option<u64>,
}

/// `POST /api/u502/start`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncBillingRequest {
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub fecha_fin: Option<String>,
    /// Replay every month since `sync.history_start`
    #[serde(default)]
    pub history: bool,
}
