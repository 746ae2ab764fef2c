use serde::{Deserialize, Serialize};

/// `GET /api/cierres`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureListQuery {
    pub id_estacion: Option<i64>,
    pub id_caja: Option<i64>,
    /// YYYY-MM-DD, today when absent
    pub fecha: Option<String>,
}

/// `GET /api/cierres/detalle`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureDetailQuery {
    pub id_estacion: Option<i64>,
    pub id_caja: Option<i64>,
    pub fecha_hora_cierre: Option<String>,
}

/// `POST /api/cierres/sync?fechaInicio&fechaFin`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRangeQuery {
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

/// Background start. Without dates the range continues from the last stored metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncClosuresRequest {
    #[serde(default)]
    pub fecha_inicio: Option<String>,
    #[serde(default)]
    pub fecha_fin: Option<String>,
}
