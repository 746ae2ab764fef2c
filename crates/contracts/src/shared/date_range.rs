use serde::{Deserialize, Serialize};

/// `?fechaInicio=YYYY-MM-DD&fechaFin=YYYY-MM-DD`, both optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

/// `GET /api/reportes?tipo=...`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub tipo: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
}

impl ReportQuery {
    pub fn range(&self) -> DateRangeQuery {
        DateRangeQuery {
            fecha_inicio: self.fecha_inicio.clone(),
            fecha_fin: self.fecha_fin.clone(),
        }
    }
}
