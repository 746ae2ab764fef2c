use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nombres de estaciones y cajas por id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationMappings {
    pub estaciones: BTreeMap<i64, String>,
    pub cajas: BTreeMap<i64, String>,
}

impl StationMappings {
    pub fn station_name(&self, id: i64) -> Option<&str> {
        self.estaciones.get(&id).map(String::as_str)
    }

    pub fn register_name(&self, id: i64) -> Option<&str> {
        self.cajas.get(&id).map(String::as_str)
    }
}
