use anyhow::Result;
use contracts::domain::a007_station_catalog::aggregate::StationMappings;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::shared::station_api::StationApiClient;
use crate::shared::xml::{as_list, field_i64, field_str, pick};

static CATALOG: Lazy<RwLock<StationMappings>> = Lazy::new(|| RwLock::new(StationMappings::default()));

const STATION_ID_FIELDS: &[&str] = &["IdEstacion", "idEstacion", "idestacion", "id", "IDESTACION"];
const STATION_NAME_FIELDS: &[&str] = &["Nombre", "nombre", "NOMBRE"];
const REGISTER_ID_FIELDS: &[&str] = &["idCaja", "IdCaja", "idcaja", "id", "IDCAJA"];
const REGISTER_NAME_FIELDS: &[&str] = &[
    "nombreCaja",
    "NombreCaja",
    "nombrecaja",
    "nombre",
    "NOMBRECAJA",
    "descripcion",
];

fn items<'a>(doc: &'a Value, paths: &[&str]) -> Vec<&'a Value> {
    match doc {
        Value::Array(_) => as_list(doc),
        _ => pick(doc, paths).map(as_list).unwrap_or_default(),
    }
}

fn to_map(items: Vec<&Value>, id_fields: &[&str], name_fields: &[&str]) -> BTreeMap<i64, String> {
    items
        .into_iter()
        .filter_map(|item| Some((field_i64(item, id_fields)?, field_str(item, name_fields)?)))
        .collect()
}

/// Builds the maps from `Estaciones/GetAllEstaciones` and `Cajas/GetAllCajas` documents
pub fn parse_mappings(estaciones: &Value, cajas: &Value) -> StationMappings {
    StationMappings {
        estaciones: to_map(
            items(
                estaciones,
                &["Estaciones.Estacion", "ArrayOfEstacion.Estacion", "Estacion"],
            ),
            STATION_ID_FIELDS,
            STATION_NAME_FIELDS,
        ),
        cajas: to_map(
            items(cajas, &["Cajas.Caja", "ArrayOfCaja.Caja", "Caja"]),
            REGISTER_ID_FIELDS,
            REGISTER_NAME_FIELDS,
        ),
    }
}

/// Fetches both catalogs and replaces the in-memory maps
pub async fn reload(client: &StationApiClient) -> Result<StationMappings> {
    let estaciones = client.get_document("Estaciones/GetAllEstaciones", &[]).await?;
    let cajas = client.get_document("Cajas/GetAllCajas", &[]).await?;
    let mappings = parse_mappings(&estaciones, &cajas);

    tracing::info!(
        "Station catalog loaded: {} estaciones, {} cajas",
        mappings.estaciones.len(),
        mappings.cajas.len()
    );

    if let Ok(mut guard) = CATALOG.write() {
        *guard = mappings.clone();
    }
    Ok(mappings)
}

pub fn current() -> StationMappings {
    CATALOG.read().map(|m| m.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::xml::xml_to_value;
    use serde_json::json;

    #[test]
    fn json_catalogs_with_mixed_field_names() {
        let estaciones = json!([
            {"IdEstacion": 1, "Nombre": "Centro"},
            {"idestacion": "2", "nombre": "Ruta 5"},
            {"Nombre": "sin id"}
        ]);
        let cajas = json!([
            {"idCaja": 2, "nombreCaja": "PLAYA"},
            {"IDCAJA": 3, "descripcion": "SHOP"}
        ]);
        let m = parse_mappings(&estaciones, &cajas);
        assert_eq!(m.estaciones.len(), 2);
        assert_eq!(m.station_name(2), Some("Ruta 5"));
        assert_eq!(m.register_name(3), Some("SHOP"));
    }

    #[test]
    fn xml_catalogs() {
        let estaciones = xml_to_value(
            "<Estaciones><Estacion><IdEstacion>1</IdEstacion><Nombre>Centro</Nombre></Estacion></Estaciones>",
        )
        .unwrap();
        let cajas = xml_to_value(
            "<Caja><IdCaja>2</IdCaja><NombreCaja>PLAYA</NombreCaja></Caja>",
        )
        .unwrap();
        let m = parse_mappings(&estaciones, &cajas);
        assert_eq!(m.station_name(1), Some("Centro"));
        assert_eq!(m.register_name(2), Some("PLAYA"));
    }

    #[test]
    fn empty_documents() {
        let m = parse_mappings(&Value::Null, &Value::Null);
        assert!(m.estaciones.is_empty());
        assert!(m.cajas.is_empty());
    }
}
