use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Posicion GPS de un vehiculo, normalizada desde el rastreador
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    /// `YYYY-MM-DD HH:mm:ss` as sent by the tracker
    pub date: String,
    pub speed: f64,
    pub direction: f64,
    pub event_code: Option<String>,
    pub event: Option<String>,
    pub plate: String,
    pub imei: Option<String>,
    pub odometer: i64,
    pub hourmeter: i64,
    pub driver_key: Option<String>,
    pub driver_name: Option<String>,
    pub driver_document: Option<String>,
}

/// Fila almacenada en `positions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPosition {
    pub id: i32,
    pub lat: f64,
    pub lng: f64,
    pub date: NaiveDateTime,
    pub speed: f64,
    pub direction: f64,
    pub event_code: Option<String>,
    pub event: Option<String>,
    pub plate: String,
    pub imei: Option<String>,
    pub odometer: i32,
    pub hourmeter: i32,
    pub driver_key: Option<String>,
    pub driver_name: Option<String>,
    pub driver_document: Option<String>,
}
