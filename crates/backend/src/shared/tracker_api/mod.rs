use anyhow::{Context, Result};
use contracts::domain::a004_vehicle_position::aggregate::Position;
use serde_json::Value;
use std::time::Duration;

use crate::shared::config::{self, TrackerConfig};
use crate::shared::numbers::{safe_int, safe_number};
use crate::shared::station_api::{looks_like_html, ApiError};
use crate::shared::xml::{field_str, preview};

/// Client for the fleet GPS tracker
#[derive(Clone)]
pub struct TrackerApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl TrackerApiClient {
    pub fn new(cfg: &TrackerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
        })
    }

    pub fn from_config() -> Result<Self> {
        Self::new(&config::get()?.tracker)
    }

    /// Latest positions, optionally for a single plate.
    /// Failures are logged and reported as an empty list.
    pub async fn positions(&self, plate: Option<&str>, limit: u32) -> Vec<Position> {
        match self.fetch_positions(plate, limit).await {
            Ok(positions) => positions,
            Err(e) => {
                tracing::error!("Tracker API error: {:#}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_positions(&self, plate: Option<&str>, limit: u32) -> Result<Vec<Position>> {
        let mut query: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(plate) = plate.filter(|p| !p.trim().is_empty()) {
            query.push(("plate", plate.trim().to_string()));
        }

        let url = format!("{}/positions", self.base_url);
        tracing::info!("Tracker API: GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: preview(&body),
            }
            .into());
        }
        if looks_like_html(&body) {
            return Err(ApiError::HtmlPage.into());
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(positions_from_value(&value))
    }
}

/// Accepts a bare array or `{ ok, data: [...] }`
fn positions_from_value(value: &Value) -> Vec<Position> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    items.iter().filter_map(position_from_value).collect()
}

fn position_from_value(v: &Value) -> Option<Position> {
    let plate = field_str(v, &["plate"])?;
    let date = field_str(v, &["date"])?;
    Some(Position {
        lat: safe_number(v.get("lat"), 8),
        lng: safe_number(v.get("lng"), 8),
        date,
        speed: safe_number(v.get("speed"), 2),
        direction: safe_number(v.get("direction"), 2),
        event_code: field_str(v, &["event_code"]),
        event: field_str(v, &["event"]),
        plate,
        imei: field_str(v, &["imei"]),
        odometer: safe_int(v.get("odometer")),
        hourmeter: safe_int(v.get("hourmeter")),
        driver_key: field_str(v, &["driver_key"]),
        driver_name: field_str(v, &["driver_name"]),
        driver_document: field_str(v, &["driver_document"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(base_url: String) -> TrackerApiClient {
        TrackerApiClient::new(&TrackerConfig {
            base_url,
            token: "tracker-token".into(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn parses_string_numbers() {
        let v = json!([{
            "lat": "-34.60371234", "lng": -58.38159, "date": "2024-06-01 12:30:45",
            "speed": "45.5", "direction": 180, "plate": "AB123CD",
            "odometer": "120345", "hourmeter": 10
        }]);
        let positions = positions_from_value(&v);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].lat, -34.60371234);
        assert_eq!(positions[0].speed, 45.5);
        assert_eq!(positions[0].odometer, 120345);
        assert_eq!(positions[0].imei, None);
    }

    #[test]
    fn wrapped_payload_and_rows_without_plate() {
        let v = json!({"ok": true, "data": [
            {"plate": "AA000AA", "date": "2024-06-01 00:00:00"},
            {"date": "2024-06-01 00:00:00"}
        ]});
        assert_eq!(positions_from_value(&v).len(), 1);
        assert!(positions_from_value(&json!({"ok": false})).is_empty());
    }

    #[tokio::test]
    async fn fetches_with_plate_and_limit() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/positions")
                    .query_param("limit", "1")
                    .query_param("plate", "AB123CD")
                    .header("Authorization", "Bearer tracker-token");
                then.status(200).json_body(json!({"ok": true, "data": [
                    {"plate": "AB123CD", "date": "2024-06-01 12:30:45", "lat": 1, "lng": 2}
                ]}));
            })
            .await;

        let positions = client(server.base_url()).positions(Some("AB123CD"), 1).await;
        mock.assert_async().await;
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].plate, "AB123CD");
    }

    #[tokio::test]
    async fn errors_yield_empty_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/positions");
                then.status(401).body("unauthorized");
            })
            .await;

        assert!(client(server.base_url()).positions(None, 100).await.is_empty());
    }
}
