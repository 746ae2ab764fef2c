use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::{looks_like_html, ApiError};
use crate::shared::config::{self, ApiConfig};
use crate::shared::retry::{retry_fixed, RetryPolicy};
use crate::shared::xml::{parse_any, preview};

/// HTTP client for the station-management API
///
/// Every GET goes through [`retry_fixed`] with the configured attempts and delay.
#[derive(Clone)]
pub struct StationApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    policy: RetryPolicy,
}

impl StationApiClient {
    pub fn new(cfg: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            token: cfg.token.clone(),
            policy: RetryPolicy::new(cfg.retry_attempts, Duration::from_millis(cfg.retry_delay_ms)),
        })
    }

    pub fn from_config() -> Result<Self> {
        Self::new(&config::get()?.api)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn fetch_once(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = self.url(path);
        tracing::debug!("Station API: GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json, application/xml")
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            tracing::warn!(
                "Station API {} responded {}: {}",
                path,
                status.as_u16(),
                preview(&body)
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: preview(&body),
            }
            .into());
        }

        if looks_like_html(&body) {
            tracing::error!("Station API {} returned HTML: {}", path, preview(&body));
            return Err(ApiError::HtmlPage.into());
        }

        tracing::debug!("Station API {} response: {}", path, preview(&body));
        Ok(body)
    }

    /// Raw response body
    pub async fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        retry_fixed(self.policy, path, || self.fetch_once(path, query)).await
    }

    /// Body parsed as JSON or XML. Empty body is `Null`.
    pub async fn get_document(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let text = self.get_text(path, query).await?;
        parse_any(&text).map_err(|e| ApiError::Parse(format!("{}: {}", path, e)).into())
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let text = self.get_text(path, query).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(format!("{}: {}", path, e)).into())
    }
}

#[cfg(test)]
pub(crate) fn test_config(base_url: String) -> ApiConfig {
    ApiConfig {
        base_url,
        token: "test-token".into(),
        timeout_secs: 5,
        retry_attempts: 3,
        retry_delay_ms: 1,
        station_id: 1,
        register_id: 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn sends_bearer_and_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/Cierres/GetUltimosCierresTurno")
                    .query_param("idEstacion", "1")
                    .query_param("fecha", "2024-03-05")
                    .header("Authorization", "Bearer test-token");
                then.status(200)
                    .body("<ArrayOfCierreTurno><CierreTurno><Caja>PLAYA</Caja></CierreTurno></ArrayOfCierreTurno>");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let doc = client
            .get_document(
                "Cierres/GetUltimosCierresTurno",
                &[("idEstacion", "1".into()), ("fecha", "2024-03-05".into())],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(doc["ArrayOfCierreTurno"]["CierreTurno"]["Caja"], "PLAYA");
    }

    #[tokio::test]
    async fn json_body_is_preferred() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Tanques/GetAllTanques");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"[{"idTanque": 3, "articulo": {"descripcion": "NAFTA SUPER"}}]"#);
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let tanks: Vec<Value> = client.get_json("Tanques/GetAllTanques", &[]).await.unwrap();
        assert_eq!(tanks.len(), 1);
        assert_eq!(tanks[0]["idTanque"], 3);
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/Facturacion/GetFacturasVenta");
                then.status(500).body("boom");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let err = client
            .get_text("Facturacion/GetFacturasVenta", &[])
            .await
            .unwrap_err();

        assert_eq!(mock.hits_async().await, 3);
        assert_eq!(super::super::api_error(&err).and_then(|e| e.status()), Some(500));
    }

    #[tokio::test]
    async fn not_found_is_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/CtaCte/GetRecibosEntreFechas");
                then.status(404).body("missing");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let err = client
            .get_text("CtaCte/GetRecibosEntreFechas", &[])
            .await
            .unwrap_err();

        assert_eq!(mock.hits_async().await, 1);
        assert_eq!(super::super::api_error(&err).and_then(|e| e.status()), Some(404));
    }

    #[tokio::test]
    async fn html_error_page_is_detected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Cajas/GetAllCajas");
                then.status(200).body("<!DOCTYPE html><html><body>Login</body></html>");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let err = client.get_document("Cajas/GetAllCajas", &[]).await.unwrap_err();
        assert!(matches!(super::super::api_error(&err), Some(ApiError::HtmlPage)));
    }

    #[tokio::test]
    async fn empty_body_is_null() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/CtaCte/GetRecibosEntreFechas");
                then.status(200).body("");
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let doc = client
            .get_document("CtaCte/GetRecibosEntreFechas", &[])
            .await
            .unwrap();
        assert!(doc.is_null());
    }
}
