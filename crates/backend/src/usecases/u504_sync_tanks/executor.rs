use anyhow::Result;
use contracts::domain::a005_tank::aggregate::TankLevel;
use contracts::usecases::u504_sync_tanks::TankSyncResult;
use serde_json::Value;

use crate::domain::a005_tank::{repository, service};
use crate::shared::station_api::StationApiClient;
use crate::shared::xml::{as_list, pick};

/// Executor для обновления уровней резервуаров (u504)
#[derive(Default)]
pub struct SyncTanksExecutor;

impl SyncTanksExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Live levels of the monitored tanks
    pub async fn current_levels(&self) -> Result<Vec<TankLevel>> {
        let client = StationApiClient::from_config()?;
        fetch_levels(&client).await
    }

    /// Levels as last stored
    pub async fn stored_levels(&self) -> Result<Vec<TankLevel>> {
        repository::list_states().await
    }

    pub async fn sync(&self) -> Result<TankSyncResult> {
        let tanques = self.current_levels().await?;
        for level in &tanques {
            repository::upsert_state(level).await?;
        }
        tracing::info!("Tank levels stored: {}", tanques.len());
        Ok(TankSyncResult {
            actualizados: tanques.len(),
            tanques,
        })
    }
}

fn tank_list(doc: &Value) -> Vec<Value> {
    match doc {
        Value::Array(items) => items.clone(),
        _ => pick(doc, &["ArrayOfTanque.Tanque", "Tanques.Tanque", "Tanque"])
            .map(as_list)
            .unwrap_or_default()
            .into_iter()
            .cloned()
            .collect(),
    }
}

async fn fetch_levels(client: &StationApiClient) -> Result<Vec<TankLevel>> {
    let doc = client.get_document("Tanques/GetAllTanques", &[]).await?;
    let tanks = service::monitored_tanks(&tank_list(&doc));
    tracing::debug!("Monitored tanks: {}", tanks.len());

    let mut levels = Vec::with_capacity(tanks.len());
    for tank in &tanks {
        let info = client
            .get_document(
                "Tanques/GetInformacionActualTanque",
                &[("idTanque", tank.id_tanque.to_string())],
            )
            .await?;
        let info = pick(&info, &["InformacionActualTanque"]).unwrap_or(&info);
        levels.push(service::level_from_info(tank, info));
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::station_api::client::test_config;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn only_monitored_tanks_are_queried() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/Tanques/GetAllTanques");
                then.status(200).header("content-type", "application/json").body(
                    r#"[
                        {"idTanque": 1, "articulo": {"descripcion": "NAFTA SUPER"}},
                        {"idTanque": 2, "articulo": {"descripcion": "GNC"}}
                    ]"#,
                );
            })
            .await;
        let info = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/Tanques/GetInformacionActualTanque")
                    .query_param("idTanque", "1");
                then.status(200).header("content-type", "application/json").body(
                    r#"{"litros": 8000, "litrosVacio": 2000, "fechaHoraMedicion": "2024-03-05T08:00:00"}"#,
                );
            })
            .await;

        let client = StationApiClient::new(&test_config(server.base_url())).unwrap();
        let levels = fetch_levels(&client).await.unwrap();

        info.assert_hits_async(1).await;
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].capacidad, 10000.0);
        assert_eq!(levels[0].temperatura, None);
    }
}
