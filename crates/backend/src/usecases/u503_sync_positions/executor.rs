use anyhow::Result;
use contracts::domain::a004_vehicle_position::aggregate::{Position, StoredPosition};
use contracts::usecases::common::ImportProgress;
use contracts::usecases::u503_sync_positions::PositionSyncResult;
use std::sync::Arc;

use crate::domain::a004_vehicle_position::{repository, service};
use crate::shared::tracker_api::TrackerApiClient;
use crate::usecases::common::{new_session_id, ProgressTracker};

pub const DEFAULT_LIMIT: u32 = 100;
pub const DEFAULT_HISTORY_LIMIT: u64 = 50;

const AGGREGATE: &str = "a004";

/// Executor для синхронизации GPS-позиций (u503)
pub struct SyncPositionsExecutor {
    pub progress_tracker: Arc<ProgressTracker>,
}

impl SyncPositionsExecutor {
    pub fn new(progress_tracker: Arc<ProgressTracker>) -> Self {
        Self { progress_tracker }
    }

    /// Live positions from the tracker
    pub async fn positions(&self, plate: Option<&str>, limit: u32) -> Result<Vec<Position>> {
        let client = TrackerApiClient::from_config()?;
        Ok(client.positions(plate, limit).await)
    }

    pub async fn last_position(&self, plate: &str) -> Result<Option<Position>> {
        let client = TrackerApiClient::from_config()?;
        Ok(client.positions(Some(plate), 1).await.into_iter().next())
    }

    pub async fn history(&self, plate: &str, limit: u64) -> Result<Vec<StoredPosition>> {
        repository::history(plate, limit).await
    }

    /// Download and upsert. Row failures are collected in `errores`.
    pub async fn sync(&self, plate: Option<&str>) -> Result<PositionSyncResult> {
        let session_id = new_session_id();
        self.progress_tracker.create_session(session_id.clone());
        let client = TrackerApiClient::from_config()?;
        let result = self.execute(&session_id, &client, plate).await;
        self.progress_tracker.finish_session(&session_id);
        Ok(result)
    }

    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        self.progress_tracker.get_progress(session_id)
    }

    pub async fn execute(
        &self,
        session_id: &str,
        client: &TrackerApiClient,
        plate: Option<&str>,
    ) -> PositionSyncResult {
        let mut result = PositionSyncResult::default();
        self.progress_tracker
            .add_aggregate(session_id, AGGREGATE, "Posiciones");

        let positions = client.positions(plate, DEFAULT_LIMIT).await;
        if positions.is_empty() {
            tracing::info!("No positions to sync");
            self.progress_tracker.complete_aggregate(session_id, AGGREGATE);
            return result;
        }
        result.total = positions.len();

        if let Err(e) = repository::ensure_table().await {
            let msg = format!("{:#}", e);
            tracing::error!("positions table unavailable: {}", msg);
            self.progress_tracker
                .fail_aggregate(session_id, AGGREGATE, msg.clone());
            result.errores.push(msg);
            return result;
        }

        for (i, position) in positions.iter().enumerate() {
            if !service::is_storable(position) {
                continue;
            }
            match repository::upsert(position).await {
                Ok(true) => result.insertados += 1,
                Ok(false) => result.actualizados += 1,
                Err(e) => {
                    let msg = format!(
                        "Error al sincronizar posición de {}: {:#}",
                        service::describe(position),
                        e
                    );
                    tracing::error!("{}", msg);
                    self.progress_tracker
                        .add_error(session_id, Some(AGGREGATE), msg.clone(), None);
                    result.errores.push(msg);
                }
            }
            self.progress_tracker.update_aggregate(
                session_id,
                AGGREGATE,
                (i + 1) as i32,
                Some(result.total as i32),
                result.insertados as i32,
                result.actualizados as i32,
            );
        }

        self.progress_tracker.complete_aggregate(session_id, AGGREGATE);
        tracing::info!(
            "Positions synced: {} inserted, {} updated, {} errors",
            result.insertados,
            result.actualizados,
            result.errores.len()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::TrackerConfig;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn empty_tracker_response_is_a_zero_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/positions").query_param("limit", "100");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"ok": true, "data": []}"#);
            })
            .await;

        let client = TrackerApiClient::new(&TrackerConfig {
            base_url: server.base_url(),
            token: "t".into(),
            timeout_secs: 5,
        })
        .unwrap();

        let executor = SyncPositionsExecutor::new(Arc::new(ProgressTracker::new()));
        executor.progress_tracker.create_session("s".into());
        let result = executor.execute("s", &client, None).await;
        assert_eq!(result, PositionSyncResult::default());

        let progress = executor.get_progress("s").unwrap();
        assert_eq!(progress.aggregates.len(), 1);
    }
}
