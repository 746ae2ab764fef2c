use anyhow::Result;
use async_trait::async_trait;
use contracts::system::tasks::aggregate::ScheduledTask;
use contracts::system::tasks::progress::TaskProgress;
use std::sync::Arc;

use crate::shared::tracker_api::TrackerApiClient;
use crate::system::tasks::{logger::TaskLogger, manager::TaskManager};
use crate::usecases::u503_sync_positions::SyncPositionsExecutor;

pub struct U503SyncPositionsManager {
    executor: Arc<SyncPositionsExecutor>,
}

impl U503SyncPositionsManager {
    pub fn new(executor: Arc<SyncPositionsExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TaskManager for U503SyncPositionsManager {
    fn task_type(&self) -> &'static str {
        "u503_sync_positions"
    }

    async fn run(
        &self,
        _task: &ScheduledTask,
        session_id: &str,
        logger: Arc<TaskLogger>,
    ) -> Result<()> {
        let client = TrackerApiClient::from_config()?;
        let tracker = &self.executor.progress_tracker;
        tracker.create_session(session_id.to_string());

        let result = self.executor.execute(session_id, &client, None).await;
        tracker.finish_session(session_id);

        logger.write_log(
            session_id,
            &format!(
                "Positions: {} total, {} inserted, {} updated, {} errors",
                result.total,
                result.insertados,
                result.actualizados,
                result.errores.len()
            ),
        )?;
        for e in &result.errores {
            logger.write_log(session_id, e)?;
        }
        Ok(())
    }

    fn get_progress(&self, session_id: &str) -> Option<TaskProgress> {
        self.executor
            .progress_tracker
            .get_progress(session_id)
            .map(|p| p.into())
    }
}
