use anyhow::Result;
use async_trait::async_trait;
use contracts::system::tasks::aggregate::ScheduledTask;
use contracts::system::tasks::progress::TaskProgress;
use contracts::usecases::common::ImportStatus;
use std::sync::Arc;

use crate::system::tasks::{logger::TaskLogger, manager::TaskManager};
use crate::usecases::common::ProgressTracker;
use crate::usecases::u504_sync_tanks::SyncTanksExecutor;

const AGGREGATE: &str = "a005";

/// Обновление уровней резервуаров
pub struct U504SyncTanksManager {
    executor: SyncTanksExecutor,
    progress_tracker: Arc<ProgressTracker>,
}

impl U504SyncTanksManager {
    pub fn new(executor: SyncTanksExecutor, progress_tracker: Arc<ProgressTracker>) -> Self {
        Self {
            executor,
            progress_tracker,
        }
    }
}

#[async_trait]
impl TaskManager for U504SyncTanksManager {
    fn task_type(&self) -> &'static str {
        "u504_sync_tanks"
    }

    async fn run(
        &self,
        _task: &ScheduledTask,
        session_id: &str,
        logger: Arc<TaskLogger>,
    ) -> Result<()> {
        let tracker = &self.progress_tracker;
        tracker.create_session(session_id.to_string());
        tracker.add_aggregate(session_id, AGGREGATE, "Tanques");

        match self.executor.sync().await {
            Ok(result) => {
                let n = result.actualizados as i32;
                tracker.update_aggregate(session_id, AGGREGATE, n, Some(n), 0, n);
                tracker.complete_aggregate(session_id, AGGREGATE);
                tracker.finish_session(session_id);
                logger.write_log(session_id, &format!("{} tanks updated", n))?;
                Ok(())
            }
            Err(e) => {
                tracker.fail_aggregate(session_id, AGGREGATE, format!("{:#}", e));
                tracker.complete_session(session_id, ImportStatus::Failed);
                Err(e)
            }
        }
    }

    fn get_progress(&self, session_id: &str) -> Option<TaskProgress> {
        self.progress_tracker
            .get_progress(session_id)
            .map(|p| p.into())
    }
}
