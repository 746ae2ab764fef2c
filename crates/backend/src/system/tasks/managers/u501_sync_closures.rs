use anyhow::Result;
use async_trait::async_trait;
use contracts::system::tasks::aggregate::ScheduledTask;
use contracts::system::tasks::progress::TaskProgress;
use contracts::usecases::common::ImportStatus;
use std::sync::Arc;

use crate::system::tasks::{logger::TaskLogger, manager::TaskManager};
use crate::usecases::u501_sync_closures::{executor::auto_range, SyncClosuresExecutor};

/// Ежедневная догрузка закрытий смен: от последней сохранённой даты до сегодня
pub struct U501SyncClosuresManager {
    executor: Arc<SyncClosuresExecutor>,
}

impl U501SyncClosuresManager {
    pub fn new(executor: Arc<SyncClosuresExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TaskManager for U501SyncClosuresManager {
    fn task_type(&self) -> &'static str {
        "u501_sync_closures"
    }

    async fn run(
        &self,
        _task: &ScheduledTask,
        session_id: &str,
        logger: Arc<TaskLogger>,
    ) -> Result<()> {
        let (from, to) = auto_range().await?;
        if from > to {
            logger.write_log(session_id, "Closures are up to date")?;
            return Ok(());
        }
        logger.write_log(session_id, &format!("Syncing closures {} .. {}", from, to))?;

        let tracker = &self.executor.progress_tracker;
        tracker.create_session(session_id.to_string());
        match self.executor.execute(session_id, from, to).await {
            Ok(result) => {
                tracker.finish_session(session_id);
                logger.write_log(
                    session_id,
                    &format!("{} closures stored", result.total_cierres),
                )?;
                Ok(())
            }
            Err(e) => {
                tracker.complete_session(session_id, ImportStatus::Failed);
                Err(e)
            }
        }
    }

    fn get_progress(&self, session_id: &str) -> Option<TaskProgress> {
        self.executor
            .progress_tracker
            .get_progress(session_id)
            .map(|p| p.into())
    }
}
