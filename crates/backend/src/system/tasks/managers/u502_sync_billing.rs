use anyhow::Result;
use async_trait::async_trait;
use contracts::system::tasks::aggregate::ScheduledTask;
use contracts::system::tasks::progress::TaskProgress;
use contracts::usecases::common::ImportStatus;
use std::sync::Arc;

use crate::system::tasks::{logger::TaskLogger, manager::TaskManager};
use crate::usecases::u502_sync_billing::{executor::last_hour_range, SyncBillingExecutor};

/// Ежечасная загрузка счетов и квитанций за последний час
pub struct U502SyncBillingManager {
    executor: Arc<SyncBillingExecutor>,
}

impl U502SyncBillingManager {
    pub fn new(executor: Arc<SyncBillingExecutor>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl TaskManager for U502SyncBillingManager {
    fn task_type(&self) -> &'static str {
        "u502_sync_billing"
    }

    async fn run(
        &self,
        _task: &ScheduledTask,
        session_id: &str,
        logger: Arc<TaskLogger>,
    ) -> Result<()> {
        let (from, to) = last_hour_range();
        logger.write_log(session_id, &format!("Billing sync {} .. {}", from, to))?;

        let tracker = &self.executor.progress_tracker;
        tracker.create_session(session_id.to_string());
        match self.executor.execute_range(session_id, &from, &to).await {
            Ok(result) => {
                tracker.finish_session(session_id);
                logger.write_log(
                    session_id,
                    &format!(
                        "Facturas: {} ({} new), Recibos: {} ({} new)",
                        result.facturas.registros,
                        result.facturas.insertados,
                        result.recibos.registros,
                        result.recibos.insertados
                    ),
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
