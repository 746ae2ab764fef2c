use anyhow::Result;
use chrono::Utc;
use contracts::system::tasks::aggregate::ScheduledTask;
use contracts::system::tasks::progress::TaskStatus;
use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use super::{logger::TaskLogger, registry::TaskManagerRegistry, service};
use crate::usecases::common::new_session_id;

/// Фоновый воркер для выполнения запланированных задач.
pub struct ScheduledTaskWorker {
    registry: Arc<TaskManagerRegistry>,
    logger: Arc<TaskLogger>,
    interval_seconds: u64,
}

impl ScheduledTaskWorker {
    pub fn new(
        registry: Arc<TaskManagerRegistry>,
        logger: Arc<TaskLogger>,
        interval_seconds: u64,
    ) -> Self {
        Self {
            registry,
            logger,
            interval_seconds: interval_seconds.max(1),
        }
    }

    /// Запускает цикл выполнения задач.
    pub async fn run_loop(&self) {
        info!(
            "Scheduled task worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if let Err(e) = self.process_due_tasks().await {
                error!("Error processing scheduled tasks: {:#}", e);
            }
        }
    }

    /// Запускает задачи, время выполнения которых наступило.
    async fn process_due_tasks(&self) -> Result<()> {
        let now = Utc::now();
        let tasks = service::list_enabled_tasks().await?;

        for task in tasks {
            let due = match task.next_run_at {
                Some(next_run_at) => next_run_at <= now,
                None => true,
            };
            if !due {
                continue;
            }

            let next = service::next_run_after(&task, now);
            service::set_next_run(&task.id, next).await?;
            if next.is_none() {
                warn!("Task '{}' has no valid schedule, skipped", task.code);
                continue;
            }

            info!("Task '{}' ({}) is due. Running...", task.description, task.code);
            spawn_task_run(
                Arc::clone(&self.registry),
                Arc::clone(&self.logger),
                task,
            )
            .await?;
        }
        Ok(())
    }
}

/// Marks the task running and executes it on its own tokio task. Returns the session id.
pub async fn spawn_task_run(
    registry: Arc<TaskManagerRegistry>,
    logger: Arc<TaskLogger>,
    task: ScheduledTask,
) -> Result<String> {
    let session_id = new_session_id();
    let started_at = Utc::now();

    service::update_run_status(
        &task.id,
        started_at,
        &TaskStatus::Running.to_string(),
        Some(logger.get_log_file_path(&session_id)),
    )
    .await?;

    let sid = session_id.clone();
    tokio::spawn(async move {
        let status = match registry.get(&task.task_type) {
            Some(manager) => {
                if let Err(e) = logger.write_log(&sid, &format!("Task '{}' started", task.code)) {
                    warn!("Cannot write task log {}: {:#}", sid, e);
                }
                match manager.run(&task, &sid, Arc::clone(&logger)).await {
                    Ok(()) => {
                        info!("Task '{}' session {} completed", task.code, sid);
                        logger.write_log(&sid, "Completed").ok();
                        TaskStatus::Completed
                    }
                    Err(e) => {
                        error!("Task '{}' session {} failed: {:#}", task.code, sid, e);
                        logger.write_log(&sid, &format!("Failed: {:#}", e)).ok();
                        TaskStatus::Failed
                    }
                }
            }
            None => {
                warn!(
                    "No manager found for task type '{}' (task '{}')",
                    task.task_type, task.code
                );
                TaskStatus::Failed
            }
        };

        if let Err(e) =
            service::update_run_status(&task.id, started_at, &status.to_string(), None).await
        {
            error!("Cannot store status of task '{}': {:#}", task.code, e);
        }
    });

    Ok(session_id)
}
