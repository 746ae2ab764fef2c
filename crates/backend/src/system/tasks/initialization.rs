use anyhow::Result;
use chrono::Utc;
use contracts::system::tasks::aggregate::ScheduledTask;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::{
    u501_sync_closures::SyncClosures, u502_sync_billing::SyncBilling,
    u503_sync_positions::SyncPositions, u504_sync_tanks::SyncTanks,
};
use once_cell::sync::{Lazy, OnceCell};
use std::sync::Arc;

use crate::usecases::common::ProgressTracker;
use crate::usecases::{
    u501_sync_closures::SyncClosuresExecutor, u502_sync_billing::SyncBillingExecutor,
    u503_sync_positions::SyncPositionsExecutor, u504_sync_tanks::SyncTanksExecutor,
};

use super::{
    logger::TaskLogger,
    managers::{
        U501SyncClosuresManager, U502SyncBillingManager, U503SyncPositionsManager,
        U504SyncTanksManager,
    },
    registry::TaskManagerRegistry,
    service,
    worker::ScheduledTaskWorker,
};

static TASK_REGISTRY: OnceCell<Arc<TaskManagerRegistry>> = OnceCell::new();

static TASK_LOGGER: Lazy<Arc<TaskLogger>> = Lazy::new(|| Arc::new(TaskLogger::new("task_logs")));

struct DefaultTask {
    code: &'static str,
    description: &'static str,
    task_type: String,
    cron: &'static str,
}

fn default_task<U: UseCaseMetadata>(code: &'static str, cron: &'static str) -> DefaultTask {
    DefaultTask {
        code,
        description: U::display_name(),
        task_type: U::full_name(),
        cron,
    }
}

fn default_tasks() -> Vec<DefaultTask> {
    vec![
        default_task::<SyncClosures>("closures_daily", "0 0 3 * * *"),
        default_task::<SyncBilling>("billing_hourly", "0 0 * * * *"),
        default_task::<SyncPositions>("positions_15m", "0 */15 * * * *"),
        default_task::<SyncTanks>("tanks_30m", "0 */30 * * * *"),
    ]
}

pub fn registry() -> Option<Arc<TaskManagerRegistry>> {
    TASK_REGISTRY.get().cloned()
}

pub fn task_logger() -> Arc<TaskLogger> {
    Arc::clone(&TASK_LOGGER)
}

fn build_registry() -> TaskManagerRegistry {
    let mut registry = TaskManagerRegistry::new();

    let u501 = Arc::new(SyncClosuresExecutor::new(Arc::new(ProgressTracker::new())));
    registry.register(U501SyncClosuresManager::new(u501));

    let u502 = Arc::new(SyncBillingExecutor::new(Arc::new(ProgressTracker::new())));
    registry.register(U502SyncBillingManager::new(u502));

    let u503 = Arc::new(SyncPositionsExecutor::new(Arc::new(ProgressTracker::new())));
    registry.register(U503SyncPositionsManager::new(u503));

    registry.register(U504SyncTanksManager::new(
        SyncTanksExecutor::new(),
        Arc::new(ProgressTracker::new()),
    ));

    registry
}

/// Inserts the default tasks that are not in `sys_scheduled_tasks` yet, armed for their next slot
pub async fn seed_default_tasks() -> Result<usize> {
    let now = Utc::now();
    let mut inserted = 0;
    for default in default_tasks() {
        let mut task = ScheduledTask::new_for_insert(
            default.code,
            default.description,
            default.task_type,
            default.cron,
        );
        task.next_run_at = service::next_run_after(&task, now);
        if service::ensure_task(task).await? {
            tracing::info!("Scheduled task '{}' created ({})", default.code, default.cron);
            inserted += 1;
        }
    }
    Ok(inserted)
}

/// Инициализирует реестр задач и фоновый воркер.
pub async fn initialize_scheduled_tasks(interval_seconds: u64) -> Result<ScheduledTaskWorker> {
    seed_default_tasks().await?;

    let registry = TASK_REGISTRY.get_or_init(|| Arc::new(build_registry()));
    tracing::info!("Task managers: {}", registry.task_types().join(", "));

    Ok(ScheduledTaskWorker::new(
        Arc::clone(registry),
        task_logger(),
        interval_seconds,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_task_has_a_manager_and_a_valid_schedule() {
        let registry = build_registry();
        for task in default_tasks() {
            assert!(
                registry.get(&task.task_type).is_some(),
                "{} has no manager",
                task.code
            );
            assert!(
                service::parse_schedule(task.cron).is_ok(),
                "{} has a bad cron",
                task.code
            );
        }
        assert_eq!(registry.task_types().len(), 4);
    }
}
