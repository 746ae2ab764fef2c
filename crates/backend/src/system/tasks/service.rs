use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, Utc};
use contracts::system::tasks::aggregate::{ScheduledTask, ScheduledTaskId};
use cron::Schedule;
use std::str::FromStr;

use super::repository;

pub async fn list_all() -> Result<Vec<ScheduledTask>> {
    repository::list_all()
        .await
        .map_err(|e| anyhow!("Database error: {}", e))
}

pub async fn list_enabled_tasks() -> Result<Vec<ScheduledTask>> {
    repository::list_enabled()
        .await
        .map_err(|e| anyhow!("Database error: {}", e))
}

pub async fn get_by_id(id: &ScheduledTaskId) -> Result<Option<ScheduledTask>> {
    repository::get_by_id(id.0)
        .await
        .map_err(|e| anyhow!("Database error: {}", e))
}

/// Inserts the task unless one with the same code exists. Returns whether it was inserted.
pub async fn ensure_task(task: ScheduledTask) -> Result<bool> {
    if repository::get_by_code(&task.code).await?.is_some() {
        return Ok(false);
    }
    repository::insert(&task)
        .await
        .with_context(|| format!("Failed to insert scheduled task {}", task.code))?;
    Ok(true)
}

/// Flips `is_enabled` and returns the updated task
pub async fn toggle_enabled(id: &ScheduledTaskId) -> Result<Option<ScheduledTask>> {
    let Some(task) = get_by_id(id).await? else {
        return Ok(None);
    };
    repository::set_enabled(id.0, !task.is_enabled).await?;
    if task.is_enabled {
        tracing::info!("Task '{}' disabled", task.code);
    } else {
        tracing::info!("Task '{}' enabled", task.code);
        // re-arm from now instead of replaying missed runs
        repository::set_next_run(id.0, next_run_after(&task, Utc::now())).await?;
    }
    get_by_id(id).await
}

pub fn parse_schedule(expr: &str) -> Result<Schedule> {
    Schedule::from_str(expr.trim()).map_err(|e| anyhow!("Invalid cron expression '{}': {}", expr, e))
}

/// First fire time strictly after `after`, evaluated in server local time.
/// A missing or invalid expression yields `None`.
pub fn next_run_after(task: &ScheduledTask, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let expr = task.schedule_cron.as_deref()?;
    match parse_schedule(expr) {
        Ok(schedule) => schedule
            .after(&after.with_timezone(&Local))
            .next()
            .map(|dt| dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::error!("Task '{}' will not be scheduled: {:#}", task.code, e);
            None
        }
    }
}

pub async fn set_next_run(id: &ScheduledTaskId, next: Option<DateTime<Utc>>) -> Result<()> {
    repository::set_next_run(id.0, next)
        .await
        .map_err(|e| anyhow!("Database error: {}", e))
}

pub async fn update_run_status(
    id: &ScheduledTaskId,
    last_run_at: DateTime<Utc>,
    status: &str,
    log_file: Option<String>,
) -> Result<()> {
    repository::update_run_status(id.0, last_run_at, status, log_file)
        .await
        .map_err(|e| anyhow!("Database error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    fn task(cron: &str) -> ScheduledTask {
        ScheduledTask::new_for_insert("t", "test", "u504_sync_tanks", cron)
    }

    #[test]
    fn every_quarter_hour_lands_on_a_quarter() {
        let now = Utc::now();
        let next = next_run_after(&task("0 */15 * * * *"), now).unwrap();
        assert!(next > now);
        assert!(next - now <= Duration::minutes(15));
        assert_eq!(next.minute() % 15, 0);
        assert_eq!(next.second(), 0);
    }

    #[test]
    fn daily_schedule_is_within_a_day() {
        let now = Utc::now();
        let next = next_run_after(&task("0 0 3 * * *"), now).unwrap();
        assert!(next - now <= Duration::hours(25));
        assert_eq!(next.with_timezone(&Local).hour(), 3);
    }

    #[test]
    fn invalid_or_missing_expression_is_never_due() {
        assert_eq!(next_run_after(&task("every day"), Utc::now()), None);
        let mut t = task("0 0 * * * *");
        t.schedule_cron = None;
        assert_eq!(next_run_after(&t, Utc::now()), None);
    }
}
