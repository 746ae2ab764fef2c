use chrono::Utc;
use contracts::usecases::common::{
    AggregateImportStatus, AggregateProgress, ImportProgress, ImportStatus,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Сколько часов хранить завершённые сессии
pub const SESSION_RETENTION_HOURS: i64 = 24;

/// Трекер прогресса синхронизации (in-memory, для мониторинга через API)
#[derive(Clone)]
pub struct ProgressTracker {
    sessions: Arc<RwLock<HashMap<String, ImportProgress>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Создать новую сессию. Заодно удаляет завершённые сессии старше суток.
    pub fn create_session(&self, session_id: String) {
        self.cleanup_old_sessions(SESSION_RETENTION_HOURS);
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(session_id.clone(), ImportProgress::new(session_id));
        }
    }

    /// Получить текущий прогресс сессии
    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        self.sessions
            .read()
            .ok()
            .and_then(|sessions| sessions.get(session_id).cloned())
    }

    fn with_session(&self, session_id: &str, f: impl FnOnce(&mut ImportProgress)) {
        if let Ok(mut sessions) = self.sessions.write() {
            if let Some(progress) = sessions.get_mut(session_id) {
                f(progress);
                progress.updated_at = Utc::now();
            }
        }
    }

    /// Добавить агрегат для отслеживания
    pub fn add_aggregate(&self, session_id: &str, aggregate_index: &str, aggregate_name: &str) {
        self.with_session(session_id, |progress| {
            progress.aggregates.push(AggregateProgress {
                aggregate_index: aggregate_index.to_string(),
                aggregate_name: aggregate_name.to_string(),
                status: AggregateImportStatus::Pending,
                processed: 0,
                total: None,
                inserted: 0,
                updated: 0,
                errors: 0,
                current_item: None,
            });
        });
    }

    /// Обновить прогресс агрегата и общие счётчики
    pub fn update_aggregate(
        &self,
        session_id: &str,
        aggregate_index: &str,
        processed: i32,
        total: Option<i32>,
        inserted: i32,
        updated: i32,
    ) {
        self.with_session(session_id, |progress| {
            if let Some(agg) = progress
                .aggregates
                .iter_mut()
                .find(|a| a.aggregate_index == aggregate_index)
            {
                agg.status = AggregateImportStatus::Running;
                agg.processed = processed;
                agg.total = total;
                agg.inserted = inserted;
                agg.updated = updated;
            }
            progress.total_processed = progress.aggregates.iter().map(|a| a.processed).sum();
            progress.total_inserted = progress.aggregates.iter().map(|a| a.inserted).sum();
            progress.total_updated = progress.aggregates.iter().map(|a| a.updated).sum();
        });
    }

    /// Текущий обрабатываемый элемент (день, период, номер...)
    pub fn set_current_item(&self, session_id: &str, aggregate_index: &str, label: Option<String>) {
        self.with_session(session_id, |progress| {
            if let Some(agg) = progress
                .aggregates
                .iter_mut()
                .find(|a| a.aggregate_index == aggregate_index)
            {
                agg.current_item = label;
            }
        });
    }

    pub fn complete_aggregate(&self, session_id: &str, aggregate_index: &str) {
        self.with_session(session_id, |progress| {
            if let Some(agg) = progress
                .aggregates
                .iter_mut()
                .find(|a| a.aggregate_index == aggregate_index)
            {
                agg.status = AggregateImportStatus::Completed;
                agg.current_item = None;
            }
        });
    }

    pub fn fail_aggregate(&self, session_id: &str, aggregate_index: &str, error: String) {
        self.with_session(session_id, |progress| {
            if let Some(agg) = progress
                .aggregates
                .iter_mut()
                .find(|a| a.aggregate_index == aggregate_index)
            {
                agg.status = AggregateImportStatus::Failed;
                agg.errors += 1;
            }
            progress.add_error(Some(aggregate_index.to_string()), error, None);
        });
    }

    /// Ошибка отдельного элемента, синхронизация продолжается
    pub fn add_error(
        &self,
        session_id: &str,
        aggregate_index: Option<&str>,
        message: String,
        details: Option<String>,
    ) {
        self.with_session(session_id, |progress| {
            if let Some(index) = aggregate_index {
                if let Some(agg) = progress
                    .aggregates
                    .iter_mut()
                    .find(|a| a.aggregate_index == index)
                {
                    agg.errors += 1;
                }
            }
            progress.add_error(aggregate_index.map(str::to_string), message, details);
        });
    }

    /// Завершить сессию с явным статусом
    pub fn complete_session(&self, session_id: &str, status: ImportStatus) {
        self.with_session(session_id, |progress| {
            progress.status = status;
            progress.completed_at = Some(Utc::now());
        });
    }

    /// Завершить сессию: Completed или CompletedWithErrors по накопленным ошибкам
    pub fn finish_session(&self, session_id: &str) {
        self.with_session(session_id, |progress| {
            progress.status = progress.final_status();
            progress.completed_at = Some(Utc::now());
        });
    }

    /// Удалить завершённые сессии старше `max_age_hours`
    pub fn cleanup_old_sessions(&self, max_age_hours: i64) {
        if let Ok(mut sessions) = self.sessions.write() {
            let now = Utc::now();
            sessions.retain(|_, progress| match progress.completed_at {
                Some(completed_at) => (now - completed_at).num_hours() < max_age_hours,
                None => true,
            });
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_follow_aggregates() {
        let tracker = ProgressTracker::new();
        tracker.create_session("s".into());
        tracker.add_aggregate("s", "a002", "facturas");
        tracker.add_aggregate("s", "a003", "recibos");

        tracker.update_aggregate("s", "a002", 10, Some(10), 7, 3);
        tracker.update_aggregate("s", "a003", 4, None, 4, 0);

        let p = tracker.get_progress("s").unwrap();
        assert_eq!(p.total_processed, 14);
        assert_eq!(p.total_inserted, 11);
        assert_eq!(p.total_updated, 3);
        assert_eq!(p.aggregates[0].status, AggregateImportStatus::Running);
    }

    #[test]
    fn errors_mark_session_completed_with_errors() {
        let tracker = ProgressTracker::new();
        tracker.create_session("s".into());
        tracker.add_aggregate("s", "a001", "cierres");
        tracker.add_error("s", Some("a001"), "2024-03-05: timeout".into(), None);
        tracker.finish_session("s");

        let p = tracker.get_progress("s").unwrap();
        assert_eq!(p.status, ImportStatus::CompletedWithErrors);
        assert_eq!(p.aggregates[0].errors, 1);
        assert!(p.completed_at.is_some());
    }

    #[test]
    fn unknown_session_is_none_and_cleanup_keeps_running() {
        let tracker = ProgressTracker::new();
        assert!(tracker.get_progress("missing").is_none());

        tracker.create_session("running".into());
        tracker.create_session("done".into());
        tracker.complete_session("done", ImportStatus::Completed);
        tracker.cleanup_old_sessions(0);

        assert!(tracker.get_progress("running").is_some());
        assert!(tracker.get_progress("done").is_none());
    }

    #[test]
    fn new_sessions_evict_expired_ones() {
        let tracker = ProgressTracker::new();
        tracker.create_session("old".into());
        tracker.finish_session("old");
        tracker.with_session("old", |p| {
            p.completed_at = Some(Utc::now() - chrono::Duration::hours(SESSION_RETENTION_HOURS + 1));
        });
        tracker.create_session("recent".into());
        tracker.finish_session("recent");
        tracker.create_session("stuck".into());

        tracker.create_session("next".into());

        assert!(tracker.get_progress("old").is_none());
        assert!(tracker.get_progress("recent").is_some());
        assert!(tracker.get_progress("stuck").is_some());
        assert!(tracker.get_progress("next").is_some());
    }
}
