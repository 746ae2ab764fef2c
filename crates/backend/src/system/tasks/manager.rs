use anyhow::Result;
use async_trait::async_trait;
use contracts::system::tasks::aggregate::ScheduledTask;
use contracts::system::tasks::progress::TaskProgress;
use std::sync::Arc;

use super::logger::TaskLogger;

/// Трейт для менеджеров запланированных задач.
/// Каждый тип задачи имеет свою реализацию.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Тип задачи, который обрабатывает этот менеджер.
    fn task_type(&self) -> &'static str;

    /// Запускает выполнение задачи.
    /// `task`: конфигурация задачи.
    /// `session_id`: идентификатор текущей сессии выполнения.
    /// `logger`: логгер сессии.
    async fn run(&self, task: &ScheduledTask, session_id: &str, logger: Arc<TaskLogger>)
        -> Result<()>;

    /// Текущий прогресс выполнения по session_id.
    fn get_progress(&self, session_id: &str) -> Option<TaskProgress>;
}
