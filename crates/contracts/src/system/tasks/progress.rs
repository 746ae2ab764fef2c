use serde::{Deserialize, Serialize};
use std::fmt;

use crate::usecases::common::{ImportProgress, ImportStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Running => "Running",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgress {
    pub session_id: String,
    pub status: TaskStatus,
    pub message: String,
    pub total_items: Option<i32>,
    pub processed_items: Option<i32>,
    pub errors: Option<Vec<String>>,
    pub current_item: Option<String>,
    pub log_content: Option<String>,
}

impl From<ImportProgress> for TaskProgress {
    fn from(p: ImportProgress) -> Self {
        let status = match p.status {
            ImportStatus::Running => TaskStatus::Running,
            ImportStatus::Completed | ImportStatus::CompletedWithErrors => TaskStatus::Completed,
            ImportStatus::Failed | ImportStatus::Cancelled => TaskStatus::Failed,
        };
        let current_item = p
            .aggregates
            .iter()
            .rev()
            .find_map(|a| a.current_item.clone());
        let total_items = p.aggregates.iter().filter_map(|a| a.total).sum::<i32>();
        Self {
            session_id: p.session_id,
            status,
            message: format!(
                "processed {}, inserted {}, updated {}",
                p.total_processed, p.total_inserted, p.total_updated
            ),
            total_items: Some(total_items),
            processed_items: Some(p.total_processed),
            errors: if p.errors.is_empty() {
                None
            } else {
                Some(p.errors.into_iter().map(|e| e.message).collect())
            },
            current_item,
            log_content: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_with_errors_maps_to_completed_and_keeps_messages() {
        let mut p = ImportProgress::new("s".into());
        p.add_error(None, "day 2024-01-02 failed".into(), None);
        p.status = ImportStatus::CompletedWithErrors;

        let task: TaskProgress = p.into();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.errors, Some(vec!["day 2024-01-02 failed".to_string()]));
    }
}
