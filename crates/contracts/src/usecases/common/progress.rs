use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a running or finished sync session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportProgress {
    pub session_id: String,
    pub status: ImportStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,

    /// One entry per synced entity (closures, invoices, receipts...)
    pub aggregates: Vec<AggregateProgress>,

    pub total_processed: i32,
    pub total_inserted: i32,
    pub total_updated: i32,
    pub total_errors: i32,

    pub errors: Vec<ImportError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateProgress {
    pub aggregate_index: String,
    pub aggregate_name: String,
    pub status: AggregateImportStatus,
    pub processed: i32,
    pub total: Option<i32>,
    pub inserted: i32,
    pub updated: i32,
    pub errors: i32,
    pub current_item: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateImportStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportError {
    pub aggregate_index: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ImportProgress {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            status: ImportStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            updated_at: Utc::now(),
            aggregates: Vec::new(),
            total_processed: 0,
            total_inserted: 0,
            total_updated: 0,
            total_errors: 0,
            errors: Vec::new(),
        }
    }

    pub fn add_error(
        &mut self,
        aggregate_index: Option<String>,
        message: String,
        details: Option<String>,
    ) {
        self.errors.push(ImportError {
            aggregate_index,
            message,
            details,
            occurred_at: Utc::now(),
        });
        self.total_errors += 1;
    }

    /// Final status given the errors collected so far
    pub fn final_status(&self) -> ImportStatus {
        if self.total_errors > 0 {
            ImportStatus::CompletedWithErrors
        } else {
            ImportStatus::Completed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_turn_completion_into_completed_with_errors() {
        let mut progress = ImportProgress::new("s1".into());
        assert_eq!(progress.final_status(), ImportStatus::Completed);

        progress.add_error(Some("a002".into()), "boom".into(), None);
        assert_eq!(progress.total_errors, 1);
        assert_eq!(progress.final_status(), ImportStatus::CompletedWithErrors);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ImportStatus::CompletedWithErrors).unwrap();
        assert_eq!(json, "\"completed_with_errors\"");
    }
}
