pub mod progress_tracker;

pub use progress_tracker::ProgressTracker;

use contracts::usecases::common::{ImportResponse, ImportStartStatus};
use uuid::Uuid;

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Ответ на запуск фоновой синхронизации
pub fn started(session_id: String) -> ImportResponse {
    ImportResponse {
        session_id,
        status: ImportStartStatus::Started,
        message: "Sync started".to_string(),
    }
}
