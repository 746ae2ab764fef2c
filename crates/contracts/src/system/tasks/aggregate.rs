use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Уникальный идентификатор регламентного задания
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledTaskId(pub Uuid);

impl ScheduledTaskId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_string(&self) -> String {
        self.0.to_string()
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ScheduledTaskId)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Регламентное задание (`sys_scheduled_tasks`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: ScheduledTaskId,
    pub code: String,
    pub description: String,

    /// Ключ менеджера в реестре
    pub task_type: String,

    /// Cron expression with seconds: `sec min hour day month weekday`
    pub schedule_cron: Option<String>,

    /// Параметры в формате JSON
    pub config_json: String,

    pub is_enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_status: Option<String>,
    pub last_run_log_file: Option<String>,
}

impl ScheduledTask {
    pub fn new_for_insert(
        code: impl Into<String>,
        description: impl Into<String>,
        task_type: impl Into<String>,
        schedule_cron: impl Into<String>,
    ) -> Self {
        Self {
            id: ScheduledTaskId::new_v4(),
            code: code.into(),
            description: description.into(),
            task_type: task_type.into(),
            schedule_cron: Some(schedule_cron.into()),
            config_json: "{}".to_string(),
            is_enabled: true,
            last_run_at: None,
            next_run_at: None,
            last_run_status: None,
            last_run_log_file: None,
        }
    }
}
