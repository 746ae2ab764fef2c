use anyhow::{bail, Result};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Логгер выполнения задачи: один файл на сессию.
pub struct TaskLogger {
    log_dir: PathBuf,
}

/// Session ids are uuids; anything else could escape the log directory
fn is_valid_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id.len() <= 64
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl TaskLogger {
    pub fn new(log_dir: impl AsRef<Path>) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }

    /// Путь к лог-файлу сессии.
    pub fn get_log_file_path(&self, session_id: &str) -> String {
        self.log_dir
            .join(format!("{}.log", session_id))
            .display()
            .to_string()
    }

    /// Дописывает строку с отметкой времени в лог сессии.
    pub fn write_log(&self, session_id: &str, message: &str) -> Result<()> {
        if !is_valid_session_id(session_id) {
            bail!("Invalid session id: {}", session_id);
        }
        fs::create_dir_all(&self.log_dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.get_log_file_path(session_id))?;

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }

    /// Содержимое лога, `None` если файла нет.
    pub fn read_log(&self, session_id: &str) -> Result<Option<String>> {
        if !is_valid_session_id(session_id) {
            bail!("Invalid session id: {}", session_id);
        }
        let path = self.get_log_file_path(session_id);
        if !Path::new(&path).exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_logger() -> (TaskLogger, PathBuf) {
        let dir = std::env::temp_dir().join(format!("task_logs_{}", uuid::Uuid::new_v4()));
        (TaskLogger::new(&dir), dir)
    }

    #[test]
    fn lines_are_appended_per_session() {
        let (logger, dir) = temp_logger();
        logger.write_log("abc-1", "started").unwrap();
        logger.write_log("abc-1", "finished").unwrap();

        let content = logger.read_log("abc-1").unwrap().unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().last().unwrap().ends_with("finished"));
        assert_eq!(logger.read_log("other").unwrap(), None);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn path_like_session_ids_are_refused() {
        let (logger, _dir) = temp_logger();
        assert!(logger.read_log("../secret").is_err());
        assert!(logger.write_log("a/b", "x").is_err());
    }
}
