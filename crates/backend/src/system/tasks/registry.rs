use std::collections::HashMap;
use std::sync::Arc;

use super::manager::TaskManager;

/// Реестр менеджеров задач: тип задачи → менеджер.
pub struct TaskManagerRegistry {
    managers: HashMap<String, Arc<dyn TaskManager>>,
}

impl TaskManagerRegistry {
    pub fn new() -> Self {
        Self {
            managers: HashMap::new(),
        }
    }

    /// Регистрирует менеджер задач.
    pub fn register<T: TaskManager + 'static>(&mut self, manager: T) {
        let task_type = manager.task_type().to_string();
        self.managers.insert(task_type, Arc::new(manager));
    }

    /// Возвращает менеджер задач по его типу.
    pub fn get(&self, task_type: &str) -> Option<Arc<dyn TaskManager>> {
        self.managers.get(task_type).cloned()
    }

    pub fn task_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.managers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for TaskManagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
