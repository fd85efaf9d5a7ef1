use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::Task;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,

    pub name: String,

    /// Opaque color encoding chosen by the presentation layer,
    /// typically a hex string like "#FF0000".
    pub color: String,

    /// Hidden categories stay in the store with their tasks intact;
    /// they are only excluded from listings.
    #[serde(default)]
    pub is_hidden: bool,

    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Category {
    pub fn new(name: String, color: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            color,
            is_hidden: false,
            tasks: Vec::new(),
        }
    }

    pub fn task_mut(&mut self, task_id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == task_id)
    }

    pub fn sort_tasks_by_creation(&mut self) {
        self.tasks.sort_by_key(|task| task.creation_date);
    }

    /// Deep copy: fresh category id, name marked with `copy_suffix`,
    /// same color and hidden flag, every task re-created with a fresh
    /// id and rewritten back-reference.
    pub fn duplicate(&self, copy_suffix: &str) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            name: format!("{} ({copy_suffix})", self.name),
            color: self.color.clone(),
            is_hidden: self.is_hidden,
            tasks: self.tasks.iter().map(|task| task.duplicate(id)).collect(),
        }
    }
}
