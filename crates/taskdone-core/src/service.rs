use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::category::Category;
use crate::datastore::DataStore;
use crate::error::Result;
use crate::policy::Policy;
use crate::task::{Bucket, Task};

/// Mutation and query surface the presentation layer talks to. Holds
/// the store handle it was constructed with; every read reloads from
/// the store, so derived views always reflect the latest mutation.
///
/// Invalid input on optional UI paths (adding with an empty name or
/// title) is a logged no-op; unknown ids surface `Error::NotFound` and
/// the caller decides whether to ignore or report them.
#[derive(Debug)]
pub struct TaskService {
    store: DataStore,
    policy: Policy,
}

impl TaskService {
    pub fn new(store: DataStore, policy: Policy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Read model for rendering: visible categories with their tasks
    /// sorted by creation date ascending.
    #[tracing::instrument(skip(self))]
    pub fn visible_categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.store.list_visible_categories()?;
        for category in &mut categories {
            category.sort_tasks_by_creation();
        }
        Ok(categories)
    }

    #[tracing::instrument(skip(self, name, color))]
    pub fn add_category(&self, name: &str, color: &str) -> Result<Option<Category>> {
        if name.trim().is_empty() {
            warn!("ignoring add of category with empty name");
            return Ok(None);
        }
        Ok(Some(self.store.create_category(name, color)?))
    }

    #[tracing::instrument(skip(self), fields(category = %id))]
    pub fn hide_category(&self, id: Uuid) -> Result<()> {
        self.store.set_category_hidden(id, true)
    }

    #[tracing::instrument(skip(self), fields(category = %id))]
    pub fn duplicate_category(&self, id: Uuid) -> Result<Category> {
        self.store.duplicate_category(id, &self.policy.copy_suffix)
    }

    #[tracing::instrument(skip(self, title), fields(category = %category_id))]
    pub fn add_task(
        &self,
        category_id: Uuid,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Task>> {
        if title.trim().is_empty() {
            warn!(category = %category_id, "ignoring add of task with empty title");
            return Ok(None);
        }
        Ok(Some(self.store.create_task(category_id, title, now)?))
    }

    /// Empty titles are rejected with a validation error rather than
    /// routed to deletion; the caller that wants deletion calls
    /// `remove_task` explicitly.
    #[tracing::instrument(skip(self, new_title), fields(task = %task_id))]
    pub fn rename_task(&self, task_id: Uuid, new_title: &str) -> Result<()> {
        self.store.update_task_title(task_id, new_title)
    }

    #[tracing::instrument(skip(self), fields(task = %task_id))]
    pub fn toggle_task(&self, task_id: Uuid) -> Result<bool> {
        self.store.toggle_task_completion(task_id)
    }

    #[tracing::instrument(skip(self), fields(task = %task_id, category = %category_id))]
    pub fn remove_task(&self, task_id: Uuid, category_id: Uuid) -> Result<()> {
        self.store.remove_task(task_id, category_id)
    }

    #[tracing::instrument(skip(self, new_name, new_color, new_tasks), fields(category = %category_id))]
    pub fn save_category_edits(
        &self,
        category_id: Uuid,
        new_name: &str,
        new_color: &str,
        new_tasks: Vec<Task>,
    ) -> Result<()> {
        self.store
            .save_category_edits(category_id, new_name, new_color, new_tasks)
    }

    #[tracing::instrument(skip(self))]
    pub fn tasks_in_bucket(&self, bucket: Bucket, now: DateTime<Utc>) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .store
            .list_visible_categories()?
            .into_iter()
            .flat_map(|category| category.tasks)
            .filter(|task| task.bucket(self.policy.active_window, now) == bucket)
            .collect();
        tasks.sort_by_key(|task| task.creation_date);
        Ok(tasks)
    }

    pub fn upcoming_tasks(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        self.tasks_in_bucket(Bucket::Upcoming, now)
    }

    pub fn overdue_tasks(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        self.tasks_in_bucket(Bucket::Overdue, now)
    }

    pub fn completed_tasks(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        self.tasks_in_bucket(Bucket::Completed, now)
    }

    /// Startup/foreground sweep: delete completed tasks older than the
    /// retention period. Safe to run repeatedly.
    #[tracing::instrument(skip(self))]
    pub fn clean_old_tasks(&self, now: DateTime<Utc>) -> Result<usize> {
        let cutoff = now - self.policy.retention;
        let removed = self.store.purge_completed_older_than(cutoff)?;
        if removed > 0 {
            info!(removed, "cleanup sweep removed stale completed tasks");
        }
        Ok(removed)
    }
}
