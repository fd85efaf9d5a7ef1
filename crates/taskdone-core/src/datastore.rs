use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::category::Category;
use crate::error::{Error, Result};
use crate::task::Task;

/// Durable storage for the category graph. Each category is one JSONL
/// line with its owned tasks embedded, so every logical mutation is a
/// single load-mutate-save unit and a failed save leaves the previous
/// file contents in place (the replace is atomic).
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub categories_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let categories_path = data_dir.join("categories.data");
        if !categories_path.exists() {
            fs::write(&categories_path, "")
                .with_context(|| format!("failed to create {}", categories_path.display()))?;
        }

        info!(
            data_dir = %data_dir.display(),
            categories = %categories_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            categories_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_categories(&self) -> Result<Vec<Category>> {
        Ok(load_jsonl(&self.categories_path).context("failed to load categories.data")?)
    }

    #[tracing::instrument(skip(self, categories))]
    pub fn save_categories(&self, categories: &[Category]) -> Result<()> {
        Ok(save_jsonl_atomic(&self.categories_path, categories)
            .context("failed to save categories.data")?)
    }

    #[tracing::instrument(skip(self))]
    pub fn list_visible_categories(&self) -> Result<Vec<Category>> {
        let categories = self.load_categories()?;
        Ok(categories
            .into_iter()
            .filter(|category| !category.is_hidden)
            .collect())
    }

    #[tracing::instrument(skip(self, name, color))]
    pub fn create_category(&self, name: &str, color: &str) -> Result<Category> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("category name cannot be empty"));
        }

        let mut categories = self.load_categories()?;
        let category = Category::new(trimmed.to_string(), color.to_string());
        categories.push(category.clone());
        self.save_categories(&categories)?;

        info!(id = %category.id, name = %category.name, "created category");
        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    pub fn set_category_hidden(&self, id: Uuid, hidden: bool) -> Result<()> {
        let mut categories = self.load_categories()?;
        let category = categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| Error::not_found(format!("category {id}")))?;

        category.is_hidden = hidden;
        self.save_categories(&categories)?;

        debug!(id = %id, hidden, "updated category visibility");
        Ok(())
    }

    #[tracing::instrument(skip(self, copy_suffix), fields(id = %id))]
    pub fn duplicate_category(&self, id: Uuid, copy_suffix: &str) -> Result<Category> {
        let mut categories = self.load_categories()?;
        let source = categories
            .iter()
            .find(|category| category.id == id)
            .ok_or_else(|| Error::not_found(format!("category {id}")))?;

        let copy = source.duplicate(copy_suffix);
        categories.push(copy.clone());
        self.save_categories(&categories)?;

        info!(
            source = %id,
            copy = %copy.id,
            tasks = copy.tasks.len(),
            "duplicated category"
        );
        Ok(copy)
    }

    #[tracing::instrument(skip(self, title), fields(category = %category_id))]
    pub fn create_task(
        &self,
        category_id: Uuid,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("task title cannot be empty"));
        }

        let mut categories = self.load_categories()?;
        let category = categories
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or_else(|| Error::not_found(format!("category {category_id}")))?;

        let task = Task::new(trimmed.to_string(), category_id, now);
        category.tasks.push(task.clone());
        self.save_categories(&categories)?;

        info!(id = %task.id, category = %category_id, "created task");
        Ok(task)
    }

    #[tracing::instrument(skip(self, new_title), fields(task = %task_id))]
    pub fn update_task_title(&self, task_id: Uuid, new_title: &str) -> Result<()> {
        let trimmed = new_title.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("task title cannot be empty"));
        }

        let mut categories = self.load_categories()?;
        let task = categories
            .iter_mut()
            .find_map(|category| category.task_mut(task_id))
            .ok_or_else(|| Error::not_found(format!("task {task_id}")))?;

        task.title = trimmed.to_string();
        self.save_categories(&categories)
    }

    #[tracing::instrument(skip(self), fields(task = %task_id))]
    pub fn toggle_task_completion(&self, task_id: Uuid) -> Result<bool> {
        let mut categories = self.load_categories()?;
        let task = categories
            .iter_mut()
            .find_map(|category| category.task_mut(task_id))
            .ok_or_else(|| Error::not_found(format!("task {task_id}")))?;

        task.is_completed = !task.is_completed;
        let completed = task.is_completed;
        self.save_categories(&categories)?;

        debug!(task = %task_id, completed, "toggled task completion");
        Ok(completed)
    }

    #[tracing::instrument(skip(self), fields(task = %task_id, category = %category_id))]
    pub fn remove_task(&self, task_id: Uuid, category_id: Uuid) -> Result<()> {
        let mut categories = self.load_categories()?;
        let category = categories
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or_else(|| Error::not_found(format!("category {category_id}")))?;

        let idx = category
            .tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| {
                Error::not_found(format!("task {task_id} in category {category_id}"))
            })?;

        category.tasks.remove(idx);
        self.save_categories(&categories)?;

        info!(task = %task_id, category = %category_id, "removed task");
        Ok(())
    }

    /// Bulk commit of an edit session: replaces name, color, and the
    /// whole task collection in one save. Tasks adopted from another
    /// category are pulled out of it in the same unit so no task ever
    /// appears in two collections. A task whose title is empty after
    /// trimming fails the whole commit; nothing is written.
    #[tracing::instrument(skip(self, new_name, new_color, new_tasks), fields(category = %category_id))]
    pub fn save_category_edits(
        &self,
        category_id: Uuid,
        new_name: &str,
        new_color: &str,
        new_tasks: Vec<Task>,
    ) -> Result<()> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("category name cannot be empty"));
        }
        if new_tasks.iter().any(|task| task.title.trim().is_empty()) {
            return Err(Error::validation("task title cannot be empty"));
        }

        let mut categories = self.load_categories()?;
        if !categories.iter().any(|category| category.id == category_id) {
            return Err(Error::not_found(format!("category {category_id}")));
        }

        let adopted: Vec<Uuid> = new_tasks.iter().map(|task| task.id).collect();
        for other in categories.iter_mut() {
            if other.id != category_id {
                other.tasks.retain(|task| !adopted.contains(&task.id));
            }
        }

        if let Some(category) = categories
            .iter_mut()
            .find(|category| category.id == category_id)
        {
            category.name = trimmed.to_string();
            category.color = new_color.to_string();
            category.tasks = new_tasks
                .into_iter()
                .map(|mut task| {
                    task.category = category_id;
                    task
                })
                .collect();
        }

        self.save_categories(&categories)?;

        info!(category = %category_id, "saved category edits");
        Ok(())
    }

    /// Retention sweep: drops completed tasks created before `cutoff`.
    /// Pure deletion, idempotent, no ordering dependency between tasks.
    #[tracing::instrument(skip(self))]
    pub fn purge_completed_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut categories = self.load_categories()?;

        let before: usize = categories.iter().map(|category| category.tasks.len()).sum();
        for category in categories.iter_mut() {
            category
                .tasks
                .retain(|task| !(task.is_completed && task.creation_date < cutoff));
        }
        let after: usize = categories.iter().map(|category| category.tasks.len()).sum();

        let removed = before - after;
        if removed > 0 {
            self.save_categories(&categories)?;
        }

        info!(before, after, "purged stale completed tasks");
        Ok(removed)
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl(path: &Path) -> anyhow::Result<Vec<Category>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let category: Category = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(category);
    }

    debug!(count = out.len(), "loaded categories from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, categories))]
fn save_jsonl_atomic(path: &Path, categories: &[Category]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = categories.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for category in categories {
        let serialized = serde_json::to_string(category)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
