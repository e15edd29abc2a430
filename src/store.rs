//! Entity store: authoritative CRUD over tasks and categories.
//!
//! The store owns two independent in-memory collections keyed by id and
//! kept in insertion order. It is a single-writer component: no internal
//! locking, intended to be driven from one logical thread of control.
//!
//! Operations are async because the store models an asynchronous backing
//! store. The delay is injectable via [`Latency`]; the default is no
//! delay, so tests and normal CLI runs observe effects immediately and
//! in call order.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::category::{Category, CategoryDraft, CategoryPatch};
use crate::error::{Error, Result};
use crate::task::{Task, TaskDraft, TaskPatch};

/// Simulated backing-store latency applied before each operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Latency {
    /// No delay. Default; what tests should use.
    #[default]
    None,
    /// Random delay uniformly drawn from `min_ms..=max_ms`.
    Uniform { min_ms: u64, max_ms: u64 },
}

impl Latency {
    async fn wait(self) {
        match self {
            Latency::None => {}
            Latency::Uniform { min_ms, max_ms } => {
                let (lo, hi) = if min_ms <= max_ms {
                    (min_ms, max_ms)
                } else {
                    (max_ms, min_ms)
                };
                let ms = rand::rng().random_range(lo..=hi);
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
        }
    }
}

/// Authoritative store for task and category records.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    latency: Latency,
}

fn next_id<T>(records: &[T], id_of: impl Fn(&T) -> u32) -> u32 {
    records.iter().map(id_of).max().unwrap_or(0) + 1
}

impl EntityStore {
    /// Create an empty store with no simulated latency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from previously persisted records.
    pub fn from_records(tasks: Vec<Task>, categories: Vec<Category>) -> Self {
        Self {
            tasks,
            categories,
            latency: Latency::None,
        }
    }

    /// Replace the latency setting (builder style).
    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    // =========================================================================
    // Task CRUD
    // =========================================================================

    /// All tasks, cloned, in insertion order.
    pub async fn all_tasks(&self) -> Vec<Task> {
        self.latency.wait().await;
        self.tasks.clone()
    }

    /// A single task by id.
    pub async fn task(&self, id: u32) -> Result<Task> {
        self.latency.wait().await;
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    }

    /// Create a task. Requires a non-empty title and category; assigns
    /// `id = max(existing) + 1`, forces `completed = false`, and stamps
    /// `created_at` with the current time.
    pub async fn create_task(&mut self, draft: TaskDraft) -> Result<Task> {
        self.latency.wait().await;

        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("task title is required".into()));
        }
        let category = draft.category.trim().to_string();
        if category.is_empty() {
            return Err(Error::Validation("task category is required".into()));
        }

        let task = Task {
            id: next_id(&self.tasks, |t| t.id),
            title,
            description: draft.description.unwrap_or_default(),
            completed: false,
            priority: draft.priority.unwrap_or_default(),
            category,
            due_date: draft.due_date,
            created_at: Utc::now(),
            completed_at: None,
        };
        debug!(id = task.id, title = %task.title, "task created");
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Merge a partial update over an existing task.
    ///
    /// Fields absent from the patch are retained. `completed_at` is
    /// re-derived here, never taken from the caller: a false→true
    /// transition stamps it, true→false clears it, and an update that
    /// leaves `completed` true (or untouched) keeps the old timestamp.
    pub async fn update_task(&mut self, id: u32, patch: TaskPatch) -> Result<Task> {
        self.latency.wait().await;

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))?;

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(Error::Validation("task title is required".into()));
            }
        }
        if let Some(category) = &patch.category {
            if category.trim().is_empty() {
                return Err(Error::Validation("task category is required".into()));
            }
        }

        if let Some(completed) = patch.completed {
            match (task.completed, completed) {
                (false, true) => task.completed_at = Some(Utc::now()),
                (true, false) => task.completed_at = None,
                _ => {}
            }
            task.completed = completed;
        }
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(category) = patch.category {
            task.category = category.trim().to_string();
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }

        debug!(id, completed = task.completed, "task updated");
        Ok(task.clone())
    }

    /// Remove a task. Hard removal, no tombstone.
    pub async fn delete_task(&mut self, id: u32) -> Result<()> {
        self.latency.wait().await;
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        self.tasks.remove(index);
        debug!(id, "task deleted");
        Ok(())
    }

    // =========================================================================
    // Category CRUD
    // =========================================================================

    /// All categories, cloned, in insertion order.
    pub async fn all_categories(&self) -> Vec<Category> {
        self.latency.wait().await;
        self.categories.clone()
    }

    /// A single category by id.
    pub async fn category(&self, id: u32) -> Result<Category> {
        self.latency.wait().await;
        self.categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(Error::CategoryNotFound(id))
    }

    /// Create a category. Requires a non-empty name, unique by
    /// case-insensitive comparison.
    pub async fn create_category(&mut self, draft: CategoryDraft) -> Result<Category> {
        self.latency.wait().await;

        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("category name is required".into()));
        }
        if self
            .categories
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(&name))
        {
            return Err(Error::Validation(format!(
                "category '{name}' already exists"
            )));
        }

        let category = Category {
            id: next_id(&self.categories, |c| c.id),
            name,
            color: draft.color.unwrap_or_default(),
            task_count: 0,
        };
        debug!(id = category.id, name = %category.name, "category created");
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Merge a partial update over an existing category. An unknown id
    /// fails `CategoryNotFound` before any patch validation runs.
    pub async fn update_category(&mut self, id: u32, patch: CategoryPatch) -> Result<Category> {
        self.latency.wait().await;

        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::CategoryNotFound(id))?;

        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::Validation("category name is required".into()));
            }
            if self
                .categories
                .iter()
                .any(|c| c.id != id && c.name.eq_ignore_ascii_case(name))
            {
                return Err(Error::Validation(format!(
                    "category '{name}' already exists"
                )));
            }
        }

        let category = &mut self.categories[index];

        if let Some(name) = patch.name {
            category.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
        debug!(id, name = %category.name, "category updated");
        Ok(category.clone())
    }

    /// Remove a category. Tasks that referenced it keep their category
    /// string; the join is by name and dangling names are tolerated.
    pub async fn delete_category(&mut self, id: u32) -> Result<()> {
        self.latency.wait().await;
        let index = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::CategoryNotFound(id))?;
        self.categories.remove(index);
        debug!(id, "category deleted");
        Ok(())
    }

    /// Push a freshly computed task count onto a category, matched by
    /// name case-insensitively. Pure display-cache write: returns
    /// `Ok(None)` when no category has that name, never an error.
    pub async fn set_task_count(&mut self, name: &str, count: u32) -> Option<Category> {
        self.latency.wait().await;
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))?;
        category.task_count = count;
        Some(category.clone())
    }

    /// Take the records back out, consuming the store (for persistence).
    pub fn into_records(self) -> (Vec<Task>, Vec<Category>) {
        (self.tasks, self.categories)
    }
}
