use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use crate::nextdate::{self, NextDateError};

pub mod api;
mod store;

pub use store::SeaOrmTaskStore;

/// Format accepted by the task search for date lookups, e.g. `26.01.2024`.
pub const SEARCH_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: u32,
    date: String,
    title: String,
    comment: String,
    repeat: String,
}

impl Task {
    pub fn new(id: u32, date: String, title: String, comment: String, repeat: String) -> Self {
        Self {
            id,
            date,
            title,
            comment,
            repeat,
        }
    }

    fn from_new_task(id: u32, task: NewTask) -> Self {
        Self::new(id, task.date, task.title, task.comment, task.repeat)
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the due date in `YYYYMMDD` form.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns the repeat rule, empty for one-off tasks.
    pub fn repeat(&self) -> &str {
        &self.repeat
    }

    pub fn is_recurring(&self) -> bool {
        !self.repeat.is_empty()
    }
}

/// A task as submitted for creation or update, before it has an ID.
#[derive(Debug, Default, PartialEq, Clone, Eq)]
pub struct NewTask {
    pub date: String,
    pub title: String,
    pub comment: String,
    pub repeat: String,
}

/// Error type for TaskStore operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    NotFound(u32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Persistence of tasks.
///
/// All dates crossing this boundary are `YYYYMMDD` strings. Listing and search
/// results are ordered by date and capped at `limit`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task and returns its assigned ID.
    async fn create(&self, task: NewTask) -> Result<u32, StoreError>;
    async fn get(&self, id: u32) -> Result<Task, StoreError>;
    /// Replaces every field of an existing task.
    async fn update(&self, task: Task) -> Result<(), StoreError>;
    async fn delete(&self, id: u32) -> Result<(), StoreError>;
    async fn update_date(&self, id: u32, date: &str) -> Result<(), StoreError>;
    async fn list(&self, limit: u64) -> Result<Vec<Task>, StoreError>;
    /// Finds tasks whose title or comment contains `text`.
    async fn search_by_text(&self, text: &str, limit: u64) -> Result<Vec<Task>, StoreError>;
    async fn search_by_date(&self, date: &str, limit: u64) -> Result<Vec<Task>, StoreError>;
}

/// Shared state of the task routes.
#[derive(Clone)]
pub struct TaskState {
    pub store: Arc<dyn TaskStore>,
    pub tasks_limit: u64,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a request that fails field validation.
    #[error("{0}")]
    Validation(String),
    /// Represents a malformed date or repeat rule.
    #[error(transparent)]
    Rule(#[from] NextDateError),
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    NotFound(u32),
    /// Represents a storage failure.
    #[error("Task store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for TaskServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => TaskServiceError::NotFound(id),
            other => TaskServiceError::Store(other),
        }
    }
}

/// Outcome of marking a task as done.
#[derive(Debug, PartialEq, Eq)]
pub enum Completion {
    /// The one-off task was removed.
    Deleted,
    /// The recurring task moved to the contained date.
    Rescheduled(String),
}

pub struct TaskService<'a> {
    store: &'a dyn TaskStore,
}

impl<'a> TaskService<'a> {
    pub fn new(store: &'a dyn TaskStore) -> TaskService<'a> {
        TaskService { store }
    }

    /// Creates a new task after settling its date.
    ///
    /// # Arguments
    ///
    /// * `now` - Today's date.
    /// * `task` - The submitted task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the ID of the created task, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn add_task(&self, now: NaiveDate, task: NewTask) -> Result<u32, TaskServiceError> {
        let task = prepare(now, task)?;
        let id = self.store.create(task).await?;
        tracing::info!("Created task {}", id);
        Ok(id)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, id: u32) -> Result<Task, TaskServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Replaces a task after re-settling its date.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stored `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        now: NaiveDate,
        id: u32,
        task: NewTask,
    ) -> Result<Task, TaskServiceError> {
        let task = Task::from_new_task(id, prepare(now, task)?);
        self.store.update(task.clone()).await?;
        tracing::info!("Updated task {}", id);
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: u32) -> Result<(), TaskServiceError> {
        self.store.delete(id).await?;
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    /// Marks a task as done.
    ///
    /// One-off tasks are deleted. Recurring tasks stay and move to their next
    /// date. Nothing is written when the stored rule or date is invalid.
    #[tracing::instrument(skip(self))]
    pub async fn complete_task(
        &self,
        now: NaiveDate,
        id: u32,
    ) -> Result<Completion, TaskServiceError> {
        let task = self.store.get(id).await?;
        if !task.is_recurring() {
            self.store.delete(id).await?;
            tracing::info!("Completed one-off task {}", id);
            return Ok(Completion::Deleted);
        }

        let next = nextdate::next_date(now, task.date(), task.repeat())?;
        self.store.update_date(id, &next).await?;
        tracing::info!("Rescheduled task {} from {} to {}", id, task.date(), next);
        Ok(Completion::Rescheduled(next))
    }

    /// Lists tasks, optionally filtered.
    ///
    /// A search that reads as `DD.MM.YYYY` selects tasks on that date; any other
    /// non-blank search matches title or comment text.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        search: Option<&str>,
        limit: u64,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let search = search.map(str::trim).unwrap_or_default();
        let tasks = if search.is_empty() {
            self.store.list(limit).await?
        } else if let Some(date) = parse_search_date(search) {
            let date = nextdate::format_date(date)?;
            self.store.search_by_date(&date, limit).await?
        } else {
            self.store.search_by_text(search, limit).await?
        };
        Ok(tasks)
    }
}

/// Reads a search as a `DD.MM.YYYY` date; day and month need both digits.
fn parse_search_date(search: &str) -> Option<NaiveDate> {
    let shape_matches = search.len() == 10
        && search.bytes().enumerate().all(|(index, byte)| match index {
            2 | 5 => byte == b'.',
            _ => byte.is_ascii_digit(),
        });
    if !shape_matches {
        return None;
    }
    NaiveDate::parse_from_str(search, SEARCH_DATE_FORMAT).ok()
}

/// Validates a submitted task and settles its date.
fn prepare(now: NaiveDate, mut task: NewTask) -> Result<NewTask, TaskServiceError> {
    if task.title.trim().is_empty() {
        return Err(TaskServiceError::Validation("title is required".to_string()));
    }
    task.repeat = task.repeat.trim().to_string();
    let date = nextdate::normalize_date(now, task.date.trim(), &task.repeat)?;
    if date != task.date {
        tracing::debug!("Settled task date {:?} to {}", task.date, date);
    }
    task.date = date;
    Ok(task)
}
