use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use crate::domain::identity::models::AuthenticatedUser;
use crate::domain::task::errors::TaskError;
use crate::domain::task::models::CreateTaskCommand;
use crate::domain::task::models::DayWindow;
use crate::domain::task::models::NewTask;
use crate::domain::task::models::Task;
use crate::domain::task::models::TaskChanges;
use crate::domain::task::models::TaskId;
use crate::domain::user::models::UserId;

/// Port for task operations.
///
/// Every operation is scoped to the caller. A task owned by another user
/// is reported exactly like a task that does not exist.
#[async_trait]
pub trait TaskServicePort: Send + Sync + 'static {
    /// Create a task owned by the caller with status `pending`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create_task(
        &self,
        caller: &AuthenticatedUser,
        command: CreateTaskCommand,
    ) -> Result<Task, TaskError>;

    /// List the caller's tasks created on a local calendar day.
    ///
    /// # Arguments
    /// * `caller` - Resolved identity
    /// * `date` - Day to list, today in local time when `None`
    ///
    /// # Returns
    /// The day window that was queried and the matching tasks, oldest first
    ///
    /// # Errors
    /// * `InvalidDate` - Day cannot be turned into a time window
    /// * `DatabaseError` - Database operation failed
    async fn list_tasks(
        &self,
        caller: &AuthenticatedUser,
        date: Option<NaiveDate>,
    ) -> Result<(DayWindow, Vec<Task>), TaskError>;

    /// Retrieve one of the caller's tasks.
    ///
    /// # Errors
    /// * `NotFound` - No such task for this caller
    /// * `DatabaseError` - Database operation failed
    async fn get_task(&self, caller: &AuthenticatedUser, id: &TaskId) -> Result<Task, TaskError>;

    /// Apply a partial update to one of the caller's tasks.
    ///
    /// An empty change set leaves the task untouched and returns it.
    ///
    /// # Errors
    /// * `NotFound` - No such task for this caller
    /// * `DatabaseError` - Database operation failed
    async fn update_task(
        &self,
        caller: &AuthenticatedUser,
        id: &TaskId,
        changes: TaskChanges,
    ) -> Result<Task, TaskError>;

    /// Delete one of the caller's tasks.
    ///
    /// # Errors
    /// * `NotFound` - No such task for this caller
    /// * `DatabaseError` - Database operation failed
    async fn delete_task(&self, caller: &AuthenticatedUser, id: &TaskId) -> Result<(), TaskError>;
}

/// Persistence operations for tasks.
///
/// Every read and write that addresses an existing task takes the owner and
/// matches on `(id, owner)` in a single predicate.
#[async_trait]
pub trait TaskRepository: Send + Sync + 'static {
    /// Persist a new task.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, task: NewTask) -> Result<Task, TaskError>;

    /// Tasks of `owner` with `created_at` inside `window`, oldest first.
    async fn find_by_owner_and_date(
        &self,
        owner: &UserId,
        window: &DayWindow,
    ) -> Result<Vec<Task>, TaskError>;

    /// Task with `id` if and only if it belongs to `owner`.
    async fn find_by_id_and_owner(
        &self,
        id: &TaskId,
        owner: &UserId,
    ) -> Result<Option<Task>, TaskError>;

    /// Apply `changes` to the task with `id` owned by `owner`.
    ///
    /// # Arguments
    /// * `id` - Task identifier
    /// * `owner` - Required owner
    /// * `changes` - Fields to overwrite
    /// * `updated_at` - New modification timestamp
    ///
    /// # Returns
    /// The updated task, `None` if no task matched
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update(
        &self,
        id: &TaskId,
        owner: &UserId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskError>;

    /// Delete the task with `id` owned by `owner`.
    ///
    /// # Returns
    /// Whether a task was deleted
    async fn delete(&self, id: &TaskId, owner: &UserId) -> Result<bool, TaskError>;
}
