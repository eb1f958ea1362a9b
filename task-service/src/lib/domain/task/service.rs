use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
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
use crate::domain::task::models::TaskStatus;
use crate::domain::task::ports::TaskRepository;
use crate::domain::task::ports::TaskServicePort;

/// Domain service implementation for owner-scoped task operations.
pub struct TaskService<TR>
where
    TR: TaskRepository,
{
    repository: Arc<TR>,
}

impl<TR> TaskService<TR>
where
    TR: TaskRepository,
{
    /// Create a new task service.
    ///
    /// # Arguments
    /// * `repository` - Task persistence implementation
    pub fn new(repository: Arc<TR>) -> Self {
        Self { repository }
    }
}

fn not_found(id: &TaskId) -> TaskError {
    TaskError::NotFound(id.to_string())
}

#[async_trait]
impl<TR> TaskServicePort for TaskService<TR>
where
    TR: TaskRepository,
{
    async fn create_task(
        &self,
        caller: &AuthenticatedUser,
        command: CreateTaskCommand,
    ) -> Result<Task, TaskError> {
        let task = NewTask {
            owner: caller.id(),
            description: command.description,
            status: TaskStatus::default(),
            created_at: Utc::now(),
        };

        let created = self.repository.create(task).await?;

        tracing::info!(task_id = %created.id, owner = %created.owner, "Task created");

        Ok(created)
    }

    async fn list_tasks(
        &self,
        caller: &AuthenticatedUser,
        date: Option<NaiveDate>,
    ) -> Result<(DayWindow, Vec<Task>), TaskError> {
        let window = DayWindow::local(date.unwrap_or_else(|| Local::now().date_naive()))?;

        let tasks = self
            .repository
            .find_by_owner_and_date(&caller.id(), &window)
            .await?;

        Ok((window, tasks))
    }

    async fn get_task(&self, caller: &AuthenticatedUser, id: &TaskId) -> Result<Task, TaskError> {
        self.repository
            .find_by_id_and_owner(id, &caller.id())
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn update_task(
        &self,
        caller: &AuthenticatedUser,
        id: &TaskId,
        changes: TaskChanges,
    ) -> Result<Task, TaskError> {
        if changes.is_empty() {
            return self.get_task(caller, id).await;
        }

        let updated = self
            .repository
            .update(id, &caller.id(), &changes, Utc::now())
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!(task_id = %updated.id, status = %updated.status, "Task updated");

        Ok(updated)
    }

    async fn delete_task(&self, caller: &AuthenticatedUser, id: &TaskId) -> Result<(), TaskError> {
        if !self.repository.delete(id, &caller.id()).await? {
            return Err(not_found(id));
        }

        tracing::info!(task_id = %id, "Task deleted");

        Ok(())
    }
}
