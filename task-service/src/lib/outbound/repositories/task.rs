use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::task::errors::TaskError;
use crate::domain::task::models::DayWindow;
use crate::domain::task::models::NewTask;
use crate::domain::task::models::Task;
use crate::domain::task::models::TaskChanges;
use crate::domain::task::models::TaskDescription;
use crate::domain::task::models::TaskId;
use crate::domain::task::ports::TaskRepository;
use crate::domain::user::models::UserId;

pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    description: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: TaskId(row.id),
            owner: UserId(row.user_id),
            description: TaskDescription::new(row.description)?,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> TaskError {
    TaskError::DatabaseError(e.to_string())
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task, TaskError> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (user_id, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, user_id, description, status, created_at, updated_at
            "#,
        )
        .bind(task.owner.as_i64())
        .bind(task.description.as_str())
        .bind(task.status.as_str())
        .bind(task.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?
        .try_into()
    }

    async fn find_by_owner_and_date(
        &self,
        owner: &UserId,
        window: &DayWindow,
    ) -> Result<Vec<Task>, TaskError> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, user_id, description, status, created_at, updated_at
            FROM tasks
            WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at, id
            "#,
        )
        .bind(owner.as_i64())
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?
        .into_iter()
        .map(Task::try_from)
        .collect()
    }

    async fn find_by_id_and_owner(
        &self,
        id: &TaskId,
        owner: &UserId,
    ) -> Result<Option<Task>, TaskError> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, user_id, description, status, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(Task::try_from)
        .transpose()
    }

    async fn update(
        &self,
        id: &TaskId,
        owner: &UserId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>, TaskError> {
        sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
            SET description = COALESCE($3, description),
                status = COALESCE($4, status),
                updated_at = $5
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, description, status, created_at, updated_at
            "#,
        )
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .bind(changes.description.as_ref().map(|d| d.as_str()))
        .bind(changes.status.map(|s| s.as_str()))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(Task::try_from)
        .transpose()
    }

    async fn delete(&self, id: &TaskId, owner: &UserId) -> Result<bool, TaskError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }
}
