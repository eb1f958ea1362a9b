use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::domain::identity::models::AuthenticatedUser;
use crate::domain::task::errors::TaskError;
use crate::domain::task::models::TaskChanges;
use crate::domain::task::models::TaskDescription;
use crate::domain::task::models::TaskId;
use crate::domain::task::models::TaskStatus;
use crate::domain::task::ports::TaskServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::TaskData;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating a task (raw JSON)
///
/// Absent and empty fields are both left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub description: Option<String>,
    pub status: Option<String>,
}

impl UpdateTaskRequest {
    fn try_into_changes(self) -> Result<TaskChanges, TaskError> {
        // Validation happens here - errors are automatically converted via #[from]
        let description = self
            .description
            .filter(|d| !d.is_empty())
            .map(TaskDescription::new)
            .transpose()?;

        let status = self
            .status
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<TaskStatus>())
            .transpose()?;

        Ok(TaskChanges {
            description,
            status,
        })
    }
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<ApiSuccess<TaskData>, ApiError> {
    // Parse task ID and request at HTTP boundary - errors automatically converted
    let task_id = TaskId::from_string(&id).map_err(TaskError::from)?;
    let changes = req.try_into_changes()?;

    state
        .task_service
        .update_task(&caller, &task_id, changes)
        .await
        .map_err(ApiError::from)
        .map(|ref task| ApiSuccess::new(StatusCode::OK, task.into()))
}
