use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use crate::domain::identity::models::AuthenticatedUser;
use crate::domain::task::errors::TaskError;
use crate::domain::task::models::TaskId;
use crate::domain::task::ports::TaskServicePort;
use crate::inbound::http::router::AppState;

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let task_id = TaskId::from_string(&task_id).map_err(TaskError::from)?;

    state.task_service.delete_task(&caller, &task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
