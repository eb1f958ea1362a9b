use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::TaskData;
use crate::domain::identity::models::AuthenticatedUser;
use crate::domain::task::ports::TaskServicePort;
use crate::inbound::http::router::AppState;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Query(query): Query<ListTasksQuery>,
) -> Result<ApiSuccess<ListTasksResponseData>, ApiError> {
    let date = query.date()?;

    let (window, tasks) = state.task_service.list_tasks(&caller, date).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ListTasksResponseData {
            date: window.date,
            tasks: tasks.iter().map(TaskData::from).collect(),
        },
    ))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTasksQuery {
    date: Option<String>,
}

impl ListTasksQuery {
    /// Requested day. Absent or empty means today.
    fn date(&self) -> Result<Option<NaiveDate>, ApiError> {
        match self.date.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(Some)
                .map_err(|e| {
                    ApiError::BadRequest(format!(
                        "Invalid date '{}', expected YYYY-MM-DD: {}",
                        raw, e
                    ))
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListTasksResponseData {
    pub date: NaiveDate,
    pub tasks: Vec<TaskData>,
}
