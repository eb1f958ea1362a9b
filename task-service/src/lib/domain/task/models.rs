use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::TimeZone;
use chrono::Utc;

use crate::domain::task::errors::TaskDescriptionError;
use crate::domain::task::errors::TaskError;
use crate::domain::task::errors::TaskIdError;
use crate::domain::task::errors::TaskStatusError;
use crate::domain::user::models::UserId;

/// Task entity. Always belongs to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub owner: UserId,
    pub description: TaskDescription,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task unique identifier type (database assigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Parse a task ID from a path segment.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a positive integer
    pub fn from_string(s: &str) -> Result<Self, TaskIdError> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(TaskId(id)),
            Ok(id) => Err(TaskIdError::InvalidFormat(format!(
                "identifier must be positive, got {}",
                id
            ))),
            Err(e) => Err(TaskIdError::InvalidFormat(e.to_string())),
        }
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-text task description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescription(String);

impl TaskDescription {
    const MAX_LENGTH: usize = 1000;

    /// Create a validated description.
    ///
    /// # Errors
    /// * `Blank` - Empty or whitespace only
    /// * `TooLong` - More than 1000 characters
    pub fn new(description: String) -> Result<Self, TaskDescriptionError> {
        if description.trim().is_empty() {
            return Err(TaskDescriptionError::Blank);
        }

        let length = description.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(TaskDescriptionError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        Ok(Self(description))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Task lifecycle status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = TaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            other => Err(TaskStatusError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task ready to be persisted, owner already stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub owner: UserId,
    pub description: TaskDescription,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// Command to create a task. Carries no owner: the owner is always the
/// caller's resolved identity.
#[derive(Debug, Clone)]
pub struct CreateTaskCommand {
    pub description: TaskDescription,
}

impl CreateTaskCommand {
    pub fn new(description: TaskDescription) -> Self {
        Self { description }
    }
}

/// Partial update of a task. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub description: Option<TaskDescription>,
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.status.is_none()
    }
}

/// A calendar day in the service's local time zone, as a half-open UTC range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Build the window `[local midnight of date, local midnight of next day)`.
    ///
    /// # Arguments
    /// * `date` - Calendar day in local time
    ///
    /// # Returns
    /// Day window with UTC bounds
    ///
    /// # Errors
    /// * `InvalidDate` - Date is at the end of the representable range
    pub fn local(date: NaiveDate) -> Result<Self, TaskError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| TaskError::InvalidDate(format!("{} has no following day", date)))?;

        Ok(Self {
            date,
            start: local_day_start(date)?,
            end: local_day_start(next)?,
        })
    }

    /// Check whether an instant falls inside the window.
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

fn local_day_start(date: NaiveDate) -> Result<DateTime<Utc>, TaskError> {
    // Midnight can be skipped by a DST transition; the day then starts at
    // the first hour that exists.
    (0..3)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| Local.from_local_datetime(&date.and_time(time)).earliest())
        .map(|start| start.with_timezone(&Utc))
        .ok_or_else(|| TaskError::InvalidDate(format!("{} has no local start of day", date)))
}
