use thiserror::Error;

/// Error for TaskId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskIdError {
    #[error("Invalid task ID format: {0}")]
    InvalidFormat(String),
}

/// Error for TaskDescription validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDescriptionError {
    #[error("Description must not be blank")]
    Blank,

    #[error("Description too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for TaskStatus parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskStatusError {
    #[error("Unknown status '{0}' (expected 'pending' or 'done')")]
    Unknown(String),
}

/// Top-level error for all task operations
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    #[error("Invalid task ID: {0}")]
    InvalidTaskId(#[from] TaskIdError),

    #[error("Invalid description: {0}")]
    InvalidDescription(#[from] TaskDescriptionError),

    #[error("Invalid status: {0}")]
    InvalidStatus(#[from] TaskStatusError),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Covers tasks owned by someone else as well as absent ones.
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
