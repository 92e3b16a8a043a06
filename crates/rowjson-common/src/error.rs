use thiserror::Error;

/// Error type shared by every rowjson crate.
///
/// `InvalidArgument` is a caller mistake (bad row shape, bad key type,
/// non-convertible type). `Internal` is a defect or a sink failure and must
/// never be reported as a validation error.
#[derive(Error, Debug)]
pub enum RowJsonError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("binder error: {0}")]
    Binder(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RowJsonError {
    /// Whether the error was caused by caller input rather than a defect.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Wrap a failure of an output sink. Sinks are in-memory in the common
    /// case, so any failure there is treated as internal.
    pub fn sink(err: impl std::fmt::Display) -> Self {
        Self::Internal(format!("failed to write JSON output: {err}"))
    }
}

pub type RowJsonResult<T> = Result<T, RowJsonError>;
