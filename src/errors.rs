use crate::backend::BackendError;
use crate::driver::DriverError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerErrorKind {
    /// Operation requires an active session but the record is inactive.
    Inactive,
    /// The fixed-size session pool has no free record.
    PoolExhausted,
    /// The camera driver reported a failure.
    Driver,
    /// The presentation backend reported a failure.
    Backend,
    InvalidArgument,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerError {
    pub kind: ViewerErrorKind,
    pub message: String,
}

impl ViewerError {
    pub fn inactive() -> Self {
        Self {
            kind: ViewerErrorKind::Inactive,
            message: "session is not active".to_string(),
        }
    }

    pub fn pool_exhausted() -> Self {
        Self {
            kind: ViewerErrorKind::PoolExhausted,
            message: "session pool is exhausted".to_string(),
        }
    }

    pub fn driver(error: DriverError) -> Self {
        Self {
            kind: ViewerErrorKind::Driver,
            message: error.to_string(),
        }
    }

    pub fn backend(error: BackendError) -> Self {
        Self {
            kind: ViewerErrorKind::Backend,
            message: error.to_string(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            kind: ViewerErrorKind::InvalidArgument,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ViewerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ViewerError {}

impl From<DriverError> for ViewerError {
    fn from(error: DriverError) -> Self {
        Self::driver(error)
    }
}

impl From<BackendError> for ViewerError {
    fn from(error: BackendError) -> Self {
        Self::backend(error)
    }
}
