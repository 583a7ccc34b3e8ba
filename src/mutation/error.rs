use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationErrorCode {
    AlreadySubmitting,
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    Network,
    Internal,
}

impl MutationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationErrorCode::AlreadySubmitting => "mutation/already-submitting",
            MutationErrorCode::InvalidArgument => "mutation/invalid-argument",
            MutationErrorCode::Unauthenticated => "mutation/unauthenticated",
            MutationErrorCode::PermissionDenied => "mutation/permission-denied",
            MutationErrorCode::Network => "mutation/network",
            MutationErrorCode::Internal => "mutation/internal",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationError {
    pub code: MutationErrorCode,
    message: String,
    http_status: Option<u16>,
}

impl MutationError {
    pub fn new(code: MutationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of the rejected round trip, if the transport saw a response.
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    /// True when the server refused the operation for the current user.
    pub fn is_permission_denied(&self) -> bool {
        self.http_status == Some(403)
    }
}

impl Display for MutationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for MutationError {}

pub type MutationResult<T> = Result<T, MutationError>;

pub fn already_submitting() -> MutationError {
    MutationError::new(
        MutationErrorCode::AlreadySubmitting,
        "a mutation is already in flight on this runner",
    )
}

pub fn invalid_argument(message: impl Into<String>) -> MutationError {
    MutationError::new(MutationErrorCode::InvalidArgument, message)
}

pub fn unauthenticated(message: impl Into<String>) -> MutationError {
    MutationError::new(MutationErrorCode::Unauthenticated, message).with_status(401)
}

pub fn permission_denied(message: impl Into<String>) -> MutationError {
    MutationError::new(MutationErrorCode::PermissionDenied, message).with_status(403)
}

pub fn network_error(message: impl Into<String>) -> MutationError {
    MutationError::new(MutationErrorCode::Network, message)
}

pub fn internal_error(message: impl Into<String>) -> MutationError {
    MutationError::new(MutationErrorCode::Internal, message)
}
