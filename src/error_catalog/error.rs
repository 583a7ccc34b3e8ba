use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogErrorCode {
    InvalidArgument,
    Fetch,
    Parse,
}

impl CatalogErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogErrorCode::InvalidArgument => "catalog/invalid-argument",
            CatalogErrorCode::Fetch => "catalog/fetch",
            CatalogErrorCode::Parse => "catalog/parse",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogError {
    pub code: CatalogErrorCode,
    message: String,
    http_status: Option<u16>,
}

impl CatalogError {
    pub fn new(code: CatalogErrorCode, message: impl Into<String>) -> Self {
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

    /// HTTP status reported by the asset server, when the fetch got that far.
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code_str())
    }
}

impl std::error::Error for CatalogError {}

pub type CatalogResult<T> = Result<T, CatalogError>;

pub fn invalid_argument(message: impl Into<String>) -> CatalogError {
    CatalogError::new(CatalogErrorCode::InvalidArgument, message)
}

pub fn fetch_error(message: impl Into<String>) -> CatalogError {
    CatalogError::new(CatalogErrorCode::Fetch, message)
}

pub fn parse_error(message: impl Into<String>) -> CatalogError {
    CatalogError::new(CatalogErrorCode::Parse, message)
}
