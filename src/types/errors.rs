use std::fmt;

// === ApiError ===

/// Errors returned by calls against the bookmark server.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-2xx status; the body is the message.
    Http { status: u16, message: String },
    /// The request never produced a response.
    Network(String),
    /// The response body could not be decoded.
    Decode(String),
    /// The request URL could not be built.
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status code, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Decode(msg) => write!(f, "Invalid response: {}", msg),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid request URL: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

// === ValidationError ===

/// Input rejected locally, before any server call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The bookmark URL is empty.
    EmptyUrl,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyUrl => write!(f, "URL must not be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

// === ViewError ===

/// Errors of a user action on the bookmark list view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewError {
    Api(ApiError),
    Validation(ValidationError),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::Api(err) => write!(f, "{}", err),
            ViewError::Validation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Api(err) => Some(err),
            ViewError::Validation(err) => Some(err),
        }
    }
}

impl From<ApiError> for ViewError {
    fn from(err: ApiError) -> Self {
        ViewError::Api(err)
    }
}

impl From<ValidationError> for ViewError {
    fn from(err: ValidationError) -> Self {
        ViewError::Validation(err)
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}
