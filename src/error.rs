use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Result type for Requesty operations
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of body staged on a draft request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// A JSON object assembled from `Json` options
    Json,
    /// A JSON array assembled from `JsonArray` options
    JsonArray,
    /// An urlencoded form assembled from `Form` options
    Form,
    /// File parts, sent as `multipart/form-data`
    Multipart,
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyKind::Json => "json",
            BodyKind::JsonArray => "json array",
            BodyKind::Form => "form",
            BodyKind::Multipart => "multipart",
        };
        f.write_str(name)
    }
}

/// Main error type for Requesty
#[derive(Error, Debug)]
pub enum Error {
    /// The verb is not one of GET, POST, PUT, DELETE, OPTIONS, PATCH, HEAD
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// Two body kinds that cannot share a request were staged
    #[error("Invalid body type: cannot add a {requested} body to a request with a {staged} body")]
    InvalidBodyType { staged: BodyKind, requested: BodyKind },

    /// A JSON body could not be built or serialized
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// A form body could not be built or encoded
    #[error("Invalid form body: {0}")]
    InvalidForm(String),

    /// A file part is incomplete, unreadable or could not be written
    #[error("Invalid file (field: {field:?}, name: {file_name:?}): {source}")]
    InvalidFile {
        field: String,
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    /// No transcoder is registered under the requested label
    #[error("Unrecognized encoding: {0}")]
    UnrecognizedEncoding(String),

    /// The deadline fired before the transport completed
    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Network-related errors, passed through from the transport
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing errors
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The response body is not valid JSON for the requested type
    #[error("Response decoding error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Compressing the request body failed
    #[error("Compression error: {0}")]
    Compression(#[source] std::io::Error),

    /// File system errors while saving a response
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid request configuration
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Non-success status reported by `Response::error_for_status`
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Create a new timeout error
    pub fn timeout(duration: Duration) -> Self {
        Error::Timeout { duration }
    }

    /// Create a new invalid body type error
    pub fn invalid_body_type(staged: BodyKind, requested: BodyKind) -> Self {
        Error::InvalidBodyType { staged, requested }
    }

    /// Create a new invalid JSON error from a message
    pub fn invalid_json(message: impl fmt::Display) -> Self {
        Error::InvalidJson(<serde_json::Error as serde::ser::Error>::custom(message))
    }

    /// Create a new invalid form error
    pub fn invalid_form(message: impl Into<String>) -> Self {
        Error::InvalidForm(message.into())
    }

    /// Create a new invalid file error
    pub fn invalid_file(
        field: impl Into<String>,
        file_name: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::InvalidFile {
            field: field.into(),
            file_name: file_name.into(),
            source,
        }
    }

    /// Create a new invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    /// Create a new custom error
    pub fn custom(message: impl Into<String>) -> Self {
        Error::Custom(message.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }

    /// Check if this error was raised before any network I/O
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidMethod(_)
                | Error::InvalidBodyType { .. }
                | Error::InvalidJson(_)
                | Error::InvalidForm(_)
                | Error::InvalidFile { .. }
                | Error::Url(_)
                | Error::Compression(_)
                | Error::InvalidRequest(_)
        )
    }

    /// Get the underlying reqwest error if this is a network error
    pub fn as_network_error(&self) -> Option<&reqwest::Error> {
        match self {
            Error::Network(e) => Some(e),
            _ => None,
        }
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Error::InvalidRequest(format!("Invalid header name: {}", err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Error::InvalidRequest(format!("Invalid header value: {}", err))
    }
}

/// HTTP status code error
#[derive(Error, Debug)]
pub enum StatusError {
    /// Client error (4xx status codes)
    #[error("Client error: {status}")]
    Client { status: http::StatusCode },

    /// Server error (5xx status codes)
    #[error("Server error: {status}")]
    Server { status: http::StatusCode },
}

impl StatusError {
    /// Get the status code
    pub fn status(&self) -> http::StatusCode {
        match self {
            StatusError::Client { status } => *status,
            StatusError::Server { status } => *status,
        }
    }

    /// Check if this is a client error
    pub fn is_client_error(&self) -> bool {
        matches!(self, StatusError::Client { .. })
    }

    /// Check if this is a server error
    pub fn is_server_error(&self) -> bool {
        matches!(self, StatusError::Server { .. })
    }
}
