//! Error types for chat API clients.
//!
//! ```text
//! ChatBotError
//! ├── Client(ClientError)
//! │   ├── InvalidData
//! │   ├── LoginFailure
//! │   ├── ConnectionClosed
//! │   ├── InvalidUrl
//! │   └── Transport
//! ├── GatewayNotFound
//! ├── Http(HttpError)      Generic | Forbidden | NotFound | ServerError
//! └── RateLimited
//! ```
//!
//! Match on [`ChatBotError`] to catch everything, on a variant to catch a
//! category, or on [`HttpErrorKind`] for a specific status. Nothing here is
//! retried; [`RateLimited::retry_after`] is only advice for the caller.

use thiserror::Error;
use tracing::debug;

use crate::response::{HasCloseCode, HasStatus};
use crate::translate::{translate, ErrorMessage, TranslatedError, TranslationOutcome};

/// Result type for chat client operations.
pub type Result<T> = std::result::Result<T, ChatBotError>;

/// Root of every error this crate produces.
#[derive(Debug, Error)]
pub enum ChatBotError {
    /// The client could not complete the operation.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The chat gateway could not be reached.
    #[error("The gateway to connect to the chat API was not found")]
    GatewayNotFound,

    /// The API answered with a failure status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The request must wait before being sent again.
    #[error(transparent)]
    RateLimited(#[from] RateLimited),
}

/// Failures on the client side of the connection.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Unknown or invalid data received from the API.
    #[error("Invalid data: {0}")]
    InvalidData(TranslatedError),

    /// Credentials were rejected.
    #[error("Login failure: {0}")]
    LoginFailure(TranslatedError),

    /// The websocket closed and could not be recovered.
    #[error(transparent)]
    ConnectionClosed(#[from] ConnectionClosed),

    /// The endpoint is not an absolute http(s) URL.
    #[error("Invalid URL '{0}': {hint}", hint = url_hint(.0))]
    InvalidUrl(String),

    /// The request failed before any response arrived.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Which member of the HTTP family a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Generic,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 5xx
    ServerError,
}

impl HttpErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => HttpErrorKind::Forbidden,
            404 => HttpErrorKind::NotFound,
            500..=599 => HttpErrorKind::ServerError,
            _ => HttpErrorKind::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpErrorKind::Generic => "http",
            HttpErrorKind::Forbidden => "forbidden",
            HttpErrorKind::NotFound => "not found",
            HttpErrorKind::ServerError => "server error",
        }
    }
}

/// A failed HTTP request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct HttpError {
    kind: HttpErrorKind,
    error: TranslatedError,
}

impl HttpError {
    /// Wrap a translated failure, picking the kind from its status.
    pub fn new(error: TranslatedError) -> Self {
        Self {
            kind: HttpErrorKind::from_status(error.status()),
            error,
        }
    }

    pub fn kind(&self) -> HttpErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.error.status()
    }

    pub fn code(&self) -> i64 {
        self.error.code()
    }

    pub fn text(&self) -> &str {
        self.error.text()
    }

    pub fn translated(&self) -> &TranslatedError {
        &self.error
    }
}

/// Too many requests.
///
/// Also raised when a request is held back locally before it is sent, which
/// is why it carries no status and is not an [`HttpError`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Too many requests. Retry in {retry_after:.2}")]
pub struct RateLimited {
    /// Seconds to wait before retrying.
    pub retry_after: f64,
}

impl RateLimited {
    pub fn new(retry_after: f64) -> Self {
        Self { retry_after }
    }
}

/// The gateway websocket closed for a reason that was not handled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("WebSocket closed with {code}")]
pub struct ConnectionClosed {
    /// Close code, `-1` when the transport gave none.
    pub code: i32,
    /// Close reason. Transports often leave this empty.
    pub reason: String,
}

impl ConnectionClosed {
    pub const UNKNOWN_CODE: i32 = -1;

    pub fn new(code: Option<i32>) -> Self {
        Self {
            code: nonzero(code).unwrap_or(Self::UNKNOWN_CODE),
            reason: String::new(),
        }
    }

    /// An explicit `code` wins over the socket's own close code.
    pub fn from_socket<S>(socket: &S, code: Option<i32>) -> Self
    where
        S: HasCloseCode + ?Sized,
    {
        Self {
            code: nonzero(code)
                .or_else(|| nonzero(socket.close_code()))
                .unwrap_or(Self::UNKNOWN_CODE),
            reason: socket.close_reason().unwrap_or_default().to_string(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

impl Default for ConnectionClosed {
    fn default() -> Self {
        Self::new(None)
    }
}

fn url_hint(url: &str) -> String {
    if !url.is_empty() && !url.contains("://") && !url.contains(char::is_whitespace) {
        format!("Did you mean 'http://{}'?", url)
    } else {
        "expected an absolute http or https URL".to_string()
    }
}

fn nonzero(code: Option<i32>) -> Option<i32> {
    code.filter(|c| *c != 0)
}

impl From<reqwest::Error> for ChatBotError {
    fn from(e: reqwest::Error) -> Self {
        ChatBotError::Client(ClientError::Transport(e))
    }
}

impl From<ConnectionClosed> for ChatBotError {
    fn from(closed: ConnectionClosed) -> Self {
        ChatBotError::Client(ClientError::ConnectionClosed(closed))
    }
}

impl ChatBotError {
    /// Classify a failed response into the matching error.
    pub fn from_response<R>(response: &R, message: Option<&ErrorMessage>) -> Self
    where
        R: HasStatus + ?Sized,
    {
        let error = TranslationOutcome::from_response(response, message).into_error();
        debug!(
            status = response.status(),
            code = error.code().unwrap_or_default(),
            error = %error,
            "Translated chat API failure"
        );
        error
    }

    /// A response whose payload could not be understood.
    pub fn invalid_data<R>(response: &R, message: Option<&ErrorMessage>) -> Self
    where
        R: HasStatus + ?Sized,
    {
        ClientError::InvalidData(translate(response, message)).into()
    }

    /// A response rejecting the supplied credentials.
    pub fn login_failure<R>(response: &R, message: Option<&ErrorMessage>) -> Self
    where
        R: HasStatus + ?Sized,
    {
        ClientError::LoginFailure(translate(response, message)).into()
    }

    pub fn rate_limited(retry_after: f64) -> Self {
        RateLimited::new(retry_after).into()
    }

    pub fn connection_closed(code: Option<i32>) -> Self {
        ConnectionClosed::new(code).into()
    }

    /// The translated response behind this error, if it came from one.
    pub fn translated(&self) -> Option<&TranslatedError> {
        match self {
            ChatBotError::Http(e) => Some(e.translated()),
            ChatBotError::Client(ClientError::InvalidData(e))
            | ChatBotError::Client(ClientError::LoginFailure(e)) => Some(e),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.translated().map(TranslatedError::status)
    }

    pub fn code(&self) -> Option<i64> {
        self.translated().map(TranslatedError::code)
    }

    pub fn text(&self) -> Option<&str> {
        self.translated().map(TranslatedError::text)
    }

    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        match self {
            ChatBotError::Http(e) => Some(e.kind()),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<f64> {
        match self {
            ChatBotError::RateLimited(e) => Some(e.retry_after),
            _ => None,
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, ChatBotError::Client(_))
    }
}
