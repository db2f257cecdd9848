//! Typed errors for chat-completion HTTP clients.
//!
//! Turns failed responses, JSON error bodies and closed sockets into a small
//! error hierarchy callers can match on. It classifies and formats only;
//! retries are up to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use chatbot_errors::{ChatBotError, HttpErrorKind, RawResponse};
//!
//! let raw = RawResponse::read(response).await;
//! match ChatBotError::from_response(&raw, raw.message().as_ref()) {
//!     ChatBotError::RateLimited(limit) => {
//!         sleep(Duration::from_secs_f64(limit.retry_after)).await
//!     }
//!     err if err.http_kind() == Some(HttpErrorKind::Forbidden) => return Err(err),
//!     err => tracing::warn!(status = ?err.status(), "{}", err),
//! }
//! ```
//!
//! # Field errors
//!
//! Structured bodies with a nested `errors` tree are flattened into one line
//! per field:
//!
//! ```rust,ignore
//! let body = json!({
//!     "code": 50035,
//!     "message": "Invalid Form Body",
//!     "errors": {"username": {"_errors": [{"message": "too short"}]}}
//! });
//! let error = translate(&RawResponse::new(400, "Bad Request"), Some(&body.into()));
//! assert_eq!(error.text(), "Invalid Form Body\nIn username: too short");
//! ```

pub mod config;
pub mod error;
pub mod flatten;
pub mod probe;
pub mod response;
pub mod translate;

pub use config::ProbeConfig;
pub use error::{
    ChatBotError, ClientError, ConnectionClosed, HttpError, HttpErrorKind, RateLimited, Result,
};
pub use flatten::{flatten_error_tree, FlattenedErrors};
pub use probe::{ProbeReport, Prober};
pub use response::{HasCloseCode, HasStatus, RawResponse};
pub use translate::{translate, ErrorMessage, TranslatedError, TranslationOutcome};
