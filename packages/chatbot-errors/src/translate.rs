//! Turning failed responses into [`TranslatedError`] values.
//!
//! The API reports failures either as plain text or as a structured body:
//!
//! ```json
//! {
//!     "code": 50035,
//!     "message": "Invalid Form Body",
//!     "errors": {"username": {"_errors": [{"message": "too short"}]}}
//! }
//! ```
//!
//! [`translate`] never fails. Bodies it cannot make sense of are kept whole as
//! the error text.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ChatBotError, HttpError, RateLimited};
use crate::flatten::flatten_error_tree;
use crate::response::HasStatus;

/// Error payload accompanying a failed response.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorMessage {
    /// Plain-text error.
    Text(String),
    /// Decoded JSON body, expected to look like `{code, message, errors}`.
    Body(Value),
}

impl ErrorMessage {
    /// `retry_after` seconds advertised by a rate-limit body.
    pub fn retry_after(&self) -> Option<f64> {
        match self {
            ErrorMessage::Body(body) => body.get("retry_after").and_then(Value::as_f64),
            ErrorMessage::Text(_) => None,
        }
    }
}

impl From<&str> for ErrorMessage {
    fn from(text: &str) -> Self {
        ErrorMessage::Text(text.to_string())
    }
}

impl From<String> for ErrorMessage {
    fn from(text: String) -> Self {
        ErrorMessage::Text(text)
    }
}

impl From<Value> for ErrorMessage {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ErrorMessage::Text(text),
            body => ErrorMessage::Body(body),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Value>,
}

/// A failed response reduced to status, API error code and readable text.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedError {
    status: u16,
    reason: String,
    code: i64,
    text: String,
    errors: Option<Map<String, Value>>,
}

impl TranslatedError {
    /// HTTP status, `0` if the transport did not report one.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// API-specific error code, `0` when none was given.
    pub fn code(&self) -> i64 {
        self.code
    }

    /// Human-readable message. May be empty.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The unflattened field-error tree, if the body carried one.
    pub fn errors(&self) -> Option<&Map<String, Value>> {
        self.errors.as_ref()
    }
}

impl fmt::Display for TranslatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if !self.reason.is_empty() {
            write!(f, " {}", self.reason)?;
        }
        if self.code != 0 {
            write!(f, " (error code: {})", self.code)?;
        }
        if !self.text.is_empty() {
            write!(f, ": {}", self.text)?;
        }
        Ok(())
    }
}

/// Translate a failed response and its payload.
pub fn translate<R>(response: &R, message: Option<&ErrorMessage>) -> TranslatedError
where
    R: HasStatus + ?Sized,
{
    let status = response.status();
    let (code, text, errors) = match message {
        None | Some(ErrorMessage::Body(Value::Null)) => (0, String::new(), None),
        Some(ErrorMessage::Text(text)) => (0, text.clone(), None),
        Some(ErrorMessage::Body(body)) => from_body(status, body),
    };

    TranslatedError {
        status,
        reason: response.reason().to_string(),
        code,
        text,
        errors,
    }
}

fn from_body(status: u16, body: &Value) -> (i64, String, Option<Map<String, Value>>) {
    if !body.is_object() {
        warn!(status, body = %body, "Error body is not an object");
        return opaque(body);
    }

    let parsed = match ErrorBody::deserialize(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(status, error = %e, "Unexpected error body shape");
            return opaque(body);
        }
    };

    let code = parsed.code.unwrap_or(0);
    let base = parsed.message.unwrap_or_default();

    match parsed.errors {
        Some(Value::Object(tree)) if !tree.is_empty() => {
            let flat = flatten_error_tree(&tree, "");
            let text = format!("{}\n{}", base, flat.to_lines());
            (code, text, Some(tree))
        }
        Some(errors) if !is_empty_value(&errors) => {
            warn!(status, errors = %errors, "Error tree is not an object");
            opaque(body)
        }
        _ => (code, base, None),
    }
}

fn opaque(body: &Value) -> (i64, String, Option<Map<String, Value>>) {
    (0, body.to_string(), None)
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// What a failure turned into: a rate limit or an HTTP error.
///
/// Rate limits can be decided before any request is sent, so they carry only
/// the wait time and stay outside the HTTP family.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationOutcome {
    PreemptiveRateLimit(f64),
    HttpFailure(TranslatedError),
}

impl TranslationOutcome {
    /// Classify a failed response. A 429 that says how long to wait becomes
    /// a rate limit: the body's `retry_after` first, then the `Retry-After`
    /// header. Everything else is an HTTP failure.
    pub fn from_response<R>(response: &R, message: Option<&ErrorMessage>) -> Self
    where
        R: HasStatus + ?Sized,
    {
        if response.status() == 429 {
            let retry_after = message
                .and_then(ErrorMessage::retry_after)
                .or_else(|| response.retry_after());
            if let Some(retry_after) = retry_after {
                debug!(retry_after, "Rate limited by server");
                return TranslationOutcome::PreemptiveRateLimit(retry_after);
            }
        }

        TranslationOutcome::HttpFailure(translate(response, message))
    }

    pub fn into_error(self) -> ChatBotError {
        match self {
            TranslationOutcome::PreemptiveRateLimit(retry_after) => {
                RateLimited::new(retry_after).into()
            }
            TranslationOutcome::HttpFailure(error) => HttpError::new(error).into(),
        }
    }
}

impl From<TranslationOutcome> for ChatBotError {
    fn from(outcome: TranslationOutcome) -> Self {
        outcome.into_error()
    }
}
