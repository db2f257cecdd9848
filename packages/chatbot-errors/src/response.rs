//! Transport capabilities the translator reads from.
//!
//! HTTP clients disagree on where they keep the status code, so the
//! translator only ever talks to [`HasStatus`]. Adapters are provided for
//! `reqwest` and for [`RawResponse`], a captured response that may carry the
//! status under either of the two common field names.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use tracing::warn;

use crate::translate::ErrorMessage;

/// Anything that can report an HTTP status and reason phrase.
pub trait HasStatus {
    /// Numeric status code, `0` when the client did not expose one.
    fn status(&self) -> u16;

    /// Reason phrase, empty when unknown.
    fn reason(&self) -> &str;

    /// Seconds the server asked the client to wait, from `Retry-After`.
    fn retry_after(&self) -> Option<f64> {
        None
    }
}

impl<T: HasStatus + ?Sized> HasStatus for &T {
    fn status(&self) -> u16 {
        (**self).status()
    }

    fn reason(&self) -> &str {
        (**self).reason()
    }

    fn retry_after(&self) -> Option<f64> {
        (**self).retry_after()
    }
}

impl HasStatus for reqwest::StatusCode {
    fn status(&self) -> u16 {
        self.as_u16()
    }

    fn reason(&self) -> &str {
        self.canonical_reason().unwrap_or_default()
    }
}

impl HasStatus for reqwest::Response {
    fn status(&self) -> u16 {
        reqwest::Response::status(self).as_u16()
    }

    fn reason(&self) -> &str {
        reqwest::Response::status(self)
            .canonical_reason()
            .unwrap_or_default()
    }

    fn retry_after(&self) -> Option<f64> {
        retry_after_header(self.headers())
    }
}

/// `Retry-After` in its delay-seconds form. HTTP-date values are ignored.
pub(crate) fn retry_after_header(headers: &HeaderMap) -> Option<f64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
}

/// A websocket (or similar) that may know why it was closed.
pub trait HasCloseCode {
    /// Close code reported by the transport, if any.
    fn close_code(&self) -> Option<i32>;

    /// Close reason reported by the transport, if any.
    fn close_reason(&self) -> Option<&str> {
        None
    }
}

/// A failed response captured for translation.
///
/// `status_code` and `status` mirror the two field names HTTP clients use.
/// The first non-zero one wins. `retry_after` holds the `Retry-After` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub status_code: Option<u16>,
    pub status: Option<u16>,
    pub reason_phrase: String,
    pub json_body: Option<Value>,
    pub retry_after: Option<f64>,
}

impl RawResponse {
    pub fn new(status_code: u16, reason_phrase: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            reason_phrase: reason_phrase.into(),
            ..Default::default()
        }
    }

    pub fn with_json_body(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }

    pub fn with_retry_after(mut self, secs: f64) -> Self {
        self.retry_after = Some(secs);
        self
    }

    /// Capture a `reqwest` response, consuming its body.
    ///
    /// JSON bodies are kept decoded. Anything else is kept as a JSON string so
    /// it still reaches the translator as plain text.
    pub async fn read(response: reqwest::Response) -> Self {
        let status = reqwest::Response::status(&response);
        let reason_phrase = status.canonical_reason().unwrap_or_default().to_string();
        let retry_after = retry_after_header(response.headers());

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(status = %status, error = %e, "Failed to read error response body");
                String::new()
            }
        };

        let json_body = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => Some(value),
                Err(_) => Some(Value::String(text)),
            }
        };

        Self {
            status_code: Some(status.as_u16()),
            status: None,
            reason_phrase,
            json_body,
            retry_after,
        }
    }

    /// The body in the shape [`translate`](crate::translate) expects.
    /// A JSON `null` body counts as no message.
    pub fn message(&self) -> Option<ErrorMessage> {
        self.json_body
            .clone()
            .filter(|body| !body.is_null())
            .map(ErrorMessage::from)
    }
}

impl HasStatus for RawResponse {
    fn status(&self) -> u16 {
        self.status_code
            .filter(|code| *code != 0)
            .or_else(|| self.status.filter(|code| *code != 0))
            .unwrap_or(0)
    }

    fn reason(&self) -> &str {
        &self.reason_phrase
    }

    fn retry_after(&self) -> Option<f64> {
        self.retry_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_code_field() {
        let response = RawResponse {
            status_code: Some(403),
            ..Default::default()
        };
        assert_eq!(response.status(), 403);
    }

    #[test]
    fn test_status_field_fallback() {
        let response = RawResponse {
            status: Some(404),
            ..Default::default()
        };
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn test_zero_status_code_falls_through() {
        let response = RawResponse {
            status_code: Some(0),
            status: Some(502),
            ..Default::default()
        };
        assert_eq!(response.status(), 502);
    }

    #[test]
    fn test_no_status_defaults_to_zero() {
        assert_eq!(RawResponse::default().status(), 0);
    }

    #[test]
    fn test_status_code_adapter() {
        let status = reqwest::StatusCode::TOO_MANY_REQUESTS;
        assert_eq!(HasStatus::status(&status), 429);
        assert_eq!(status.reason(), "Too Many Requests");
    }

    #[test]
    fn test_message_from_body() {
        let response = RawResponse::new(400, "Bad Request").with_json_body(json!("plain"));
        assert_eq!(response.message(), Some(ErrorMessage::Text("plain".into())));

        let response = RawResponse::new(400, "Bad Request");
        assert_eq!(response.message(), None);
    }

    #[test]
    fn test_null_body_is_no_message() {
        let response = RawResponse::new(400, "Bad Request").with_json_body(json!(null));
        assert_eq!(response.message(), None);
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after_header(&headers), None);

        headers.insert(RETRY_AFTER, "2".parse().unwrap());
        assert_eq!(retry_after_header(&headers), Some(2.0));

        headers.insert(RETRY_AFTER, " 0.5 ".parse().unwrap());
        assert_eq!(retry_after_header(&headers), Some(0.5));

        headers.insert(RETRY_AFTER, "Wed, 21 Oct 2015 07:28:00 GMT".parse().unwrap());
        assert_eq!(retry_after_header(&headers), None);

        headers.insert(RETRY_AFTER, "-3".parse().unwrap());
        assert_eq!(retry_after_header(&headers), None);
    }
}
