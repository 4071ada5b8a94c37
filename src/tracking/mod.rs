pub mod error;
pub mod gate;
pub mod http;
pub mod view;

pub use error::{ErrorKind, TrackingError};
pub use gate::{InFlightGuard, RequestGate};
pub use view::{TrackingView, WidgetViewState};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// A user-supplied tracking identifier, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingQuery(String);

impl TrackingQuery {
    /// Returns `None` when the input is empty or only whitespace.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LatestEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// A lookup answer that carries a status. Payloads without one never become a
/// `TrackingResult`; see [`parse_response`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_event: Option<LatestEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text_snippet: Option<String>,
}

/// Decode a response body from the tracking service.
///
/// Only a body that is not JSON at all is a transport failure. Any JSON value
/// without a non-empty string `status` (including `{}`, `null` and `[]`) is
/// [`TrackingError::MalformedResult`], whatever else it carries. Optional
/// fields of the wrong type count as absent.
pub fn parse_response(body: &str) -> Result<TrackingResult, TrackingError> {
    let payload: Value = serde_json::from_str(body)?;

    let status = text_field(&payload, "status")
        .filter(|status| !status.is_empty())
        .ok_or(TrackingError::MalformedResult)?;

    let latest_event = payload
        .get("latest_event")
        .filter(|event| event.is_object())
        .map(|event| LatestEvent {
            activity: text_field(event, "activity"),
            location: text_field(event, "location"),
            timestamp: text_field(event, "timestamp"),
        });

    Ok(TrackingResult {
        status,
        latest_event,
        details: text_field(&payload, "details"),
        full_text_snippet: text_field(&payload, "full_text_snippet"),
    })
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

/// Message sent back to the UI loop when a lookup finishes.
///
/// It owns the lookup's [`InFlightGuard`], so the widget stays locked until
/// the outcome has been applied, or until the message is dropped unread.
#[derive(Debug)]
pub struct TrackingMessage {
    pub widget_id: String,
    pub query: TrackingQuery,
    pub outcome: Result<TrackingResult, TrackingError>,
    pub(crate) _guard: InFlightGuard,
}

#[async_trait]
pub trait TrackingFetcher: Send + Sync {
    async fn fetch(&self, query: &TrackingQuery) -> Result<TrackingResult, TrackingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_trims_whitespace() {
        let query = TrackingQuery::new("  V3500546621 \n").unwrap();
        assert_eq!(query.as_str(), "V3500546621");
    }

    #[test]
    fn test_query_rejects_blank() {
        assert!(TrackingQuery::new("").is_none());
        assert!(TrackingQuery::new("   \t ").is_none());
    }

    #[test]
    fn test_parse_full_result() {
        let body = r#"{
            "status": "In Transit",
            "latest_event": {"activity": "Out for delivery", "location": "Hub A"},
            "details": "Tracking info found",
            "unrelated": 42
        }"#;
        let result = parse_response(body).unwrap();
        assert_eq!(result.status, "In Transit");
        let event = result.latest_event.unwrap();
        assert_eq!(event.activity.as_deref(), Some("Out for delivery"));
        assert_eq!(event.location.as_deref(), Some("Hub A"));
        assert_eq!(event.timestamp, None);
        assert_eq!(result.details.as_deref(), Some("Tracking info found"));
    }

    #[test]
    fn test_parse_ignores_mistyped_optional_fields() {
        let result =
            parse_response(r#"{"status":"Delivered","details":{"url":"x"},"full_text_snippet":3}"#)
                .unwrap();
        assert_eq!(result.status, "Delivered");
        assert_eq!(result.details, None);
        assert_eq!(result.full_text_snippet, None);

        let result = parse_response(
            r#"{"status":"Booked","latest_event":{"activity":5,"location":"Hub A","timestamp":null}}"#,
        )
        .unwrap();
        let event = result.latest_event.unwrap();
        assert_eq!(event.activity, None);
        assert_eq!(event.location.as_deref(), Some("Hub A"));
        assert_eq!(event.timestamp, None);

        let result = parse_response(r#"{"status":"Booked","latest_event":"n/a"}"#).unwrap();
        assert!(result.latest_event.is_none());
    }

    #[test]
    fn test_parse_status_only() {
        let result = parse_response(r#"{"status":"Delivered"}"#).unwrap();
        assert_eq!(result.status, "Delivered");
        assert!(result.latest_event.is_none());
    }

    #[test]
    fn test_parse_missing_status_is_malformed() {
        for body in [
            "{}",
            "null",
            r#"{"status": null}"#,
            r#"{"status": ""}"#,
            r#"{"status": 7}"#,
            r#"{"latest_event": {"activity": "Picked up"}}"#,
            r#"{"latest_event": 5}"#,
            r#"{"latest_event": "n/a"}"#,
            r#"{"details": 5}"#,
            "[]",
            "42",
            r#""Delivered""#,
        ] {
            let err = parse_response(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedResult, "body: {}", body);
        }
    }

    #[test]
    fn test_parse_garbage_is_transport_failure() {
        for body in ["", "<html>502</html>", r#"{"status": "Delivered""#] {
            let err = parse_response(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Transport, "body: {}", body);
        }
    }

    #[test]
    fn test_result_json_skips_absent_fields() {
        let result = parse_response(r#"{"status":"Delivered"}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"status":"Delivered"}"#
        );
    }
}
