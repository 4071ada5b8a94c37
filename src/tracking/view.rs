use super::{ErrorKind, TrackingError, TrackingResult};

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_STATUS_MESSAGE: &str = "No status found for this ID.";
pub const FETCH_FAILED_MESSAGE: &str = "Unable to fetch details.";
pub const FETCH_FAILED_HINT: &str = "Please check the ID or try again later.";

/// Render-ready projection of a [`TrackingResult`].
///
/// Optional lines are `None` when there is nothing to show, so renderers
/// leave them out instead of drawing an empty row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingView {
    pub badge: String,
    pub activity: String,
    pub location: Option<String>,
    pub timestamp: Option<String>,
}

impl TrackingView {
    /// Binds a result to the view. The activity line takes the latest event's
    /// activity when it has one and falls back to the status otherwise.
    pub fn from_result(result: &TrackingResult) -> Self {
        let event = result.latest_event.as_ref();

        let activity = present(event.and_then(|e| e.activity.as_deref()))
            .unwrap_or(result.status.as_str())
            .to_string();

        Self {
            badge: result.status.clone(),
            activity,
            location: present(event.and_then(|e| e.location.as_deref())).map(str::to_string),
            timestamp: present(event.and_then(|e| e.timestamp.as_deref())).map(str::to_string),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The single mode the tracking widget shows at any instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WidgetViewState {
    #[default]
    Idle,
    Loading,
    Rendered(TrackingView),
    Invalid,
    Error,
}

impl WidgetViewState {
    pub fn from_outcome(outcome: &Result<TrackingResult, TrackingError>) -> Self {
        match outcome {
            Ok(result) => WidgetViewState::Rendered(TrackingView::from_result(result)),
            Err(e) => match e.kind() {
                ErrorKind::MalformedResult => WidgetViewState::Invalid,
                ErrorKind::Transport => WidgetViewState::Error,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WidgetViewState::Rendered(_) | WidgetViewState::Invalid | WidgetViewState::Error
        )
    }
}
