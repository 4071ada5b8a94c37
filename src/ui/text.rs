use crate::tracking::view::{
    FETCH_FAILED_HINT, FETCH_FAILED_MESSAGE, LOADING_MESSAGE, NO_STATUS_MESSAGE,
};
use crate::tracking::WidgetViewState;

/// Plain-text rendering of a view state, for non-interactive output.
pub fn render_plain(state: &WidgetViewState) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let badge;

    match state {
        WidgetViewState::Idle => {}
        WidgetViewState::Loading => lines.push(LOADING_MESSAGE),
        WidgetViewState::Rendered(view) => {
            badge = format!("[{}]", view.badge);
            lines.push(&badge);
            lines.push(&view.activity);
            if let Some(location) = &view.location {
                lines.push(location);
            }
            if let Some(timestamp) = &view.timestamp {
                lines.push(timestamp);
            }
        }
        WidgetViewState::Invalid => lines.push(NO_STATUS_MESSAGE),
        WidgetViewState::Error => {
            lines.push(FETCH_FAILED_MESSAGE);
            lines.push(FETCH_FAILED_HINT);
        }
    }

    lines.join("\n")
}
