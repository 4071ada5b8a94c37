use crate::config::WidgetConfig;
use crate::tracking::view::{
    FETCH_FAILED_HINT, FETCH_FAILED_MESSAGE, LOADING_MESSAGE, NO_STATUS_MESSAGE,
};
use crate::tracking::{
    ErrorKind, InFlightGuard, RequestGate, TrackingError, TrackingFetcher, TrackingMessage,
    TrackingQuery, TrackingView, WidgetViewState,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const INPUT_PLACEHOLDER: &str = "Enter tracking ID";
const IDLE_HINT: &str = "Type a tracking ID and press Enter, or Tab to the Track button.";
const BUTTON_LABEL: &str = "Track";
const BUTTON_WIDTH: u16 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Button,
}

pub struct TrackingWidget {
    id: String,
    title: String,
    input: String,
    focus: Focus,
    state: WidgetViewState,
    gate: RequestGate,
    fetcher: Arc<dyn TrackingFetcher>,
    timeout: Duration,
    // Where the button landed on the last draw, for mouse hit-testing.
    button_area: Cell<Rect>,
}

/// A lookup admitted by [`TrackingWidget::submit`], ready to run off the UI loop.
pub struct PendingLookup {
    widget_id: String,
    query: TrackingQuery,
    fetcher: Arc<dyn TrackingFetcher>,
    timeout: Duration,
    guard: InFlightGuard,
}

impl PendingLookup {
    pub fn query(&self) -> &TrackingQuery {
        &self.query
    }

    /// Runs the fetch, bounded by the widget's timeout.
    pub async fn resolve(self) -> TrackingMessage {
        let outcome = match tokio::time::timeout(self.timeout, self.fetcher.fetch(&self.query)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(TrackingError::Timeout(self.timeout)),
        };

        TrackingMessage {
            widget_id: self.widget_id,
            query: self.query,
            outcome,
            _guard: self.guard,
        }
    }
}

impl TrackingWidget {
    pub fn new(config: &WidgetConfig, fetcher: Arc<dyn TrackingFetcher>, timeout: Duration) -> Self {
        Self {
            id: "tracking-0".to_string(),
            title: config.title.clone(),
            input: config.initial_id.clone(),
            focus: Focus::Input,
            state: WidgetViewState::Idle,
            gate: RequestGate::new(),
            fetcher,
            timeout,
            button_area: Cell::new(Rect::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &WidgetViewState {
        &self.state
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// The submit control is disabled exactly while a lookup is in flight.
    pub fn is_submit_enabled(&self) -> bool {
        !self.gate.is_busy()
    }

    pub fn set_input(&mut self, value: &str) {
        self.input = value.to_string();
    }

    pub fn add_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn delete_char(&mut self) {
        self.input.pop();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Input => Focus::Button,
            Focus::Button => Focus::Input,
        };
    }

    /// Starts a lookup for the current input.
    ///
    /// Returns `None` and leaves the view untouched when the trimmed input is
    /// empty or another lookup still holds the gate.
    pub fn submit(&mut self) -> Option<PendingLookup> {
        let query = TrackingQuery::new(&self.input)?;

        let Some(guard) = self.gate.try_acquire() else {
            debug!(tracking_id = %query, "lookup already in flight, ignoring trigger");
            return None;
        };

        info!(tracking_id = %query, "looking up shipment");
        self.state = WidgetViewState::Loading;

        Some(PendingLookup {
            widget_id: self.id.clone(),
            query,
            fetcher: Arc::clone(&self.fetcher),
            timeout: self.timeout,
            guard,
        })
    }

    /// Applies a finished lookup. The message's guard is released on return.
    pub fn apply(&mut self, message: TrackingMessage) {
        if message.widget_id != self.id {
            warn!(widget_id = %message.widget_id, "dropping lookup result for another widget");
            return;
        }

        match &message.outcome {
            Ok(result) => {
                info!(tracking_id = %message.query, status = %result.status, "lookup succeeded");
                debug!(?result, "tracking result");
            }
            Err(e) if e.kind() == ErrorKind::MalformedResult => {
                warn!(tracking_id = %message.query, "tracking response has no status");
            }
            Err(e) => {
                error!(tracking_id = %message.query, error = %e, "lookup failed");
            }
        }

        self.state = WidgetViewState::from_outcome(&message.outcome);
    }

    pub fn button_hit(&self, column: u16, row: u16) -> bool {
        let area = self.button_area.get();
        column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, selected: bool) {
        let border_style = if selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(inner);
        let controls = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(BUTTON_WIDTH)])
            .split(rows[0]);

        self.render_input(frame, controls[0]);
        self.render_button(frame, controls[1]);

        let result = Paragraph::new(result_lines(&self.state))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::TOP).title(" Result "));
        frame.render_widget(result, rows[1]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let focused = self.focus == Focus::Input;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            });

        let text = if self.input.is_empty() {
            Line::from(Span::styled(
                INPUT_PLACEHOLDER,
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(self.input.as_str())
        };
        frame.render_widget(Paragraph::new(text).block(block), area);

        if focused {
            let max_x = area.x.saturating_add(area.width.saturating_sub(2));
            let typed = u16::try_from(self.input.chars().count()).unwrap_or(u16::MAX);
            let x = area.x.saturating_add(1).saturating_add(typed).min(max_x);
            frame.set_cursor_position((x, area.y.saturating_add(1)));
        }
    }

    fn render_button(&self, frame: &mut Frame, area: Rect) {
        self.button_area.set(area);

        let style = if !self.is_submit_enabled() {
            Style::default().fg(Color::DarkGray)
        } else if self.focus == Focus::Button {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let button = Paragraph::new(Span::styled(BUTTON_LABEL, style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(style));
        frame.render_widget(button, area);
    }
}

/// Lines for the result area. Optional lines of a rendered result are only
/// emitted when the view carries a value for them.
pub fn result_lines(state: &WidgetViewState) -> Vec<Line<'_>> {
    match state {
        WidgetViewState::Idle => vec![Line::from(Span::styled(
            IDLE_HINT,
            Style::default().fg(Color::DarkGray),
        ))],
        WidgetViewState::Loading => vec![Line::from(Span::styled(
            LOADING_MESSAGE,
            Style::default().fg(Color::Yellow),
        ))],
        WidgetViewState::Rendered(view) => rendered_lines(view),
        WidgetViewState::Invalid => vec![Line::from(Span::styled(
            NO_STATUS_MESSAGE,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))],
        WidgetViewState::Error => vec![
            Line::from(Span::styled(
                FETCH_FAILED_MESSAGE,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                FETCH_FAILED_HINT,
                Style::default().fg(Color::DarkGray),
            )),
        ],
    }
}

fn rendered_lines(view: &TrackingView) -> Vec<Line<'_>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {} ", view.badge),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            view.activity.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
    ];

    if let Some(location) = &view.location {
        lines.push(Line::from(Span::styled(
            location.as_str(),
            Style::default().fg(Color::Gray),
        )));
    }

    if let Some(timestamp) = &view.timestamp {
        lines.push(Line::from(Span::styled(
            timestamp.as_str(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}
