pub mod text;
pub mod widgets;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const HELP: &str = "Enter: track | Tab: switch focus | Space: press button | Esc: quit";

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let header = Line::from(vec![
        Span::styled(
            " shiptrack ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(app.endpoint(), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(header), chunks[0]);

    app.widget().render(frame, chunks[1], true);

    let footer = if app.widget().is_submit_enabled() {
        Line::from(Span::styled(HELP, Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(Span::styled(
            "Looking up shipment...",
            Style::default().fg(Color::Yellow),
        ))
    };
    frame.render_widget(Paragraph::new(footer), chunks[2]);
}
