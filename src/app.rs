use crate::config::Config;
use crate::tracking::http::HttpTrackingFetcher;
use crate::tracking::{TrackingFetcher, TrackingMessage, TrackingResult, WidgetViewState};
use crate::ui;
use crate::ui::widgets::{Focus, TrackingWidget};
use anyhow::{bail, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    widget: TrackingWidget,
    endpoint: String,
    tx: mpsc::UnboundedSender<TrackingMessage>,
    rx: mpsc::UnboundedReceiver<TrackingMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, fetcher: Arc<dyn TrackingFetcher>, endpoint: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            widget: TrackingWidget::new(&config.widget, fetcher, config.api.timeout()),
            endpoint,
            tx,
            rx,
            should_quit: false,
        }
    }

    pub fn widget(&self) -> &TrackingWidget {
        &self.widget
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Single entry point for both the confirm keystroke and the Track button.
    pub fn handle_tracking(&mut self) {
        let Some(pending) = self.widget.submit() else {
            return;
        };

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let message = pending.resolve().await;
            // The receiver only goes away on shutdown; the guard drops with the message.
            let _ = tx.send(message);
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.widget.toggle_focus(),
            KeyCode::Enter => self.handle_tracking(),
            KeyCode::Char(' ') if self.widget.focus() == Focus::Button => self.handle_tracking(),
            KeyCode::Char(c) if self.widget.focus() == Focus::Input => self.widget.add_char(c),
            KeyCode::Backspace if self.widget.focus() == Focus::Input => {
                self.widget.delete_char();
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if self.widget.button_hit(mouse.column, mouse.row) {
                debug!("track button clicked");
                self.handle_tracking();
            }
        }
    }

    /// Applies every finished lookup waiting in the channel.
    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.widget.apply(message);
        }
    }

    async fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        while !self.should_quit {
            self.drain_messages();
            terminal.draw(|frame| ui::draw(frame, self))?;

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }
}

/// Puts the terminal into raw/alternate-screen mode and restores it on drop,
/// including when the UI loop bails out with an error.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

/// Runs the interactive tracker until the user quits.
pub async fn run(config: &Config) -> Result<()> {
    let fetcher = HttpTrackingFetcher::new(&config.api);
    let endpoint = fetcher.endpoint().to_string();
    info!(%endpoint, "starting interactive tracker");

    let mut app = App::new(config, Arc::new(fetcher), endpoint);

    let _guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    app.run_loop(&mut terminal).await
}

/// Runs one lookup through `widget` and waits for it to finish.
///
/// Returns the decoded result when the service produced one, so callers can
/// print it verbatim.
pub async fn lookup(widget: &mut TrackingWidget, tracking_id: &str) -> Result<Option<TrackingResult>> {
    widget.set_input(tracking_id);
    let Some(pending) = widget.submit() else {
        bail!("Tracking ID must not be empty");
    };

    let message = pending.resolve().await;
    let result = message.outcome.as_ref().ok().cloned();
    widget.apply(message);

    Ok(result)
}

/// Non-interactive lookup: prints the rendered view (or the raw result as JSON).
pub async fn run_once(config: &Config, tracking_id: &str, json: bool) -> Result<ExitCode> {
    let fetcher = Arc::new(HttpTrackingFetcher::new(&config.api));
    let mut widget = TrackingWidget::new(&config.widget, fetcher, config.api.timeout());

    let result = lookup(&mut widget, tracking_id).await?;

    match result {
        Some(result) if json => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => println!("{}", ui::text::render_plain(widget.state())),
    }

    Ok(match widget.state() {
        WidgetViewState::Rendered(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{parse_response, TrackingError, TrackingQuery};
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TrackingFetcher for CountingFetcher {
        async fn fetch(&self, _query: &TrackingQuery) -> Result<TrackingResult, TrackingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            parse_response(r#"{"status":"Delivered"}"#)
        }
    }

    fn app_with(fetcher: Arc<CountingFetcher>) -> App {
        App::new(&Config::default(), fetcher, "http://test/track".to_string())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn settle(app: &mut App) {
        let message = app.rx.recv().await.unwrap();
        app.widget.apply(message);
    }

    #[tokio::test]
    async fn test_enter_submits_typed_id() {
        let fetcher = Arc::new(CountingFetcher::default());
        let mut app = app_with(fetcher.clone());

        type_text(&mut app, "V35x");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.widget().input(), "V35");

        press(&mut app, KeyCode::Enter);
        assert!(!app.widget().is_submit_enabled());
        // Still in flight: further triggers are ignored.
        press(&mut app, KeyCode::Enter);

        settle(&mut app).await;
        assert!(app.widget().is_submit_enabled());
        assert!(matches!(
            app.widget().state(),
            WidgetViewState::Rendered(_)
        ));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_button_and_enter_share_handler() {
        let fetcher = Arc::new(CountingFetcher::default());
        let mut app = app_with(fetcher.clone());
        type_text(&mut app, "V1");

        press(&mut app, KeyCode::Enter);
        settle(&mut app).await;
        let via_enter = app.widget().state().clone();

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.widget().focus(), Focus::Button);
        press(&mut app, KeyCode::Char(' '));
        settle(&mut app).await;

        assert_eq!(app.widget().state(), &via_enter);
        assert_eq!(app.widget().input(), "V1");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_enter_does_nothing() {
        let fetcher = Arc::new(CountingFetcher::default());
        let mut app = app_with(fetcher.clone());
        type_text(&mut app, "   ");

        press(&mut app, KeyCode::Enter);
        app.drain_messages();

        assert_eq!(app.widget().state(), &WidgetViewState::Idle);
        assert!(app.widget().is_submit_enabled());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mouse_click_on_button_submits() {
        let fetcher = Arc::new(CountingFetcher::default());
        let mut app = app_with(fetcher.clone());
        type_text(&mut app, "V1");

        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal.draw(|frame| ui::draw(frame, &app)).unwrap();

        // Miss: inside the input box.
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.widget().state(), &WidgetViewState::Idle);

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 54,
            row: 3,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.widget().state(), &WidgetViewState::Loading);

        settle(&mut app).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_escape_quits() {
        let mut app = app_with(Arc::new(CountingFetcher::default()));
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_space_types_into_input() {
        let mut app = app_with(Arc::new(CountingFetcher::default()));
        type_text(&mut app, "A B");
        assert_eq!(app.widget().input(), "A B");
        assert_eq!(app.widget().state(), &WidgetViewState::Idle);
    }

    #[tokio::test]
    async fn test_lookup_rejects_blank_id() {
        let mut widget = TrackingWidget::new(
            &Config::default().widget,
            Arc::new(CountingFetcher::default()),
            Duration::from_secs(1),
        );
        assert!(lookup(&mut widget, "  ").await.is_err());

        let result = lookup(&mut widget, "V1").await.unwrap().unwrap();
        assert_eq!(result.status, "Delivered");
        assert!(widget.is_submit_enabled());
    }
}
