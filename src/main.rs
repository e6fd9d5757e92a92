//! Terminal host for the panel: shows the settings form until the gate
//! closes, then streams the chat log until the operator quits.
//!
//! The terminal runs in raw mode on the alternate screen, so secret fields
//! are never echoed. Keys are read on a dedicated thread and forwarded to
//! the runtime over a channel.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use heydocker_panel::cli::Cli;
use heydocker_panel::config::ConfigError;
use heydocker_panel::feed::MessageList;
use heydocker_panel::input::{CredentialForm, FeedAction, FormStep, feed_action};
use heydocker_panel::panel::Panel;
use heydocker_panel::render::{Row, ScrollView, draw_feed, draw_lines, render_rows, visible_rows};
use heydocker_panel::transport::{HttpTransport, Transport, TransportError};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const KEY_POLL: Duration = Duration::from_millis(100);
const FEED_HINT: &str = "Up/Down scroll | PgUp/PgDn page | s settings | q quit";
const FEED_HINT_SCROLLED: &str = "-- more below -- | Up/Down scroll | PgUp/PgDn page | s settings | q quit";

#[derive(Debug, thiserror::Error)]
enum HostError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// What the host does after a screen returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Proceed,
    Settings,
    Quit,
}

type Keys = mpsc::Receiver<Event>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), HostError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.panel_config()?;
    info!(backend = %config.backend_url, interval_ms = config.poll_interval_ms, "starting panel");

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.backend_url, config.timeouts)?);
    let mut panel = Panel::new(transport, config.panel_options());
    panel.mount();

    let terminal = TerminalGuard::enter()?;
    let mut keys = spawn_key_reader();
    let result = run(&mut panel, &mut keys, cli.rows, &mut io::stdout()).await;
    drop(terminal);

    panel.unmount();
    result
}

async fn run(panel: &mut Panel, keys: &mut Keys, rows: usize, out: &mut impl Write) -> Result<(), HostError> {
    loop {
        if panel.gate().is_open() && collect_credentials(panel, keys, out).await? == Flow::Quit {
            return Ok(());
        }
        match stream_messages(panel, keys, rows, out).await? {
            Flow::Settings => panel.gate_mut().reopen(),
            Flow::Proceed | Flow::Quit => return Ok(()),
        }
    }
}

/// Drive the settings form until the gate closes. Previously entered values
/// are kept, so reopening lets the operator edit a single field.
async fn collect_credentials(panel: &mut Panel, keys: &mut Keys, out: &mut impl Write) -> Result<Flow, HostError> {
    let mut form = CredentialForm::new(panel.gate());
    while panel.gate().is_open() {
        draw_lines(out, &form.lines(panel.gate()))?;

        let Some(event) = keys.recv().await else {
            return Ok(Flow::Quit);
        };
        let Event::Key(key) = event else {
            continue;
        };
        match form.handle_key(panel.gate_mut(), &key) {
            FormStep::Continue | FormStep::Dismissed => {}
            FormStep::Quit => return Ok(Flow::Quit),
            FormStep::Confirm => {
                let result = panel.gate_mut().confirm().await;
                form.after_confirm(panel.gate(), &result);
            }
        }
    }
    Ok(Flow::Proceed)
}

/// Redraw the visible rows on every list replacement or key until the
/// operator quits or asks for the settings form.
async fn stream_messages(panel: &Panel, keys: &mut Keys, height: usize, out: &mut impl Write) -> Result<Flow, HostError> {
    let mut updates = panel.feed().subscribe();
    let mut view = ScrollView::new(height);
    let mut shown: Option<MessageList> = None;
    let mut rows: Vec<Row> = Vec::new();

    loop {
        let list = updates.borrow_and_update().clone();
        // Identical polls leave the scroll position alone.
        if shown.as_deref() != Some(&*list) {
            rows = render_rows(&list);
            view.replace(rows.len());
            shown = Some(list);
        }
        let status = if view.at_bottom() { FEED_HINT } else { FEED_HINT_SCROLLED };
        draw_feed(out, visible_rows(&rows, &view), status)?;

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(Flow::Quit);
                }
            }
            event = keys.recv() => {
                let Some(event) = event else {
                    return Ok(Flow::Quit);
                };
                let Event::Key(key) = event else {
                    continue;
                };
                match feed_action(&key) {
                    Some(FeedAction::ScrollUp) => view.scroll_up(1),
                    Some(FeedAction::ScrollDown) => view.scroll_down(1),
                    Some(FeedAction::PageUp) => view.scroll_up(view.height()),
                    Some(FeedAction::PageDown) => view.scroll_down(view.height()),
                    Some(FeedAction::Settings) => return Ok(Flow::Settings),
                    Some(FeedAction::Quit) => return Ok(Flow::Quit),
                    None => {}
                }
            }
        }
    }
}

// =============================================================================
// TERMINAL
// =============================================================================

/// Raw mode plus alternate screen for as long as the guard lives. A panic
/// hook restores the terminal before the default hook prints.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;

        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            default_hook(info);
        }));
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
}

/// Forward terminal events until the receiver is dropped.
fn spawn_key_reader() -> Keys {
    let (tx, rx) = mpsc::channel(64);
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(KEY_POLL) {
                Ok(false) => {}
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "terminal read failed");
                        break;
                    }
                },
                Err(e) => {
                    warn!(error = %e, "terminal poll failed");
                    break;
                }
            }
        }
    });
    rx
}
