//! Message feed — periodic fetch of the backend's message list.
//!
//! DESIGN
//! ======
//! A timer task fires every `interval` (first tick one interval after
//! start, so a freshly mounted panel shows an empty list until then) and spawns
//! one fetch per tick, so slow fetches may overlap. Each fetch carries a
//! [`Ticket`]: the run generation it was issued under and a monotonic
//! sequence number. Completions are applied under a single lock, which
//! replaces the published list wholesale and wakes every `watch` subscriber.
//!
//! ORDERING
//! ========
//! With [`StaleResponses::Apply`] completions apply in completion order, so
//! a slow early fetch can overwrite a fresher list. [`StaleResponses::Discard`]
//! drops any completion whose sequence number is not newer than the last one
//! applied.
//!
//! ERROR HANDLING
//! ==============
//! Fetch failures are logged and swallowed; the previous list stays in
//! place and the next tick is the retry. Completions that arrive after
//! [`MessageFeed::stop`] are dropped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::transport::{MessagesResponse, Transport, TransportError, WireMessage};

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

// =============================================================================
// MESSAGE
// =============================================================================

/// A chat message as displayed. Ordering is positional only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display name. Empty for messages written by the bot.
    pub sender: String,
    pub body: String,
}

impl Message {
    #[must_use]
    pub fn new(sender: &str, body: &str) -> Self {
        Self { sender: sender.to_owned(), body: body.to_owned() }
    }
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Self { sender: wire.username.unwrap_or_default(), body: wire.message }
    }
}

/// Immutable snapshot of the displayed list.
pub type MessageList = Arc<Vec<Message>>;

/// Convert a response in the backend's stored order (oldest first) into
/// display order: the reverse, which the view then scrolls to the end of.
#[must_use]
pub fn display_order(response: MessagesResponse) -> Vec<Message> {
    response.messages.into_iter().rev().map(Message::from).collect()
}

// =============================================================================
// OPTIONS
// =============================================================================

/// What to do with a completion older than the last one applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleResponses {
    /// Apply in completion order; last completed wins.
    Apply,
    /// Drop completions whose sequence number is not newer than the last applied.
    #[default]
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    pub interval: Duration,
    pub stale_responses: StaleResponses,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self { interval: DEFAULT_POLL_INTERVAL, stale_responses: StaleResponses::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    Stopped,
    Running,
}

/// Identity of one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    seq: u64,
}

/// Outcome of applying one fetch completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The list was replaced.
    Applied,
    /// The fetch failed; the previous list was kept.
    Failed,
    /// A newer completion had already been applied.
    Stale,
    /// The feed was stopped (or restarted) since the fetch was issued.
    Detached,
}

// =============================================================================
// SHARED STATE
// =============================================================================

struct FeedInner {
    running: bool,
    generation: u64,
    next_seq: u64,
    last_applied: Option<u64>,
}

struct FeedShared {
    inner: Mutex<FeedInner>,
    list: watch::Sender<MessageList>,
    stale_responses: StaleResponses,
}

impl FeedShared {
    fn new(stale_responses: StaleResponses) -> Self {
        let (list, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Mutex::new(FeedInner { running: false, generation: 0, next_seq: 0, last_applied: None }),
            list,
            stale_responses,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a new run and return its generation.
    fn start(&self) -> u64 {
        let mut inner = self.lock();
        inner.running = true;
        inner.generation += 1;
        inner.last_applied = None;
        inner.generation
    }

    fn stop(&self) -> bool {
        let mut inner = self.lock();
        std::mem::replace(&mut inner.running, false)
    }

    /// Issue a ticket for a fetch under the current run, if running.
    fn issue(&self) -> Option<Ticket> {
        let mut inner = self.lock();
        if !inner.running {
            return None;
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        Some(Ticket { generation: inner.generation, seq })
    }

    fn complete(&self, ticket: Ticket, result: Result<MessagesResponse, TransportError>) -> Completion {
        let mut inner = self.lock();
        if !inner.running || ticket.generation != inner.generation {
            debug!(seq = ticket.seq, "fetch completed after teardown; dropped");
            return Completion::Detached;
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(seq = ticket.seq, error = %e, "message fetch failed; keeping previous list");
                return Completion::Failed;
            }
        };

        if self.stale_responses == StaleResponses::Discard && inner.last_applied.is_some_and(|last| last >= ticket.seq) {
            debug!(seq = ticket.seq, last_applied = ?inner.last_applied, "stale fetch dropped");
            return Completion::Stale;
        }

        let list = display_order(response);
        debug!(seq = ticket.seq, count = list.len(), "message list replaced");
        inner.last_applied = Some(inner.last_applied.map_or(ticket.seq, |last| last.max(ticket.seq)));
        self.list.send_replace(Arc::new(list));
        Completion::Applied
    }
}

fn spawn_fetch(transport: &Arc<dyn Transport>, shared: &Arc<FeedShared>) -> Option<JoinHandle<Completion>> {
    let ticket = shared.issue()?;
    let transport = Arc::clone(transport);
    let shared = Arc::clone(shared);
    Some(tokio::spawn(async move {
        let result = transport.fetch_messages().await;
        shared.complete(ticket, result)
    }))
}

// =============================================================================
// MESSAGE FEED
// =============================================================================

/// Keeps a local view of the backend's message list fresh.
pub struct MessageFeed {
    transport: Arc<dyn Transport>,
    interval: Duration,
    shared: Arc<FeedShared>,
    timer: Option<JoinHandle<()>>,
}

impl MessageFeed {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: FeedOptions) -> Self {
        Self {
            transport,
            interval: options.interval,
            shared: Arc::new(FeedShared::new(options.stale_responses)),
            timer: None,
        }
    }

    /// Start the recurring fetch timer. The first tick fires one interval
    /// from now. No-op if already running. Must be called inside a tokio runtime.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        let generation = self.shared.start();
        info!(generation, interval_ms = self.interval.as_millis(), "message feed started");

        let transport = Arc::clone(&self.transport);
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if spawn_fetch(&transport, &shared).is_none() {
                    break;
                }
            }
        }));
    }

    /// Issue one fetch now. Returns `None` when the feed is stopped.
    ///
    /// The returned handle resolves to how the completion was applied.
    pub fn tick(&self) -> Option<JoinHandle<Completion>> {
        spawn_fetch(&self.transport, &self.shared)
    }

    /// Cancel the timer. No further ticks fire, and fetches still in flight
    /// are dropped when they complete. Idempotent.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if self.shared.stop() {
            info!("message feed stopped");
        }
    }

    #[must_use]
    pub fn state(&self) -> FeedState {
        if self.shared.lock().running { FeedState::Running } else { FeedState::Stopped }
    }

    /// Current list in display order.
    #[must_use]
    pub fn messages(&self) -> MessageList {
        self.shared.list.borrow().clone()
    }

    /// Receiver that observes every list replacement.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MessageList> {
        self.shared.list.subscribe()
    }
}

impl Drop for MessageFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
