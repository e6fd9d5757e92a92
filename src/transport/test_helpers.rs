//! Mock transports shared by the feed, gate, and panel tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::oneshot;

use super::{MessagesResponse, Transport, TransportError, WireMessage};

type FetchResult = Result<MessagesResponse, TransportError>;

/// Build a server-ordered response from `(username, message)` pairs.
/// An empty username becomes `null`, as the backend stores bot replies.
#[must_use]
pub fn response(rows: &[(&str, &str)]) -> MessagesResponse {
    let messages = rows
        .iter()
        .zip(1_i64..)
        .map(|((user, text), id)| WireMessage {
            id: Some(id),
            username: (!user.is_empty()).then(|| (*user).to_string()),
            message: (*text).to_string(),
        })
        .collect();
    MessagesResponse { messages }
}

// =========================================================================
// ScriptedTransport
// =========================================================================

/// Answers fetches immediately from a queue, then with empty lists.
/// Records every credentials submission.
#[derive(Default)]
pub struct ScriptedTransport {
    fetches: Mutex<VecDeque<FetchResult>>,
    fetch_calls: AtomicUsize,
    submissions: Mutex<Vec<String>>,
    submit_status: Mutex<Option<u16>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_fetches(fetches: Vec<FetchResult>) -> Self {
        Self { fetches: Mutex::new(fetches.into()), ..Self::default() }
    }

    /// Make every subsequent submission fail with `status`.
    pub fn fail_submissions(&self, status: u16) {
        *self.submit_status.lock().unwrap() = Some(status);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<String> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn fetch_messages(&self) -> Result<MessagesResponse, TransportError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.fetches.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(MessagesResponse::default()))
    }

    async fn submit_credentials(&self, body: String) -> Result<(), TransportError> {
        self.submissions.lock().unwrap().push(body);
        match *self.submit_status.lock().unwrap() {
            Some(status) => Err(TransportError::Status { status, body: String::new() }),
            None => Ok(()),
        }
    }
}

// =========================================================================
// ControlledTransport
// =========================================================================

/// Parks every fetch until the test answers it, so completion order is
/// decided by the test rather than by call order.
#[derive(Default)]
pub struct ControlledTransport {
    pending: Mutex<Vec<Option<oneshot::Sender<FetchResult>>>>,
}

impl ControlledTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_calls(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Yield to the scheduler until at least `n` fetches are parked.
    pub async fn wait_for_fetches(&self, n: usize) {
        for _ in 0..1000 {
            if self.fetch_calls() >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {n} fetches, saw {}", self.fetch_calls());
    }

    /// Answer the fetch issued `index`-th (zero-based).
    pub fn respond(&self, index: usize, result: FetchResult) {
        let sender = self.pending.lock().unwrap()[index].take().expect("fetch already answered");
        let _ = sender.send(result);
    }
}

#[async_trait::async_trait]
impl Transport for ControlledTransport {
    async fn fetch_messages(&self) -> Result<MessagesResponse, TransportError> {
        let rx = {
            let (tx, rx) = oneshot::channel();
            self.pending.lock().unwrap().push(Some(tx));
            rx
        };
        rx.await
            .unwrap_or_else(|_| Err(TransportError::Request("fetch abandoned".into())))
    }

    async fn submit_credentials(&self, _body: String) -> Result<(), TransportError> {
        Ok(())
    }
}
