use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::feed::{FeedState, StaleResponses};
use crate::gate::{CredentialField, GateState};
use crate::transport::test_helpers::{ScriptedTransport, response};

fn options() -> PanelOptions {
    PanelOptions {
        feed: FeedOptions { interval: Duration::from_millis(1000), stale_responses: StaleResponses::Discard },
        submit_failure: SubmitFailure::KeepOpen,
    }
}

#[tokio::test]
async fn new_panel_is_unmounted_and_gated() {
    let panel = Panel::new(Arc::new(ScriptedTransport::new()), options());
    assert!(!panel.is_mounted());
    assert!(!panel.is_usable());
    assert_eq!(panel.gate().state(), GateState::Open);
    assert_eq!(panel.feed().state(), FeedState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn feed_polls_while_gate_is_open() {
    let transport = Arc::new(ScriptedTransport::with_fetches(vec![Ok(response(&[("alice", "hi")]))]));
    let mut panel = Panel::new(transport.clone(), options());
    let mut rx = panel.feed().subscribe();
    panel.mount();

    rx.changed().await.unwrap();
    assert_eq!(panel.feed().messages()[0].body, "hi");
    assert!(!panel.is_usable());
    panel.unmount();
}

#[tokio::test]
async fn both_components_share_the_injected_transport() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut panel = Panel::new(transport.clone(), options());
    panel.mount();

    let gate = panel.gate_mut();
    gate.update(CredentialField::BotToken, "t");
    gate.update(CredentialField::AllowedIds, "1,2");
    gate.update(CredentialField::ApiEndpoint, "e");
    gate.update(CredentialField::ApiKey, "k");
    gate.confirm().await.unwrap();

    assert!(panel.is_usable());
    assert_eq!(transport.submissions().len(), 1);
    panel.unmount();
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_polling_and_is_idempotent() {
    let transport = Arc::new(ScriptedTransport::new());
    let mut panel = Panel::new(transport.clone(), options());
    panel.mount();
    panel.mount();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(transport.fetch_calls(), 2);

    panel.unmount();
    panel.unmount();
    assert!(!panel.is_mounted());
    assert_eq!(panel.feed().state(), FeedState::Stopped);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(transport.fetch_calls(), 2);
}
