//! Panel — composition root for the feed and the credential gate.
//!
//! DESIGN
//! ======
//! The host hands one [`Transport`] to [`Panel::new`]; both components share
//! it and nothing else. The feed polls from mount to unmount regardless of
//! the gate, so messages can arrive while the credential form is still open.

use std::sync::Arc;

use tracing::info;

use crate::feed::{FeedOptions, MessageFeed};
use crate::gate::{CredentialGate, SubmitFailure};
use crate::transport::Transport;

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelOptions {
    pub feed: FeedOptions,
    pub submit_failure: SubmitFailure,
}

pub struct Panel {
    feed: MessageFeed,
    gate: CredentialGate,
    mounted: bool,
}

impl Panel {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: PanelOptions) -> Self {
        Self {
            feed: MessageFeed::new(Arc::clone(&transport), options.feed),
            gate: CredentialGate::new(transport, options.submit_failure),
            mounted: false,
        }
    }

    /// Start polling. No-op if already mounted.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.feed.start();
        info!(gate = ?self.gate.state(), "panel mounted");
    }

    /// Stop polling. No-op if not mounted.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.feed.stop();
        info!("panel unmounted");
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The panel is usable once the credential gate is closed.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.gate.is_open()
    }

    #[must_use]
    pub fn feed(&self) -> &MessageFeed {
        &self.feed
    }

    #[must_use]
    pub fn gate(&self) -> &CredentialGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut CredentialGate {
        &mut self.gate
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        self.unmount();
    }
}
