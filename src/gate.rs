//! Credential gate — blocks the panel until a complete credential set is
//! collected and handed to the backend.
//!
//! DESIGN
//! ======
//! [`GateState`] is an explicit two-state variant. Only three operations move
//! it: [`CredentialGate::update`] forces `Open` whenever the set is
//! incomplete, [`CredentialGate::request_close`] and
//! [`CredentialGate::confirm`] close it when the set is complete. Completeness
//! (all four fields non-empty) is the only validation done here; formats are
//! owned by the backend.
//!
//! ERROR HANDLING
//! ==============
//! Incomplete attempts return [`GateError::Incomplete`] and leave everything
//! untouched. Submission failures are returned to the caller; whether the gate
//! still closes is decided by [`SubmitFailure`].

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::transport::{CredentialsPayload, Transport, TransportError};

#[cfg(test)]
#[path = "gate_test.rs"]
mod gate_test;

// =============================================================================
// FIELDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialField {
    BotToken,
    AllowedIds,
    ApiEndpoint,
    ApiKey,
}

impl CredentialField {
    /// Form order.
    pub const ALL: [Self; 4] = [Self::BotToken, Self::AllowedIds, Self::ApiEndpoint, Self::ApiKey];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BotToken => "Telegram Token",
            Self::AllowedIds => "Telegram Allowed IDs",
            Self::ApiEndpoint => "OpenAI Endpoint",
            Self::ApiKey => "OpenAI API Key",
        }
    }

    /// Masked input. The allowed-ID list is the only field shown in clear.
    #[must_use]
    pub fn is_secret(self) -> bool {
        !matches!(self, Self::AllowedIds)
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// CREDENTIAL SET
// =============================================================================

#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    pub bot_token: String,
    pub allowed_ids: String,
    pub api_endpoint: String,
    pub api_key: String,
}

impl CredentialSet {
    #[must_use]
    pub fn get(&self, field: CredentialField) -> &str {
        match field {
            CredentialField::BotToken => &self.bot_token,
            CredentialField::AllowedIds => &self.allowed_ids,
            CredentialField::ApiEndpoint => &self.api_endpoint,
            CredentialField::ApiKey => &self.api_key,
        }
    }

    pub fn set(&mut self, field: CredentialField, value: String) {
        let slot = match field {
            CredentialField::BotToken => &mut self.bot_token,
            CredentialField::AllowedIds => &mut self.allowed_ids,
            CredentialField::ApiEndpoint => &mut self.api_endpoint,
            CredentialField::ApiKey => &mut self.api_key,
        };
        *slot = value;
    }

    /// Fields that are still empty, in form order.
    #[must_use]
    pub fn missing(&self) -> Vec<CredentialField> {
        CredentialField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        CredentialField::ALL.into_iter().all(|field| !self.get(field).is_empty())
    }

    #[must_use]
    pub fn to_payload(&self) -> CredentialsPayload {
        CredentialsPayload {
            token: self.bot_token.clone(),
            allowed_ids: self.allowed_ids.clone(),
            openai_endpoint: self.api_endpoint.clone(),
            openai_api_key: self.api_key.clone(),
        }
    }
}

impl fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &str| if value.is_empty() { "" } else { "***" };
        f.debug_struct("CredentialSet")
            .field("bot_token", &redact(&self.bot_token))
            .field("allowed_ids", &self.allowed_ids)
            .field("api_endpoint", &redact(&self.api_endpoint))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

// =============================================================================
// STATE + POLICY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Form visible, panel blocked.
    Open,
    /// Form hidden, panel usable.
    Closed,
}

/// Gate behavior when the backend rejects or never receives a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitFailure {
    /// Stay `Open` so the operator can retry.
    #[default]
    KeepOpen,
    /// Close anyway.
    Close,
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("credentials incomplete: missing {}", join_labels(.missing))]
    Incomplete { missing: Vec<CredentialField> },

    #[error("credential serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("credential submission failed: {0}")]
    Submit(#[from] TransportError),
}

fn join_labels(fields: &[CredentialField]) -> String {
    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
}

// =============================================================================
// GATE
// =============================================================================

pub struct CredentialGate {
    transport: Arc<dyn Transport>,
    credentials: CredentialSet,
    state: GateState,
    submit_failure: SubmitFailure,
}

impl CredentialGate {
    /// A fresh gate: `Open`, every field empty.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, submit_failure: SubmitFailure) -> Self {
        Self { transport, credentials: CredentialSet::default(), state: GateState::Open, submit_failure }
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == GateState::Open
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    /// Assign one field. Any empty field afterwards forces the gate `Open`,
    /// even if it already was; a complete set never closes it by itself.
    pub fn update(&mut self, field: CredentialField, value: impl Into<String>) {
        self.credentials.set(field, value.into());
        if !self.credentials.is_complete() {
            self.state = GateState::Open;
        }
    }

    /// Operator-initiated open (the settings button).
    pub fn reopen(&mut self) {
        self.state = GateState::Open;
    }

    /// Dismiss the form without submitting anything.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Incomplete`] and stays `Open` if any field is empty.
    pub fn request_close(&mut self) -> Result<(), GateError> {
        self.ensure_complete()?;
        self.state = GateState::Closed;
        Ok(())
    }

    /// Submit the credential set once and close the gate.
    ///
    /// # Errors
    ///
    /// - [`GateError::Incomplete`] if any field is empty; nothing is submitted.
    /// - [`GateError::Submit`] if the transport fails. The gate stays `Open`
    ///   under [`SubmitFailure::KeepOpen`] and closes under [`SubmitFailure::Close`].
    pub async fn confirm(&mut self) -> Result<(), GateError> {
        self.ensure_complete()?;
        let body = serde_json::to_string(&self.credentials.to_payload())?;

        match self.transport.submit_credentials(body).await {
            Ok(()) => {
                info!("credentials submitted; gate closed");
                self.state = GateState::Closed;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, policy = ?self.submit_failure, "credential submission failed");
                if self.submit_failure == SubmitFailure::Close {
                    self.state = GateState::Closed;
                }
                Err(GateError::Submit(e))
            }
        }
    }

    fn ensure_complete(&self) -> Result<(), GateError> {
        let missing = self.credentials.missing();
        if missing.is_empty() { Ok(()) } else { Err(GateError::Incomplete { missing }) }
    }
}
