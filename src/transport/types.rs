//! Wire types for the backend's `/messages` and `/credentials` endpoints.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

/// Response body of `GET /messages`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

/// One stored message row. The backend includes its autoincrement `id`;
/// `username` is `null` for messages written by the bot itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Request body of `POST /credentials`. Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsPayload {
    pub token: String,
    pub allowed_ids: String,
    pub openai_endpoint: String,
    pub openai_api_key: String,
}
