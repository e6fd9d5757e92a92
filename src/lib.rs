//! # heydocker-panel
//!
//! Operator panel for the HeyDocker extension backend. It polls the
//! backend's chat log once a second and shows it in reverse of the
//! backend's stored order, with the view kept on the end of the list, and it
//! refuses to become usable until the operator has entered the bot token,
//! allowed IDs, `OpenAI` endpoint, and `OpenAI` API key, which are then
//! forwarded to the backend.
//!
//! The host supplies a [`transport::Transport`] and owns the mount/unmount
//! lifecycle through [`panel::Panel`].

pub mod cli;
pub mod config;
pub mod feed;
pub mod gate;
pub mod input;
pub mod panel;
pub mod render;
pub mod transport;
