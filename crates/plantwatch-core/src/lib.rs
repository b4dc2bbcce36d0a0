//! Core library for plantwatch.
//!
//! Relays light and watering commands from the plant monitor backend to a
//! device managed by ThingsBoard. The pieces are:
//!
//! - `config`: environment-sourced relay configuration
//! - `auth`: the injectable credential store with single-flight refresh
//! - `api`: the ThingsBoard HTTP client and the relay error taxonomy
//! - `models`: control commands, RPC wire types and control intents
//! - `relay`: the `DeviceRelay` tying the above together

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod relay;

pub use api::{ApiClient, RelayError, RpcOutcome};
pub use auth::{Credential, CredentialStore};
pub use config::{ConfigError, RelayConfig};
pub use models::{CommandResult, ControlCommand, ControlIntent, RpcPath};
pub use relay::DeviceRelay;
