//! ThingsBoard REST client module.
//!
//! This module provides the `ApiClient` for the two ThingsBoard endpoints the
//! relay needs: tenant login and device RPC. ThingsBoard authenticates with a
//! JWT sent in the `X-Authorization` header rather than `Authorization`.

pub mod client;
pub mod error;

pub use client::{ApiClient, RpcOutcome};
pub use error::RelayError;
