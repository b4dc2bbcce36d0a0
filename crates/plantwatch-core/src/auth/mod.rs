//! Authentication module for the relay's ThingsBoard credential.
//!
//! This module provides:
//! - `Credential`: the bearer token obtained from the login exchange
//! - `CredentialStore`: the single cached credential with serialized refresh
//!
//! Tokens carry a server-defined expiry that the relay never inspects. A
//! credential is dropped only after a call reports it as unauthorized.

pub mod credential;
pub mod store;

pub use credential::Credential;
pub use store::CredentialStore;
