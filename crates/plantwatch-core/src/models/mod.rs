//! Data models for the device control relay.
//!
//! - `ControlCommand`, `CommandResult`: one relay invocation and its outcome
//! - `RpcRequest`, `RpcParams`: the ThingsBoard `setControl` wire body
//! - `ControlIntent`: the user-facing light/water actions

pub mod command;
pub mod intent;

pub use command::{
    to_device_signal, CommandResult, ControlCommand, RpcParams, RpcPath, RpcRequest,
    DEVICE_ACK_TIMEOUT_MS, DEVICE_RETRIES, RPC_METHOD,
};
pub use intent::{ControlIntent, ParseIntentError};
