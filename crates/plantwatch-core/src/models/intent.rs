use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::ControlCommand;

/// A user-facing control action for a plant's device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlIntent {
    /// Switch the grow light on or off
    Light { on: bool },
    /// Run the water pump once
    Water,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized control '{0}': expected 'light on', 'light off' or 'water'")]
pub struct ParseIntentError(pub String);

impl ControlIntent {
    pub fn to_command(self, device_id: Option<&str>) -> ControlCommand {
        match self {
            ControlIntent::Light { on } => ControlCommand::new(device_id, on, false),
            ControlIntent::Water => ControlCommand::new(device_id, false, true),
        }
    }
}

impl FromStr for ControlIntent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<String> = s.split_whitespace().map(str::to_lowercase).collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        match words.as_slice() {
            ["light", "on"] => Ok(ControlIntent::Light { on: true }),
            ["light", "off"] => Ok(ControlIntent::Light { on: false }),
            ["water"] => Ok(ControlIntent::Water),
            _ => Err(ParseIntentError(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ControlIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlIntent::Light { on: true } => write!(f, "light on"),
            ControlIntent::Light { on: false } => write!(f, "light off"),
            ControlIntent::Water => write!(f, "water"),
        }
    }
}
