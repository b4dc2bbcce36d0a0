use reqwest::Url;
use serde::{Deserialize, Serialize};

/// RPC method name understood by the device firmware
pub const RPC_METHOD: &str = "setControl";

/// How long ThingsBoard waits for the device to acknowledge, in milliseconds.
/// Carried in the payload for the platform; the relay never waits on it.
pub const DEVICE_ACK_TIMEOUT_MS: u64 = 5000;

/// Delivery attempts ThingsBoard makes towards the device.
/// Carried in the payload; the relay itself does not retry on this count.
pub const DEVICE_RETRIES: u32 = 5;

/// Convert the requested light state into the signal the device expects.
///
/// The flag is inverted: "on" is transmitted as `false`. This has not been
/// confirmed against the device firmware. Check the firmware before changing
/// it, since the physical light follows whatever the board expects.
pub fn to_device_signal(light_on: bool) -> bool {
    !light_on
}

/// A single control request towards one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlCommand {
    pub device_id: Option<String>,
    pub light_on: bool,
    pub water_plant: bool,
}

impl ControlCommand {
    pub fn new(device_id: Option<&str>, light_on: bool, water_plant: bool) -> Self {
        Self {
            device_id: device_id.map(str::to_string),
            light_on,
            water_plant,
        }
    }

    /// Build the wire body, applying the device signal conversion
    pub fn to_rpc_request(&self) -> RpcRequest {
        RpcRequest {
            method: RPC_METHOD.to_string(),
            params: RpcParams {
                light_on: to_device_signal(self.light_on),
                water_plant: self.water_plant,
            },
            timeout: DEVICE_ACK_TIMEOUT_MS,
            retries: DEVICE_RETRIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcParams {
    pub light_on: bool,
    pub water_plant: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: String,
    pub params: RpcParams,
    pub timeout: u64,
    pub retries: u32,
}

/// Which ThingsBoard RPC endpoint carried a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcPath {
    /// `/api/plugins/rpc/oneway/{device}`, used for the first attempt
    Oneway,
    /// `/api/rpc/twoway/{device}`, used for the retry after re-authentication
    Twoway,
}

impl RpcPath {
    fn segments(&self) -> &'static [&'static str] {
        match self {
            RpcPath::Oneway => &["api", "plugins", "rpc", "oneway"],
            RpcPath::Twoway => &["api", "rpc", "twoway"],
        }
    }

    /// Endpoint for `device_id` below `base`. The id is pushed as one
    /// percent-encoded path segment.
    pub fn url(&self, base: &Url, device_id: &str) -> Option<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(self.segments())
            .push(device_id);
        Some(url)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RpcPath::Oneway => "oneway",
            RpcPath::Twoway => "twoway",
        }
    }
}

/// Confirmation of a delivered command.
///
/// `light_on` and `water_plant` are the values that went over the wire,
/// i.e. after `to_device_signal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub status: String,
    pub light_on: bool,
    pub water_plant: bool,
    pub device_id: String,
    pub path: RpcPath,
}

impl CommandResult {
    pub fn delivered(device_id: &str, params: &RpcParams, path: RpcPath) -> Self {
        Self {
            status: "ok".to_string(),
            light_on: params.light_on,
            water_plant: params.water_plant,
            device_id: device_id.to_string(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_device_signal_inverts_light() {
        assert!(!to_device_signal(true));
        assert!(to_device_signal(false));
    }

    #[test]
    fn test_rpc_request_wire_format() {
        let command = ControlCommand::new(Some("dev-123"), true, false);
        let body = serde_json::to_value(command.to_rpc_request()).unwrap();
        assert_eq!(
            body,
            json!({
                "method": "setControl",
                "params": {"light_on": false, "water_plant": false},
                "timeout": 5000,
                "retries": 5
            })
        );
    }

    #[test]
    fn test_water_flag_passes_through() {
        let request = ControlCommand::new(None, false, true).to_rpc_request();
        assert!(request.params.light_on);
        assert!(request.params.water_plant);
    }

    #[test]
    fn test_rpc_path_urls() {
        let base = Url::parse("http://tb:8080").unwrap();
        assert_eq!(
            RpcPath::Oneway.url(&base, "dev-1").unwrap().as_str(),
            "http://tb:8080/api/plugins/rpc/oneway/dev-1"
        );
        assert_eq!(
            RpcPath::Twoway.url(&base, "dev-1").unwrap().as_str(),
            "http://tb:8080/api/rpc/twoway/dev-1"
        );
    }

    #[test]
    fn test_rpc_path_keeps_base_prefix_and_encodes_id() {
        let base = Url::parse("https://iot.example.com/thingsboard").unwrap();
        assert_eq!(
            RpcPath::Oneway.url(&base, "greenhouse 1").unwrap().as_str(),
            "https://iot.example.com/thingsboard/api/plugins/rpc/oneway/greenhouse%201"
        );
    }

    #[test]
    fn test_command_result_json() {
        let params = RpcParams {
            light_on: false,
            water_plant: false,
        };
        let result = CommandResult::delivered("dev-123", &params, RpcPath::Oneway);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["light_on"], false);
        assert_eq!(value["water_plant"], false);
        assert_eq!(value["path"], "oneway");
    }
}
