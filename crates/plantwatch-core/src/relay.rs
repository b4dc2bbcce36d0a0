//! Device control relay.
//!
//! Forwards light and watering commands to a ThingsBoard-managed device.
//! The relay owns no global state: the credential lives in a
//! `CredentialStore` handed in at construction, so several relays (or tests)
//! can share or isolate credentials as needed.
//!
//! Credential lifecycle:
//!
//! ```text
//! NoCredential -> Authenticating -> Valid -> (401) -> NoCredential -> ...
//! ```
//!
//! A command makes at most two RPC posts. The first goes to the one-way
//! endpoint with the cached credential. Only a 401 leads to a second post,
//! sent to the two-way endpoint with a renewed credential. Commands are not
//! idempotent on the device side, so nothing else is retried.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, RelayError, RpcOutcome};
use crate::auth::{Credential, CredentialStore};
use crate::config::RelayConfig;
use crate::models::{CommandResult, ControlCommand, ControlIntent, RpcPath, RpcRequest};

/// Clone is cheap - the client, config and credential store are shared.
#[derive(Debug, Clone)]
pub struct DeviceRelay {
    config: Arc<RelayConfig>,
    client: ApiClient,
    credentials: Arc<CredentialStore>,
}

impl DeviceRelay {
    /// Create a relay with its own, empty credential store
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        Self::with_store(config, Arc::new(CredentialStore::new()))
    }

    /// Create a relay that uses an existing credential store
    pub fn with_store(config: RelayConfig, credentials: Arc<CredentialStore>) -> Result<Self, RelayError> {
        let client = ApiClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            credentials,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Log in with the configured service account and cache the new token,
    /// replacing any credential held before.
    pub async fn authenticate(&self) -> Result<Credential, RelayError> {
        self.config.service_credentials()?;
        self.credentials.refresh(|| self.login()).await
    }

    /// Drop the cached credential so the next command logs in again
    pub async fn invalidate_credential(&self) {
        if self.credentials.clear().await {
            info!("Cached ThingsBoard credential invalidated");
        }
    }

    /// Send one control command to `device_id`, or to the configured default
    /// device when `device_id` is empty.
    pub async fn send_command(
        &self,
        device_id: &str,
        light_on: bool,
        water_plant: bool,
    ) -> Result<CommandResult, RelayError> {
        self.send(&ControlCommand::new(Some(device_id), light_on, water_plant))
            .await
    }

    /// Translate a control intent into a command and send it
    pub async fn apply(&self, device_id: Option<&str>, intent: ControlIntent) -> Result<CommandResult, RelayError> {
        info!(intent = %intent, "Applying control intent");
        self.send(&intent.to_command(device_id)).await
    }

    pub async fn send(&self, command: &ControlCommand) -> Result<CommandResult, RelayError> {
        let target = self.config.resolve_target(command.device_id.as_deref())?;

        // Light flag is inverted here; see `to_device_signal`.
        let request = command.to_rpc_request();

        let credential = self.cached_or_login().await?;
        match self
            .client
            .send_rpc(RpcPath::Oneway, &target, &credential, &request)
            .await
        {
            RpcOutcome::Delivered => return Ok(self.delivered(&target, &request, RpcPath::Oneway)),
            RpcOutcome::Failed(reason) => return Err(RelayError::CommandDelivery(reason)),
            RpcOutcome::AuthExpired => {
                warn!(
                    device_id = %target,
                    credential_age_secs = credential.age().num_seconds(),
                    "Credential rejected, re-authenticating once"
                );
            }
        }

        let credential = self.renew(&credential).await?;
        match self
            .client
            .send_rpc(RpcPath::Twoway, &target, &credential, &request)
            .await
        {
            RpcOutcome::Delivered => Ok(self.delivered(&target, &request, RpcPath::Twoway)),
            RpcOutcome::Failed(reason) => Err(RelayError::CommandDelivery(reason)),
            RpcOutcome::AuthExpired => Err(RelayError::Authentication(format!(
                "device {} still unauthorized after re-authentication",
                target
            ))),
        }
    }

    fn delivered(&self, target: &str, request: &RpcRequest, path: RpcPath) -> CommandResult {
        info!(
            device_id = %target,
            path = path.as_str(),
            light_on = request.params.light_on,
            water_plant = request.params.water_plant,
            "Command delivered"
        );
        CommandResult::delivered(target, &request.params, path)
    }

    async fn cached_or_login(&self) -> Result<Credential, RelayError> {
        self.credentials.get_or_refresh(|| self.login()).await
    }

    async fn renew(&self, stale: &Credential) -> Result<Credential, RelayError> {
        self.credentials.renew(stale, || self.login()).await
    }

    /// Credentials are checked here, so a cached token works without them
    async fn login(&self) -> Result<Credential, RelayError> {
        let (username, password) = self.config.service_credentials()?;
        let credential = self.client.login(username, password).await?;
        info!(base_url = %self.client.base_url(), "Authenticated with ThingsBoard");
        Ok(credential)
    }
}
