//! HTTP client for the ThingsBoard REST API.
//!
//! Two calls are needed: the tenant login exchange and the device RPC post.
//! The RPC call reports an explicit `RpcOutcome` instead of an error so the
//! relay can decide on the single re-authentication retry itself.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::Credential;
use crate::config::{ConfigError, RelayConfig};
use crate::models::{RpcPath, RpcRequest};

use super::RelayError;

/// ThingsBoard expects the JWT here instead of `Authorization`
const AUTH_HEADER: &str = "X-Authorization";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Result of a single RPC post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcOutcome {
    /// 2xx from ThingsBoard
    Delivered,
    /// 401: the credential is expired or invalid
    AuthExpired,
    /// Any other status, or the request never completed
    Failed(String),
}

/// ThingsBoard API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::InvalidBaseUrl(config.base_url.clone()))?;

        Ok(Self {
            client,
            base_url,
            timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange the tenant username/password for a JWT
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, RelayError> {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "auth", "login"]);
        }

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| RelayError::Authentication(format!("login request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Authentication(RelayError::describe_status(status, &body)));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Authentication(format!("invalid login response: {}", e)))?;

        Ok(Credential::new(login.token))
    }

    /// Post a `setControl` RPC to one device
    pub async fn send_rpc(
        &self,
        path: RpcPath,
        device_id: &str,
        credential: &Credential,
        request: &RpcRequest,
    ) -> RpcOutcome {
        let Some(url) = path.url(&self.base_url, device_id) else {
            return RpcOutcome::Failed(format!("cannot build RPC URL from {}", self.base_url));
        };
        debug!(device_id, path = path.as_str(), "Sending RPC");

        let response = match self
            .client
            .post(url.clone())
            .timeout(self.timeout)
            .header(AUTH_HEADER, credential.header_value())
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(device_id, path = path.as_str(), error = %e, "RPC request failed");
                return RpcOutcome::Failed(format!("request to {} failed: {}", url, e));
            }
        };

        let status = response.status();
        if status.is_success() {
            RpcOutcome::Delivered
        } else if status == StatusCode::UNAUTHORIZED {
            warn!(device_id, path = path.as_str(), "RPC rejected with 401");
            RpcOutcome::AuthExpired
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(device_id, path = path.as_str(), status = status.as_u16(), "RPC failed");
            RpcOutcome::Failed(RelayError::describe_status(status, &body))
        }
    }
}
