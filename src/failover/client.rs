//! HTTP lifecycle client.
//!
//! `POST {endpoint}/instances/{id}/{start|stop}?region=..&dry_run=..`
//! - 2xx: accepted (or, for a probe, would be accepted)
//! - 401/403: permission denied
//! - 400/409/412: rejected, instance not in the expected state

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::config::{InventoryConfig, LifecycleApiConfig};
use crate::failover::{LifecycleAction, LifecycleApi, LifecycleError};

/// Lifecycle API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpLifecycleApi {
    client: reqwest::Client,
    endpoint: String,
    region: String,
    api_token: String,
}

impl HttpLifecycleApi {
    /// Build a client; region and credentials are shared with the inventory.
    pub fn new(client: reqwest::Client, config: &LifecycleApiConfig, credentials: &InventoryConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            region: credentials.region.clone(),
            api_token: credentials.api_token.clone(),
        }
    }

    async fn call(&self, action: LifecycleAction, instance_id: &str, dry_run: bool) -> Result<(), LifecycleError> {
        let dry_run = if dry_run { "true" } else { "false" };
        let res = self
            .client
            .post(format!("{}/instances/{}/{}", self.endpoint, instance_id, action.as_str()))
            .bearer_auth(&self.api_token)
            .query(&[("region", self.region.as_str()), ("dry_run", dry_run)])
            .send()
            .await
            .map_err(|e| LifecycleError::Transport(e.to_string()))?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }

        let reason = res.text().await.unwrap_or_default();
        let reason = if reason.is_empty() { status.to_string() } else { reason };
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(LifecycleError::PermissionDenied {
                action,
                instance_id: instance_id.to_string(),
                reason,
            }),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                Err(LifecycleError::Rejected {
                    action,
                    instance_id: instance_id.to_string(),
                    reason,
                })
            }
            _ => Err(LifecycleError::Transport(format!("unexpected status {status}: {reason}"))),
        }
    }
}

#[async_trait]
impl LifecycleApi for HttpLifecycleApi {
    async fn probe(&self, action: LifecycleAction, instance_id: &str) -> Result<(), LifecycleError> {
        self.call(action, instance_id, true).await
    }

    async fn execute(&self, action: LifecycleAction, instance_id: &str) -> Result<(), LifecycleError> {
        self.call(action, instance_id, false).await
    }
}
