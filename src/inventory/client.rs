//! HTTP inventory client.
//!
//! Expects `GET {endpoint}/instances?region=..&tag:{key}={value}` to return a
//! JSON array of `{ "id", "public_address", "state" }` objects.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::InventoryConfig;
use crate::inventory::{InstanceInventory, InstanceRecord, InventoryError, LifecycleState, TagSelector};

#[derive(Debug, Deserialize)]
struct RawInstance {
    id: String,
    #[serde(default)]
    public_address: Option<String>,
    state: LifecycleState,
}

/// Inventory backed by a JSON HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpInventory {
    client: reqwest::Client,
    endpoint: String,
    region: String,
    api_token: String,
}

impl HttpInventory {
    pub fn new(client: reqwest::Client, config: &InventoryConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            region: config.region.clone(),
            api_token: config.api_token.clone(),
        }
    }
}

#[async_trait]
impl InstanceInventory for HttpInventory {
    async fn list_instances(&self, selector: &TagSelector) -> Result<Vec<InstanceRecord>, InventoryError> {
        let tag_param = format!("tag:{}", selector.key);
        let res = self
            .client
            .get(format!("{}/instances", self.endpoint))
            .bearer_auth(&self.api_token)
            .query(&[("region", self.region.as_str()), (tag_param.as_str(), selector.value.as_str())])
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = res.text().await.unwrap_or_default();
            return Err(InventoryError::Unauthorized(format!("{status}: {body}")));
        }
        if !status.is_success() {
            return Err(InventoryError::Transport(format!("unexpected status {status}")));
        }

        let raw: Vec<RawInstance> = res
            .json()
            .await
            .map_err(|e| InventoryError::Transport(format!("malformed inventory response: {e}")))?;

        Ok(raw
            .into_iter()
            .map(|r| InstanceRecord::new(r.id, r.public_address, r.state))
            .collect())
    }
}
