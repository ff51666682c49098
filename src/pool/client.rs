//! HTTP pool client.
//!
//! Speaks the `accounts/{account}/load_balancers/pools/{pool}` resource with
//! a bearer token. Responses are wrapped in a `{ success, errors, result }`
//! envelope.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::PoolConfig;
use crate::pool::{PoolApi, PoolDefinition, PoolSyncError};

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

fn describe_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "unspecified API error".to_string();
    }
    errors
        .iter()
        .map(|e| match e.code {
            Some(code) => format!("{code}: {}", e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

async fn read_envelope<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, String> {
    let status = res.status();
    let envelope: Envelope<T> = res
        .json()
        .await
        .map_err(|e| format!("status {status}: malformed response: {e}"))?;

    if !envelope.success {
        return Err(describe_errors(&envelope.errors));
    }
    envelope.result.ok_or_else(|| "response carried no result".to_string())
}

/// Pool API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpPoolApi {
    client: reqwest::Client,
    endpoint: String,
    account_id: String,
    api_token: String,
}

impl HttpPoolApi {
    pub fn new(client: reqwest::Client, config: &PoolConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
            api_token: config.api_token.clone(),
        }
    }

    fn pool_url(&self, pool_id: &str) -> String {
        format!(
            "{}/accounts/{}/load_balancers/pools/{}",
            self.endpoint, self.account_id, pool_id
        )
    }
}

#[async_trait]
impl PoolApi for HttpPoolApi {
    async fn get_pool(&self, pool_id: &str) -> Result<PoolDefinition, PoolSyncError> {
        let read_err = |reason: String| PoolSyncError::Read {
            pool_id: pool_id.to_string(),
            reason,
        };

        let res = self
            .client
            .get(self.pool_url(pool_id))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| read_err(e.to_string()))?;

        read_envelope(res).await.map_err(read_err)
    }

    async fn put_pool(&self, pool_id: &str, pool: &PoolDefinition) -> Result<(), PoolSyncError> {
        let write_err = |reason: String| PoolSyncError::Write {
            pool_id: pool_id.to_string(),
            reason,
        };

        let res = self
            .client
            .put(self.pool_url(pool_id))
            .bearer_auth(&self.api_token)
            .json(pool)
            .send()
            .await
            .map_err(|e| write_err(e.to_string()))?;

        read_envelope::<serde_json::Value>(res).await.map_err(write_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_errors() {
        let errors = vec![
            ApiMessage {
                code: Some(1002),
                message: "pool not found".into(),
            },
            ApiMessage {
                code: None,
                message: "try again".into(),
            },
        ];
        assert_eq!(describe_errors(&errors), "1002: pool not found; try again");
        assert_eq!(describe_errors(&[]), "unspecified API error");
    }

    #[test]
    fn test_pool_definition_skips_absent_metadata() {
        let pool = PoolDefinition {
            name: "web".into(),
            description: None,
            enabled: None,
            minimum_origins: None,
            monitor: None,
            notification_email: None,
            origins: Vec::new(),
            extra: Default::default(),
        };
        let json = serde_json::to_value(&pool).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "web", "origins": [] }));
    }
}
