//! InfluxDB 1.x metrics store.
//!
//! # Responsibilities
//! - Build the bucketed mean query for one host
//! - Execute it over the HTTP `/query` endpoint
//! - Return the non-empty bucket means in time order

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::MetricsConfig;
use crate::health::{LoadQuery, MetricsError, MetricsStore};
use crate::health::window::QueryWindow;

const DEFAULT_PORT: u16 = 8086;

/// Build the InfluxQL statement averaging the load field per bucket.
///
/// Empty buckets are omitted (`fill(none)`) so a silent host returns fewer
/// rows than there are buckets.
pub fn build_query(config: &MetricsConfig, host: &str, window: &QueryWindow) -> String {
    let host_pattern = escape_regex_literal(host);
    format!(
        "SELECT mean(\"{field}\") FROM \"{rp}\".\"{measurement}\" \
         WHERE (\"host\" =~ /^{host_pattern}$/) AND time >= {from}ms AND time <= {to}ms \
         GROUP BY time({width}ms) fill(none)",
        field = config.field,
        rp = config.retention_policy,
        measurement = config.measurement,
        from = window.from_ms,
        to = window.to_ms,
        width = window.bucket_width_ms,
    )
}

/// Escape `value` for use inside an InfluxQL `/.../` regex literal.
fn escape_regex_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '/') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Resolve the configured host into a base URL.
fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else if host.contains(':') {
        format!("http://{host}")
    } else {
        format!("http://{host}:{DEFAULT_PORT}")
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    series: Vec<Series>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn extract_means(response: QueryResponse) -> Result<Vec<f64>, MetricsError> {
    if let Some(error) = response.error {
        return Err(MetricsError::Query(error));
    }

    let mut means = Vec::new();
    for statement in response.results {
        if let Some(error) = statement.error {
            return Err(MetricsError::Query(error));
        }
        for series in statement.series {
            let column = series.columns.iter().position(|c| c == "mean").unwrap_or(1);
            means.extend(
                series
                    .values
                    .iter()
                    .filter_map(|row| row.get(column).and_then(Value::as_f64)),
            );
        }
    }
    Ok(means)
}

/// Metrics store speaking the InfluxDB 1.x HTTP API.
#[derive(Debug, Clone)]
pub struct InfluxClient {
    client: reqwest::Client,
    base_url: String,
    config: MetricsConfig,
}

impl InfluxClient {
    pub fn new(client: reqwest::Client, config: &MetricsConfig) -> Self {
        Self {
            client,
            base_url: base_url(&config.host),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl MetricsStore for InfluxClient {
    async fn bucket_means(&self, query: &LoadQuery) -> Result<Vec<f64>, MetricsError> {
        let statement = build_query(&self.config, &query.host, &query.window);
        tracing::debug!(query = %statement, "Querying load samples");

        let res = self
            .client
            .get(format!("{}/query", self.base_url))
            .query(&[
                ("db", self.config.database.as_str()),
                ("q", statement.as_str()),
                ("epoch", "ms"),
            ])
            .send()
            .await
            .map_err(|e| MetricsError::Transport(e.to_string()))?;

        let status = res.status();
        let body: QueryResponse = res
            .json()
            .await
            .map_err(|e| MetricsError::Transport(format!("status {status}: malformed response: {e}")))?;

        extract_means(body)
    }
}
