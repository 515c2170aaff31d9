//! Device management API client.
//!
//! Thin wrapper over the device REST API: token auth, JSON, one GET per
//! table. Pagination parameters follow the device's `limit`/`skip`
//! convention; responses arrive as a `results` array envelope.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::record::PolicyRecord;

/// Device API failures. All are fatal at fetch time, before the
/// pipeline starts.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("malformed response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Token-authenticated device API client.
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    vdom: Option<String>,
}

impl DeviceClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            vdom: config.vdom.clone(),
        })
    }

    /// Fetch all firewall policy records.
    pub async fn fetch_policies(&self) -> Result<Vec<PolicyRecord>, ClientError> {
        let payload = self.get("/cmdb/firewall/policy").await?;
        Ok(extract_records(&payload))
    }

    async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);

        debug!(%url, "fetching");

        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("limit", "1000"), ("skip", "0")]);
        if let Some(vdom) = &self.vdom {
            request = request.query(&[("vdom", vdom.as_str())]);
        }

        let response = request.send().await.map_err(|source| ClientError::Request {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { status, url });
        }

        response
            .json()
            .await
            .map_err(|source| ClientError::Body { url, source })
    }
}

/// Pull typed records out of the device response envelope. Records that
/// fail to deserialize are a device-side data issue: logged and skipped,
/// never fatal to the batch.
fn extract_records(payload: &Value) -> Vec<PolicyRecord> {
    let results = match payload.get("results").or_else(|| payload.get("result")) {
        Some(Value::Array(items)) => items.as_slice(),
        Some(single @ Value::Object(_)) => std::slice::from_ref(single),
        _ => return Vec::new(),
    };

    let mut records = Vec::with_capacity(results.len());
    for item in results {
        match serde_json::from_value::<PolicyRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(err) => warn!(error = %err, "skipping undeserializable policy record"),
        }
    }
    records
}
