//! Shared HTTP transport for explorer connectors

use crate::errors::{ConnectorError, ConnectorResult};
use crate::registry::ProviderKind;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// One `reqwest` client per connector, bound to the provider for error tagging
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    provider: ProviderKind,
}

impl HttpTransport {
    pub fn new(provider: ProviderKind, timeout_seconds: u64) -> ConnectorResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| {
                ConnectorError::network(provider, format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, provider })
    }

    /// GET a JSON document
    ///
    /// 404 maps to `NotFound`, any other non-2xx status or transport failure
    /// to `Network`, and a 2xx body that is not JSON to `MalformedResponse`.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
        txid: &str,
    ) -> ConnectorResult<Value> {
        debug!("{}: GET {}", self.provider, url);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ConnectorError::NotFound {
                provider: self.provider,
                txid: txid.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ConnectorError::network(
                self.provider,
                format!("HTTP {} from {}", status, url),
            ));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| {
            ConnectorError::malformed(self.provider, format!("response is not JSON: {}", e))
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ConnectorError {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        };
        ConnectorError::network(self.provider, message)
    }
}
