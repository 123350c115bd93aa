// reqwest-backed transport
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;

use super::{ApiFailure, Transport};
use crate::config::ClientConfig;
use crate::error::{Result, SonarError};

pub struct HttpTransport {
    base_address: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the configured timeout and headers.
    /// The token, when given, is sent as `Authorization: Token <token>`.
    pub fn new(config: &ClientConfig, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let accept = format!("application/json; version={}", config.api_version.trim());
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&accept).map_err(|e| SonarError::InvalidConfigValue {
                path: "client.api_version".to_string(),
                message: e.to_string(),
            })?,
        );
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Token {}", token.trim())).map_err(
                |e| SonarError::InvalidConfigValue {
                    path: "client.token_env".to_string(),
                    message: e.to_string(),
                },
            )?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        let mut base_address = config.base_address.trim().to_string();
        if !base_address.ends_with('/') {
            base_address.push('/');
        }

        Ok(Self {
            base_address,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_address, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> std::result::Result<Value, ApiFailure> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let resp = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!("Request timed out on {}", url);
                ApiFailure::timeout(&url)
            } else {
                ApiFailure::unknown(e.to_string())
            }
        })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiFailure::unknown(format!("Failed to read response body: {}", e)))?;

        if status == 401 {
            tracing::warn!("Unauthorized on {}", url);
        }
        if !(200..300).contains(&status) {
            return Err(ApiFailure::from_response(status, &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| ApiFailure::unknown(format!("Response is not valid JSON: {}", e)))
    }

    fn base_address(&self) -> &str {
        &self.base_address
    }
}
