use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};
use airsight_core::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{header, Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Source of backend data for the dashboard panels.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch a resource and return the unwrapped `data` value.
    async fn get(&self, endpoint: &Endpoint) -> Result<Value>;

    /// Send free text to the sentiment tool and return the unwrapped result.
    async fn submit_sentiment(&self, text: &str) -> Result<Value>;
}

/// Decode an unwrapped payload into a typed model.
pub fn decode<T: DeserializeOwned>(endpoint: &Endpoint, data: Value) -> Result<T> {
    serde_json::from_value(data).map_err(|source| ClientError::Decode {
        path: endpoint.to_string(),
        source,
    })
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

/// Gateway backed by the review backend's HTTP API.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| ClientError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let client = builder.build().map_err(|e| ClientError::Configuration {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn unwrap_envelope(&self, endpoint: &Endpoint, response: Response) -> Result<Value> {
        let path = endpoint.to_string();
        let status = response.status();
        let body = response.text().await.map_err(|source| ClientError::Http {
            path: path.clone(),
            source,
        })?;

        if !status.is_success() {
            warn!(%path, status = status.as_u16(), "Backend returned an error status");
            return Err(ClientError::Status {
                path,
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| ClientError::Envelope {
                path: path.clone(),
                message: e.to_string(),
            })?;
        debug!(%path, bytes = body.len(), "Received response");
        Ok(envelope.data)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    #[instrument(skip(self), fields(path = %endpoint, request_id = %Uuid::new_v4()))]
    async fn get(&self, endpoint: &Endpoint) -> Result<Value> {
        let url = endpoint.url(&self.base_url)?;
        debug!(%url, "GET");
        let response = self
            .client
            .request(endpoint.method(), url)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                path: endpoint.to_string(),
                source,
            })?;
        self.unwrap_envelope(endpoint, response).await
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count(), request_id = %Uuid::new_v4()))]
    async fn submit_sentiment(&self, text: &str) -> Result<Value> {
        let endpoint = Endpoint::SentimentSubmit;
        let url = endpoint.url(&self.base_url)?;
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(&text)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                path: endpoint.to_string(),
                source,
            })?;
        self.unwrap_envelope(&endpoint, response).await
    }
}

/// Factory for creating gateways
pub struct GatewayFactory;

impl GatewayFactory {
    pub fn create(config: &ApiConfig) -> Result<Arc<dyn Gateway>> {
        Self::validate_config(config)?;
        info!(base_url = %config.base_url, "Creating HTTP gateway");
        Ok(Arc::new(HttpGateway::new(config)?))
    }

    pub fn validate_config(config: &ApiConfig) -> Result<()> {
        let base_url = config.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Configuration {
                message: "Base URL must start with http:// or https://".to_string(),
            });
        }
        if config.timeout_seconds == 0 {
            debug!("No request timeout configured");
        }
        Ok(())
    }
}
