//! Control plane client
//!
//! Combines the provider configuration with the HTTP layer. Constructed once
//! and borrowed by every gateway and controller.

use super::gateway::{KeyGateway, ModelGateway};
use super::http::HttpClient;
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use reqwest::{Method, Response};
use serde::Serialize;

/// Main control plane client
#[derive(Clone, Debug)]
pub struct ApiClient {
    config: ProviderConfig,
    http: HttpClient,
}

impl ApiClient {
    /// Create a new client for the configured endpoint
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http = HttpClient::new(config.timeout())?;
        tracing::info!("Using control plane at {}", config.endpoint());
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Issue one authenticated request against `endpoint + path`.
    ///
    /// The response is returned undecoded; this layer knows nothing about
    /// entity schemas.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let body = body
            .map(|b| serde_json::to_vec(b).map_err(Error::Encode))
            .transpose()?;

        self.http
            .send(method, &self.url(path), self.config.api_key(), body)
            .await
    }

    /// Build a full URL from an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint(), path)
    }

    /// Gateway for `/api/models`
    pub fn models(&self) -> ModelGateway<'_> {
        ModelGateway::new(self)
    }

    /// Gateway for `/api/keys`
    pub fn keys(&self) -> KeyGateway<'_> {
        KeyGateway::new(self)
    }
}

// =========================================================================
// Path helpers
// =========================================================================

/// Collection path for an entity kind, e.g. `/api/models`
pub fn collection_path(kind: &str) -> String {
    format!("/api/{}s", kind)
}

/// Item path for an entity kind, the id encoded as one path segment
pub fn item_path(kind: &str, id: &str) -> String {
    format!("{}/{}", collection_path(kind), urlencoding::encode(id))
}
