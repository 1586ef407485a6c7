//! JSON:API backend over HTTP.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;

use super::{ApiError, Backend, Document, Resource};
use crate::config::ApiConfig;
use crate::constants::JSON_API_CONTENT_TYPE;
use crate::entities::{EntityId, EntityKind};

/// HTTP implementation of [`Backend`].
///
/// Session cookies set by the server are kept in the client's cookie store;
/// logging in is handled elsewhere.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.type_name())
    }

    pub fn member_url(&self, kind: EntityKind, id: &EntityId) -> String {
        format!("{}/{}/{}", self.base_url, kind.type_name(), id)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .header(ACCEPT, JSON_API_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url());
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(url),
            StatusCode::NOT_FOUND => ApiError::NotFound(url),
            _ => ApiError::Status {
                status: status.as_u16(),
                body,
            },
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let document: Document<T> = response.json().await.map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(document.data)
    }

    fn with_body(request: RequestBuilder, resource: Resource) -> Result<RequestBuilder, ApiError> {
        let body = serde_json::to_vec(&Document { data: resource }).map_err(|e| ApiError::InvalidResource(e.to_string()))?;
        Ok(request.header(CONTENT_TYPE, JSON_API_CONTENT_TYPE).body(body))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Resource>, ApiError> {
        let response = self.send(self.client.get(self.collection_url(kind))).await?;
        Self::decode(response).await
    }

    async fn create(&self, kind: EntityKind, resource: Resource) -> Result<Resource, ApiError> {
        let request = Self::with_body(self.client.post(self.collection_url(kind)), resource)?;
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn update(&self, kind: EntityKind, id: &EntityId, resource: Resource) -> Result<Resource, ApiError> {
        let request = Self::with_body(self.client.patch(self.member_url(kind, id)), resource)?;
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), ApiError> {
        self.send(self.client.delete(self.member_url(kind, id))).await?;
        Ok(())
    }
}
