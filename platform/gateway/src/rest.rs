use std::{marker::PhantomData, time::Duration};

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::{GatewayError, GatewayResult, Payload, RecordGateway, RecordId};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Per-request timeout. `None` lets a hung request wait forever.
    pub timeout: Option<Duration>,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// REST client for one resource collection: `GET|POST base`, `GET|PUT|DELETE base/{id}`.
#[derive(Clone, Debug)]
pub struct RestGateway<T> {
    client: Client,
    base: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> RestGateway<T> {
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        let url = Url::parse(config.base_url.trim()).map_err(|err| {
            GatewayError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: err.to_string(),
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: url.as_str().trim_end_matches('/').to_string(),
            _record: PhantomData,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn item_url(&self, id: RecordId) -> String {
        format!("{}/{}", self.base, id)
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        method: &'static str,
        url: &str,
        id: Option<RecordId>,
    ) -> GatewayResult<String> {
        let request_id = Uuid::new_v4();
        let span = info_span!("gateway_request", method, url, %request_id);
        async move {
            let response = request
                .header(REQUEST_ID_HEADER, request_id.to_string())
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
                warn!("record not found");
                return Err(GatewayError::NotFound { id });
            }
            if !status.is_success() {
                warn!(status = status.as_u16(), "backend rejected request");
                return Err(GatewayError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            debug!(status = status.as_u16(), "backend responded");
            Ok(body)
        }
        .instrument(span)
        .await
    }
}

/// Empty bodies become `Null`; non-JSON bodies are kept as a string.
fn payload(body: &str) -> Payload {
    if body.trim().is_empty() {
        return Payload::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Payload::String(body.to_string()))
}

impl<T> RecordGateway<T> for RestGateway<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn list(&self) -> GatewayResult<Vec<T>> {
        let body = self
            .execute(self.client.get(&self.base), "GET", &self.base, None)
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create(&self, record: &T) -> GatewayResult<Payload> {
        let request = self.client.post(&self.base).json(record);
        let body = self.execute(request, "POST", &self.base, None).await?;
        Ok(payload(&body))
    }

    async fn get_by_id(&self, id: RecordId) -> GatewayResult<T> {
        let url = self.item_url(id);
        let body = self
            .execute(self.client.get(&url), "GET", &url, Some(id))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn update(&self, id: RecordId, record: &T) -> GatewayResult<Payload> {
        let url = self.item_url(id);
        let request = self.client.put(&url).json(record);
        let body = self.execute(request, "PUT", &url, Some(id)).await?;
        Ok(payload(&body))
    }

    async fn delete(&self, id: RecordId) -> GatewayResult<Payload> {
        let url = self.item_url(id);
        let body = self
            .execute(self.client.delete(&url), "DELETE", &url, Some(id))
            .await?;
        Ok(payload(&body))
    }
}
