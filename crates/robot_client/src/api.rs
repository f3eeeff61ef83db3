use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use console_logging::console_debug;

use crate::{ApiError, NewTarget, RunSettings, StatusRecord, TargetRecord};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Backend root, e.g. `http://localhost:8001`. `/api` and `/ws/logs` hang off it.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// The worker's request/response control surface.
#[async_trait::async_trait]
pub trait ControlApi: Send + Sync {
    async fn list_targets(&self) -> Result<Vec<TargetRecord>, ApiError>;
    async fn create_target(&self, target: &NewTarget) -> Result<TargetRecord, ApiError>;
    async fn delete_target(&self, id: &str) -> Result<(), ApiError>;
    async fn status(&self) -> Result<StatusRecord, ApiError>;
    async fn start(&self, settings: &RunSettings) -> Result<(), ApiError>;
    async fn stop(&self) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestControlApi {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestControlApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let base = parse_base_url(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                detail: error_detail(status, &body),
            });
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        console_debug!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        decode_body(&body)
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        payload: Option<&B>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(segments)?;
        console_debug!("POST {}", url);
        let mut request = self.client.post(url);
        if let Some(payload) = payload {
            let bytes =
                serde_json::to_vec(payload).map_err(|err| ApiError::Decode(err.to_string()))?;
            request = request.header(CONTENT_TYPE, "application/json").body(bytes);
        }
        self.send(request).await
    }
}

#[async_trait::async_trait]
impl ControlApi for ReqwestControlApi {
    async fn list_targets(&self) -> Result<Vec<TargetRecord>, ApiError> {
        self.get_json(&["robot", "targets"]).await
    }

    async fn create_target(&self, target: &NewTarget) -> Result<TargetRecord, ApiError> {
        let body = self.post_json(&["robot", "targets"], Some(target)).await?;
        decode_body(&body)
    }

    async fn delete_target(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["robot", "targets", id])?;
        console_debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await.map(|_| ())
    }

    async fn status(&self) -> Result<StatusRecord, ApiError> {
        self.get_json(&["robot", "status"]).await
    }

    async fn start(&self, settings: &RunSettings) -> Result<(), ApiError> {
        self.post_json(&["robot", "start"], Some(settings))
            .await
            .map(|_| ())
    }

    async fn stop(&self) -> Result<(), ApiError> {
        self.post_json::<()>(&["robot", "stop"], None)
            .await
            .map(|_| ())
    }
}

/// Stream endpoint derived from the backend root: `http` becomes `ws`, `https` becomes `wss`.
pub fn stream_url(base_url: &str) -> Result<Url, ApiError> {
    let mut url = parse_base_url(base_url)?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(["ws", "logs"]);
    Ok(url)
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim()).map_err(|err| ApiError::InvalidUrl(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl(format!(
            "{raw}: expected http or https"
        )));
    }
    Ok(url)
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Decode(err.to_string()))
}

/// Error bodies carry `{"detail": ...}`; validation failures put a list there.
fn error_detail(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());
    match detail {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(err.to_string());
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
