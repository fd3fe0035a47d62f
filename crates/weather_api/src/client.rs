use agent_contract::ResponseBody;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::WeatherApiConfig;
use crate::error::{parse_error_message, WeatherApiError};
use crate::headers::build_headers;
use crate::payload::StreamRequest;
use crate::url::normalize_stream_url;

#[derive(Debug)]
pub struct WeatherApiClient {
    http: Client,
    config: WeatherApiConfig,
}

impl WeatherApiClient {
    pub fn new(config: WeatherApiConfig) -> Result<Self, WeatherApiError> {
        let endpoint = normalize_stream_url(&config.base_url, &config.agent_id);
        let parsed = Url::parse(&endpoint)
            .map_err(|error| WeatherApiError::InvalidBaseUrl(format!("{endpoint}: {error}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WeatherApiError::InvalidBaseUrl(format!(
                "{endpoint}: scheme must be http or https"
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(WeatherApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &WeatherApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_stream_url(&self.config.base_url, &self.config.agent_id)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, WeatherApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config) {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| WeatherApiError::InvalidHeader(format!("invalid key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    WeatherApiError::InvalidHeader(format!("invalid value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    /// Payload for one user message on `thread_id`, using this client's defaults.
    pub fn request_for(&self, thread_id: &str, content: &str) -> StreamRequest {
        StreamRequest::user_message(&self.config, thread_id, content)
    }

    pub fn build_request(
        &self,
        request: &StreamRequest,
    ) -> Result<reqwest::RequestBuilder, WeatherApiError> {
        let headers = self.build_headers()?;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(request))
    }

    /// Sends one request and reads the complete body.
    ///
    /// Streamed bodies are concatenated chunk by chunk; non-success statuses
    /// become [`WeatherApiError::Status`] with a parsed message.
    pub async fn send(&self, request: &StreamRequest) -> Result<String, WeatherApiError> {
        let response = self.build_request(request)?.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_error_message(status, &body);
            return Err(WeatherApiError::Status(status, message));
        }

        let mut bytes = response.bytes_stream();
        let mut body = Vec::new();
        let mut chunks = 0usize;
        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            chunks += 1;
            body.extend_from_slice(&chunk);
        }
        debug!(
            status = status.as_u16(),
            chunks,
            bytes = body.len(),
            "agent response body read"
        );

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Sends one request and classifies the body as JSON, text, or empty.
    pub async fn send_body(&self, request: &StreamRequest) -> Result<ResponseBody, WeatherApiError> {
        self.send(request).await.map(ResponseBody::from_text)
    }
}
