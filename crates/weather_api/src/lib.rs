//! HTTP transport for the remote weather agent.
//!
//! This crate owns endpoint resolution, request headers, the JSON request
//! payload, and reading the (possibly streamed) response body. It performs no
//! response normalization and no retries: the body is handed back verbatim as
//! an [`agent_contract::ResponseBody`].

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod transport;
pub mod url;

pub use client::WeatherApiClient;
pub use config::WeatherApiConfig;
pub use error::WeatherApiError;
pub use payload::{StreamMessage, StreamRequest};
pub use transport::{HttpTransport, HTTP_TRANSPORT_ID};
pub use url::{normalize_stream_url, DEFAULT_AGENT_ID, DEFAULT_BASE_URL};
