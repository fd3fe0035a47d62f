//! Transport-agnostic contract between the chat session engine and a remote
//! conversational agent.
//!
//! This crate defines the transcript data model, identifier generation, and
//! the single-request transport interface. It excludes HTTP details, response
//! normalization, and session orchestration.

mod ids;
mod message;

use std::fmt;

use serde_json::Value;

pub use ids::{new_thread_id, IdGenerator, MESSAGE_ID_PREFIX, THREAD_ID_PREFIX};
pub use message::{DeliveryStatus, Message, QuickReply, Role};

/// Identifier for one outbound request.
pub type RequestId = u64;

/// Input required to issue one request to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub request_id: RequestId,
    pub thread_id: String,
    pub content: String,
}

/// Raw response body as received from the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    /// Classifies a fully-read body: JSON when it parses, text otherwise.
    #[must_use]
    pub fn from_text(body: impl Into<String>) -> Self {
        let body = body.into();
        if body.trim().is_empty() {
            return Self::Empty;
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(body),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Json(_) => false,
        }
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Transport-level reason a request did not produce a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The agent answered with a non-success HTTP status.
    Status { status: u16, message: String },
    /// The client-side timeout expired.
    Timeout,
    /// The agent could not be reached.
    Connect(String),
    Other(String),
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Connect(message) => write!(f, "connection failed: {message}"),
            Self::Other(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for TransportFailure {}

/// Immutable metadata describing a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportProfile {
    pub transport_id: String,
    pub endpoint: String,
}

/// Transport interface for executing one agent request.
pub trait AgentTransport: Send + Sync + 'static {
    /// Returns transport identity metadata.
    fn profile(&self) -> TransportProfile;

    /// Sends one request and blocks until the full body or a failure is available.
    ///
    /// Implementations must not retry on their own.
    fn send(&self, request: AgentRequest) -> Result<ResponseBody, TransportFailure>;
}
