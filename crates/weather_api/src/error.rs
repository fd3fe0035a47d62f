use std::fmt;

use agent_contract::TransportFailure;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum WeatherApiError {
    InvalidBaseUrl(String),
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    Runtime(String),
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<ErrorField>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Text(String),
    Object { message: Option<String> },
}

impl WeatherApiError {
    /// Maps this error onto the transport-agnostic failure taxonomy.
    pub fn to_transport_failure(&self) -> TransportFailure {
        match self {
            Self::Request(error) if error.is_timeout() => TransportFailure::Timeout,
            Self::Request(error) if error.is_connect() => {
                TransportFailure::Connect(error.to_string())
            }
            Self::Request(error) => match error.status() {
                Some(status) => TransportFailure::Status {
                    status: status.as_u16(),
                    message: error.to_string(),
                },
                None => TransportFailure::Other(error.to_string()),
            },
            Self::Status(status, message) => TransportFailure::Status {
                status: status.as_u16(),
                message: message.clone(),
            },
            other => TransportFailure::Other(other.to_string()),
        }
    }
}

impl fmt::Display for WeatherApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::Runtime(message) => write!(f, "runtime error: {message}"),
        }
    }
}

impl std::error::Error for WeatherApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WeatherApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for WeatherApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Extracts a readable message from an error response body.
///
/// Accepts `{"error":{"message":..}}`, `{"error":".."}` and `{"message":..}`,
/// falling back to the raw body and then the status reason phrase.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.trim().to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) else {
        return fallback();
    };

    let from_error = match parsed.error {
        Some(ErrorField::Text(text)) => Some(text),
        Some(ErrorField::Object { message }) => message,
        None => None,
    };

    from_error
        .or(parsed.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(fallback)
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::{parse_error_message, WeatherApiError};
    use agent_contract::TransportFailure;

    #[test]
    fn parse_error_message_prefers_structured_fields() {
        assert_eq!(
            parse_error_message(
                StatusCode::TOO_MANY_REQUESTS,
                r#"{"error":{"message":"slow down"}}"#
            ),
            "slow down"
        );
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, r#"{"error":"bad thread"}"#),
            "bad thread"
        );
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, r#"{"message":"nope"}"#),
            "nope"
        );
    }

    #[test]
    fn parse_error_message_falls_back_to_body_then_reason() {
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            parse_error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
        assert_eq!(
            parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, "{}"),
            "{}"
        );
    }

    #[test]
    fn status_errors_map_to_status_failures() {
        let error = WeatherApiError::Status(StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert_eq!(
            error.to_transport_failure(),
            TransportFailure::Status {
                status: 429,
                message: "slow down".to_string(),
            }
        );
        assert_eq!(
            WeatherApiError::Runtime("boom".into()).to_transport_failure(),
            TransportFailure::Other("runtime error: boom".to_string())
        );
    }
}
