//! Transport failure classification.

use std::sync::OnceLock;

use agent_contract::TransportFailure;
use regex::Regex;

/// Marker carried by every synthetic error message in the transcript.
pub const ERROR_MARKER: &str = "⚠️";

/// User-facing category of a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    RateLimited,
    ServerError,
    Timeout,
    NetworkError,
    Unknown,
}

impl ErrorKind {
    /// Maps a transport failure onto the error taxonomy.
    ///
    /// HTTP status wins over everything else. Failures without a status are
    /// classified by their kind, and free-form failures by their text.
    pub fn classify(failure: &TransportFailure) -> Self {
        match failure {
            TransportFailure::Status { status: 429, .. } => Self::RateLimited,
            TransportFailure::Status { status, .. } if *status >= 500 => Self::ServerError,
            TransportFailure::Status { .. } => Self::Unknown,
            TransportFailure::Timeout => Self::Timeout,
            TransportFailure::Connect(_) => Self::NetworkError,
            TransportFailure::Other(message) => Self::classify_message(message),
        }
    }

    fn classify_message(message: &str) -> Self {
        if timeout_regex().is_match(message) {
            Self::Timeout
        } else if network_regex().is_match(message) {
            Self::NetworkError
        } else {
            Self::Unknown
        }
    }

    /// Fixed transcript text for this error, prefixed with [`ERROR_MARKER`].
    pub fn user_message(self) -> &'static str {
        match self {
            Self::RateLimited => "⚠️ Too many requests, please wait a moment and try again",
            Self::ServerError => "⚠️ Server error, please try again later",
            Self::Timeout => "⚠️ Request timeout, please try again",
            Self::NetworkError => "⚠️ Network error, please check your connection",
            Self::Unknown => "⚠️ Something went wrong, try again",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::Timeout => "timeout",
            Self::NetworkError => "network_error",
            Self::Unknown => "unknown",
        }
    }
}

/// Returns true when `content` is a synthetic error message.
pub fn is_error_content(content: &str) -> bool {
    content.contains(ERROR_MARKER)
}

fn timeout_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)timed?.?out|econnaborted|deadline.?exceeded")
            .expect("timeout regex must compile")
    })
}

fn network_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)network.?error|connection.?(refused|reset|closed)|dns|unreachable")
            .expect("network regex must compile")
    })
}
