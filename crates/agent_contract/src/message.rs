use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Author of one conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }

    /// Capitalized label used in exported transcripts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Agent => "Agent",
        }
    }
}

/// Delivery progress of a user message.
///
/// `Sent` is set when the message is handed to the transport, `Delivered`
/// once the agent answered successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
}

/// Suggested next user utterance attached to an agent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl QuickReply {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            value: value.map(str::to_string),
        }
    }
}

/// One turn of the transcript, in its persisted JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReply>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
}

impl Message {
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    #[must_use]
    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }

    /// Returns quick replies, or an empty slice when none are attached.
    #[must_use]
    pub fn quick_replies(&self) -> &[QuickReply] {
        self.quick_replies.as_deref().unwrap_or(&[])
    }
}
