//! Client-side chat session engine for a remote conversational weather agent.
//!
//! Invariant: the transcript is only mutated through [`ChatSession`]; every
//! mutation is persisted before the call returns.
//!
//! # Public API Overview
//! - Drive a conversation with [`ChatSession`], issuing requests through a [`SendHost`].
//! - Turn raw agent responses into display text with [`normalize_response`].
//! - Map transport failures to user-facing notices with [`ErrorKind`].
//! - Render or write transcripts with [`export_transcript`] and [`write_export`].
//! - Install diagnostics with [`init_logging`] and [`EnvConfig`].

pub mod classify;
pub mod config;
pub mod export;
pub mod logging;
pub mod normalize;
pub mod search;
pub mod session;

/// Failure classification.
pub use crate::classify::{is_error_content, ErrorKind, ERROR_MARKER};

/// Environment configuration.
pub use crate::config::EnvConfig;

/// Transcript export.
pub use crate::export::{
    current_local_offset, export_file_name, export_transcript, format_local_timestamp,
    write_export, EXPORT_FILE_PREFIX,
};

/// Logging setup.
pub use crate::logging::{init_logging, DEFAULT_LOG_FILTER};

/// Response normalization.
pub use crate::normalize::{
    clean_text, normalize_response, normalize_text, FALLBACK_REPLY, MIN_REPLY_CHARS,
};

/// Transcript search.
pub use crate::search::search_messages;

/// Session engine.
pub use crate::session::{
    agent_reply_quick_replies, welcome_quick_replies, ChatSession, Mode, SendHost,
    UNPROCESSABLE_REPLY, WELCOME_TEXT,
};
