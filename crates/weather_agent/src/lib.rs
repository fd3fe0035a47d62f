//! Line-oriented weather chat front end.
//!
//! ## Transport bootstrap
//!
//! `weather_agent` selects its transport from `WEATHER_CHAT_TRANSPORT`:
//!
//! - `http` (default) talks to the hosted weather agent
//! - `mock` answers locally with canned replies, for offline runs and tests
//!
//! The HTTP transport reads an optional JSON file named by
//! `WEATHER_CHAT_CONFIG_PATH`:
//!
//! ```json
//! {
//!   "base_url": "https://millions-screeching-vultur.mastra.cloud",
//!   "agent_id": "weatherAgent",
//!   "resource_id": "weatherAgent",
//!   "timeout_sec": 30,
//!   "playground": true
//! }
//! ```
//!
//! Contract notes:
//! - Every field is optional.
//! - `base_url` must be an absolute `http` or `https` URL.
//! - `timeout_sec` must be > 0 when provided.
//! - Unknown JSON fields are rejected.
//!
//! ## Storage
//!
//! The transcript and thread id persist under `WEATHER_CHAT_DATA_DIR`
//! (default `.weather_chat` in the working directory). `/export` writes into
//! `WEATHER_CHAT_EXPORT_DIR` (default the working directory).

pub mod app;
pub mod commands;
pub mod config;
pub mod runtime;
pub mod transports;
