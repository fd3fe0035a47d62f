//! Persistent storage for the chat transcript and conversation thread id.
//!
//! Storage is split into a raw string key-value layer ([`KeyValueStore`]) with
//! file and in-memory backends, and the best-effort [`SessionStore`] facade
//! used by the session engine.

mod backend;
mod error;
mod paths;
mod store;

pub use backend::{FileBackend, KeyValueStore, MemoryBackend};
pub use error::ChatStoreError;
pub use paths::{data_root, key_file_name, DATA_DIR, MESSAGES_KEY, THREAD_KEY};
pub use store::{SessionStore, StoredSession};
