use std::path::Path;

use agent_contract::{new_thread_id, Message};
use tracing::{debug, warn};

use crate::backend::{FileBackend, KeyValueStore, MemoryBackend};
use crate::error::ChatStoreError;
use crate::paths::{MESSAGES_KEY, THREAD_KEY};

/// State restored at session start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub thread_id: String,
    pub messages: Vec<Message>,
}

/// Best-effort persistence of the transcript and thread id.
///
/// [`SessionStore::load`] and [`SessionStore::save`] never fail: backend and
/// decoding errors are logged and degrade to an empty transcript or a skipped
/// write. The `try_*` variants expose the underlying errors.
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Store backed by one file per record under `root`.
    pub fn in_dir(root: &Path) -> Self {
        Self::new(FileBackend::new(root))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Loads the stored transcript and thread id.
    ///
    /// A missing, blank, or unreadable thread id is replaced with a freshly
    /// generated one. Unreadable messages load as an empty transcript.
    pub fn load(&self) -> StoredSession {
        let messages = match self.try_load_messages() {
            Ok(messages) => messages.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "discarding unreadable stored messages");
                Vec::new()
            }
        };

        let stored_thread = match self.try_load_thread_id() {
            Ok(thread_id) => thread_id,
            Err(error) => {
                warn!(%error, "discarding unreadable stored thread id");
                None
            }
        };
        let thread_id = stored_thread.unwrap_or_else(|| {
            let generated = new_thread_id();
            debug!(thread_id = %generated, "no stored thread id; generated a new one");
            generated
        });

        StoredSession {
            thread_id,
            messages,
        }
    }

    /// Writes both records, logging instead of returning failures.
    ///
    /// The two records are written independently; a failed message write does
    /// not prevent the thread id write.
    pub fn save(&self, thread_id: &str, messages: &[Message]) {
        if let Err(error) = self.try_save_messages(messages) {
            warn!(%error, count = messages.len(), "failed to persist messages");
        }
        if let Err(error) = self.try_save_thread_id(thread_id) {
            warn!(%error, thread_id, "failed to persist thread id");
        }
    }

    pub fn try_load_messages(&self) -> Result<Option<Vec<Message>>, ChatStoreError> {
        let Some(raw) = self.backend.get(MESSAGES_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str::<Vec<Message>>(&raw)
            .map(Some)
            .map_err(|source| ChatStoreError::json_decode(MESSAGES_KEY, source))
    }

    pub fn try_load_thread_id(&self) -> Result<Option<String>, ChatStoreError> {
        Ok(self
            .backend
            .get(THREAD_KEY)?
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    pub fn try_save_messages(&self, messages: &[Message]) -> Result<(), ChatStoreError> {
        let encoded = serde_json::to_string(messages)
            .map_err(|source| ChatStoreError::json_encode(MESSAGES_KEY, source))?;
        self.backend.set(MESSAGES_KEY, &encoded)
    }

    pub fn try_save_thread_id(&self, thread_id: &str) -> Result<(), ChatStoreError> {
        self.backend.set(THREAD_KEY, thread_id)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
