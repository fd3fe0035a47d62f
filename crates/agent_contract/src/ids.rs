use time::OffsetDateTime;
use uuid::Uuid;

/// Prefix used for conversation thread identifiers.
pub const THREAD_ID_PREFIX: &str = "thread";
/// Prefix used for message identifiers.
pub const MESSAGE_ID_PREFIX: &str = "msg";

const SUFFIX_LEN: usize = 9;

/// Generates `{prefix}_{unix_millis}_{suffix}` identifiers.
///
/// The millisecond component never repeats or goes backwards for one
/// generator, so ids from the same generator sort by creation order even when
/// several are minted within the same millisecond.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last_millis: i128,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_thread_id(&mut self) -> String {
        self.next_id(THREAD_ID_PREFIX)
    }

    pub fn next_message_id(&mut self) -> String {
        self.next_id(MESSAGE_ID_PREFIX)
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let millis = now.max(self.last_millis + 1);
        self.last_millis = millis;
        format!("{prefix}_{millis}_{}", random_suffix())
    }

    /// Advances past the millisecond component of a previously minted `id`,
    /// so later ids sort after it. Ids without one are ignored.
    pub fn observe_id(&mut self, id: &str) {
        if let Some(millis) = millis_component(id) {
            self.last_millis = self.last_millis.max(millis);
        }
    }

    /// Advances past `at`.
    pub fn observe_time(&mut self, at: OffsetDateTime) {
        self.last_millis = self.last_millis.max(at.unix_timestamp_nanos() / 1_000_000);
    }
}

fn millis_component(id: &str) -> Option<i128> {
    let mut parts = id.rsplitn(3, '_');
    parts.next()?;
    parts.next()?.parse().ok()
}

/// Generates a standalone thread id, for callers without a generator.
#[must_use]
pub fn new_thread_id() -> String {
    IdGenerator::new().next_thread_id()
}

fn random_suffix() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect()
}
