//! Chat session engine: transcript ownership and the send/retry state machine.
//!
//! [`ChatSession`] owns the ordered message list and the conversation thread
//! id. It never performs I/O on its own apart from persisting through its
//! [`SessionStore`]; outbound requests are delegated to a [`SendHost`], and
//! their outcomes are fed back through [`ChatSession::on_response`] and
//! [`ChatSession::on_failure`].
//!
//! At most one request is in flight. Outcomes for any request other than the
//! active one are ignored, and outcomes for a request issued before the last
//! [`ChatSession::clear_messages`] are discarded.

use agent_contract::{
    DeliveryStatus, IdGenerator, Message, QuickReply, RequestId, ResponseBody, Role,
    TransportFailure,
};
use chat_store::SessionStore;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

use crate::classify::{is_error_content, ErrorKind};
use crate::export::export_transcript;
use crate::normalize::normalize_response;
use crate::search::search_messages;

pub const WELCOME_TEXT: &str = "Hi there! 👋 I'm your Weather Agent 🌤️✨ I can help you get current weather information, forecasts, and answer weather-related questions. What would you like to know? 🌈";

/// Agent message used when a successful response carries no text.
pub const UNPROCESSABLE_REPLY: &str =
    "I received your message but couldn't process it properly. Please try again.";

/// Quick replies attached to the seeded welcome message.
pub fn welcome_quick_replies() -> Vec<QuickReply> {
    vec![
        QuickReply::new("1", "🌡️ Current weather", Some("current")),
        QuickReply::new("2", "📅 5-day forecast", Some("forecast")),
        QuickReply::new("3", "⚠️ Weather alerts", Some("alerts")),
    ]
}

/// Quick replies attached to every normalized agent reply.
pub fn agent_reply_quick_replies() -> Vec<QuickReply> {
    vec![
        QuickReply::new("1", "💬 Tell me more", Some("more")),
        QuickReply::new("2", "👍 That's helpful", Some("helpful")),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Sending { request_id: RequestId },
    /// Sticky error from the last send; cleared by the next send or a clear.
    Errored(ErrorKind),
}

/// Issues outbound requests on behalf of the session.
pub trait SendHost {
    /// Starts one request for `content` on `thread_id` and returns its id.
    ///
    /// The outcome must later be reported to the session with the same id.
    fn start_request(&mut self, thread_id: String, content: String) -> Result<RequestId, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    request_id: RequestId,
    thread_id: String,
}

#[derive(Debug)]
pub struct ChatSession {
    mode: Mode,
    messages: Vec<Message>,
    thread_id: String,
    last_user_message: Option<String>,
    pending: Option<PendingRequest>,
    ids: IdGenerator,
    store: SessionStore,
}

impl ChatSession {
    /// Restores the session from `store`, seeding the welcome message when no
    /// transcript was stored.
    pub fn open(store: SessionStore) -> Self {
        let stored = store.load();
        let mut ids = IdGenerator::new();
        ids.observe_id(&stored.thread_id);
        for message in &stored.messages {
            ids.observe_id(&message.id);
            ids.observe_time(message.timestamp);
        }

        let mut session = Self {
            mode: Mode::Idle,
            messages: stored.messages,
            thread_id: stored.thread_id,
            last_user_message: None,
            pending: None,
            ids,
            store,
        };

        if session.messages.is_empty() {
            let welcome = session.new_message(
                WELCOME_TEXT.to_string(),
                Role::Agent,
                Some(welcome_quick_replies()),
                None,
            );
            session.messages.push(welcome);
        }
        debug!(
            thread_id = %session.thread_id,
            messages = session.messages.len(),
            "chat session opened"
        );
        session.persist();
        session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.last_user_message.as_deref()
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.mode, Mode::Sending { .. })
    }

    /// The sticky error, if the last send failed.
    pub fn error(&self) -> Option<ErrorKind> {
        match self.mode {
            Mode::Errored(kind) => Some(kind),
            _ => None,
        }
    }

    /// Appends a message and persists. Returns the new message id.
    ///
    /// The timestamp is clamped so the transcript stays non-decreasing even
    /// if the wall clock steps backwards.
    pub fn add_message(
        &mut self,
        content: impl Into<String>,
        role: Role,
        quick_replies: Option<Vec<QuickReply>>,
        delivery_status: Option<DeliveryStatus>,
    ) -> String {
        let message = self.new_message(content.into(), role, quick_replies, delivery_status);
        let id = message.id.clone();
        self.messages.push(message);
        self.persist();
        id
    }

    /// Sends `text` as a user message. Returns true when a request was started.
    ///
    /// No-op for blank text, while a request is in flight, or without a thread.
    pub fn send_message(&mut self, text: &str, host: &mut dyn SendHost) -> bool {
        let text = text.trim();
        if text.is_empty() || self.is_sending() || self.thread_id.trim().is_empty() {
            return false;
        }

        self.mode = Mode::Idle;
        self.add_message(text, Role::User, None, Some(DeliveryStatus::Sent));
        self.last_user_message = Some(text.to_string());

        match host.start_request(self.thread_id.clone(), text.to_string()) {
            Ok(request_id) => {
                debug!(request_id, thread_id = %self.thread_id, "request started");
                self.mode = Mode::Sending { request_id };
                self.pending = Some(PendingRequest {
                    request_id,
                    thread_id: self.thread_id.clone(),
                });
                true
            }
            Err(error) => {
                warn!(%error, "failed to start request");
                self.record_error(ErrorKind::Unknown);
                false
            }
        }
    }

    /// Sends the text of quick reply `reply_index` (0-based) from the latest
    /// agent message offering quick replies.
    pub fn send_quick_reply(&mut self, reply_index: usize, host: &mut dyn SendHost) -> bool {
        let Some(reply) = self.latest_quick_replies().get(reply_index).cloned() else {
            return false;
        };
        self.send_message(&reply.text, host)
    }

    /// Quick reply `reply_index` of the message at `message_index`, if both exist.
    pub fn quick_reply(&self, message_index: usize, reply_index: usize) -> Option<&QuickReply> {
        self.messages
            .get(message_index)?
            .quick_replies()
            .get(reply_index)
    }

    /// Quick replies of the most recent agent message that has any.
    pub fn latest_quick_replies(&self) -> &[QuickReply] {
        self.messages
            .iter()
            .rev()
            .filter(|message| message.is_agent())
            .map(Message::quick_replies)
            .find(|replies| !replies.is_empty())
            .unwrap_or(&[])
    }

    /// Applies a successful response for `request_id`.
    pub fn on_response(&mut self, request_id: RequestId, body: &ResponseBody) {
        let Some(pending) = self.settle(request_id) else {
            return;
        };
        if pending.thread_id != self.thread_id {
            warn!(request_id, "discarding response for a cleared thread");
            return;
        }

        let text = normalize_response(body);
        if text.trim().is_empty() {
            self.add_message(UNPROCESSABLE_REPLY, Role::Agent, None, None);
            return;
        }

        let reply = self.new_message(text, Role::Agent, Some(agent_reply_quick_replies()), None);
        self.messages.push(reply);
        for message in &mut self.messages {
            if message.is_user() && message.delivery_status == Some(DeliveryStatus::Sent) {
                message.delivery_status = Some(DeliveryStatus::Delivered);
            }
        }
        self.persist();
    }

    /// Applies a transport failure for `request_id`.
    pub fn on_failure(&mut self, request_id: RequestId, failure: &TransportFailure) {
        let Some(pending) = self.settle(request_id) else {
            return;
        };
        if pending.thread_id != self.thread_id {
            warn!(request_id, %failure, "discarding failure for a cleared thread");
            return;
        }

        let kind = ErrorKind::classify(failure);
        debug!(request_id, kind = kind.as_str(), %failure, "request failed");
        self.record_error(kind);
    }

    /// Resends the remembered user message. Returns true when a request was started.
    ///
    /// Every error message is removed first, along with the trailing copy of
    /// the remembered message, so the transcript ends up with exactly one
    /// user turn for it.
    pub fn retry_last_message(&mut self, host: &mut dyn SendHost) -> bool {
        if self.is_sending() {
            return false;
        }
        let Some(text) = self.last_user_message.clone() else {
            return false;
        };

        self.messages
            .retain(|message| !is_error_content(&message.content));
        if self
            .messages
            .last()
            .is_some_and(|message| message.is_user() && message.content == text)
        {
            self.messages.pop();
        }
        self.persist();

        self.send_message(&text, host)
    }

    /// Starts a new thread with only the welcome message.
    ///
    /// An in-flight request keeps the session in `Sending` until it settles;
    /// its outcome is then discarded.
    pub fn clear_messages(&mut self) {
        self.thread_id = self.ids.next_thread_id();
        self.messages.clear();
        let welcome = self.new_message(
            WELCOME_TEXT.to_string(),
            Role::Agent,
            Some(welcome_quick_replies()),
            None,
        );
        self.messages.push(welcome);
        self.last_user_message = None;
        if matches!(self.mode, Mode::Errored(_)) {
            self.mode = Mode::Idle;
        }
        debug!(thread_id = %self.thread_id, "transcript cleared");
        self.persist();
    }

    /// Messages containing `query`, ignoring case. A blank query matches all.
    pub fn search(&self, query: &str) -> Vec<&Message> {
        search_messages(&self.messages, query)
    }

    /// The whole transcript as export text, timestamps in `offset` local time.
    pub fn export(&self, offset: UtcOffset) -> String {
        export_transcript(&self.messages, offset)
    }

    fn settle(&mut self, request_id: RequestId) -> Option<PendingRequest> {
        if !self.is_active_request(request_id) {
            debug!(request_id, "ignoring outcome for inactive request");
            return None;
        }
        self.mode = Mode::Idle;
        self.pending.take()
    }

    fn is_active_request(&self, request_id: RequestId) -> bool {
        matches!(self.mode, Mode::Sending { request_id: active } if active == request_id)
    }

    fn record_error(&mut self, kind: ErrorKind) {
        self.add_message(kind.user_message(), Role::Agent, None, None);
        self.mode = Mode::Errored(kind);
    }

    fn new_message(
        &mut self,
        content: String,
        role: Role,
        quick_replies: Option<Vec<QuickReply>>,
        delivery_status: Option<DeliveryStatus>,
    ) -> Message {
        let now = OffsetDateTime::now_utc();
        let timestamp = match self.messages.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };

        Message {
            id: self.ids.next_message_id(),
            role,
            content,
            timestamp,
            quick_replies,
            delivery_status,
        }
    }

    fn persist(&self) {
        self.store.save(&self.thread_id, &self.messages);
    }
}

#[cfg(test)]
mod tests {
    use agent_contract::{RequestId, Role};
    use chat_store::SessionStore;

    use super::{ChatSession, Mode, SendHost};

    struct FixedHost(RequestId);

    impl SendHost for FixedHost {
        fn start_request(&mut self, _thread_id: String, _content: String) -> Result<RequestId, String> {
            Ok(self.0)
        }
    }

    #[test]
    fn add_message_keeps_timestamps_non_decreasing() {
        let mut session = ChatSession::open(SessionStore::in_memory());
        let future = session.messages()[0].timestamp + time::Duration::hours(1);
        session.messages[0].timestamp = future;

        session.add_message("later", Role::User, None, None);

        assert_eq!(session.messages()[1].timestamp, future);
    }

    #[test]
    fn settle_only_accepts_the_active_request() {
        let mut session = ChatSession::open(SessionStore::in_memory());
        session.send_message("hi", &mut FixedHost(4));

        assert!(session.settle(3).is_none());
        assert_eq!(session.mode(), Mode::Sending { request_id: 4 });
        assert!(session.settle(4).is_some());
        assert_eq!(session.mode(), Mode::Idle);
    }
}
