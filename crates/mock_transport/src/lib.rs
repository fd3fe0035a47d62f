//! Deterministic mock implementation of the shared `agent_contract` transport.
//!
//! This crate contains no network logic and is intended for offline runs and
//! engine-level integration testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use agent_contract::{AgentRequest, AgentTransport, ResponseBody, TransportFailure, TransportProfile};

/// Stable transport identifier used for explicit startup selection.
pub const MOCK_TRANSPORT_ID: &str = "mock";

/// Scripted outcome returned for one request.
pub type MockOutcome = Result<ResponseBody, TransportFailure>;

/// Deterministic transport that replays queued outcomes in request order.
///
/// When the script runs dry, requests are answered with a canned weather
/// report framed in the agent's streaming wire format.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockOutcome>>,
    requests: Mutex<Vec<AgentRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport that replays `outcomes` before falling back to the canned reply.
    #[must_use]
    pub fn scripted(outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Sleeps for `delay` before answering each request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_outcome(&self, outcome: MockOutcome) {
        lock_unpoisoned(&self.script).push_back(outcome);
    }

    /// Returns every request seen so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<AgentRequest> {
        lock_unpoisoned(&self.requests).clone()
    }

    fn canned_reply(request: &AgentRequest) -> ResponseBody {
        let topic = request.content.trim();
        let text = format!(
            "The weather for \"{topic}\" looks calm: clear skies, light winds and mild temperatures through the evening."
        );
        let quoted = serde_json::Value::String(text).to_string();
        ResponseBody::Text(format!(
            "f:{{\"messageId\":\"mock-{}\"}}\n0:{quoted}\ne:{{\"finishReason\":\"stop\",\"isContinued\":false}}\nd:{{\"finishReason\":\"stop\"}}\n",
            request.request_id
        ))
    }
}

impl AgentTransport for MockTransport {
    fn profile(&self) -> TransportProfile {
        TransportProfile {
            transport_id: MOCK_TRANSPORT_ID.to_string(),
            endpoint: "mock://weather-agent".to_string(),
        }
    }

    fn send(&self, request: AgentRequest) -> Result<ResponseBody, TransportFailure> {
        lock_unpoisoned(&self.requests).push(request.clone());

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }

        let scripted = lock_unpoisoned(&self.script).pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => Ok(Self::canned_reply(&request)),
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
