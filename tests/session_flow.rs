use std::collections::HashSet;

use agent_contract::{DeliveryStatus, Message, RequestId, ResponseBody, Role, TransportFailure};
use assert_matches::assert_matches;
use chat_store::{MemoryBackend, SessionStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use weather_chat::{
    ChatSession, ErrorKind, Mode, SendHost, UNPROCESSABLE_REPLY, WELCOME_TEXT,
};

#[derive(Default)]
struct HostSpy {
    next_request_id: RequestId,
    requests: Vec<(String, String)>,
    refuse: bool,
}

impl SendHost for HostSpy {
    fn start_request(&mut self, thread_id: String, content: String) -> Result<RequestId, String> {
        if self.refuse {
            return Err("worker unavailable".to_string());
        }
        self.next_request_id += 1;
        self.requests.push((thread_id, content));
        Ok(self.next_request_id)
    }
}

fn open_shared() -> (ChatSession, MemoryBackend) {
    let backend = MemoryBackend::new();
    let session = ChatSession::open(SessionStore::new(backend.clone()));
    (session, backend)
}

fn contents(session: &ChatSession) -> Vec<&str> {
    session
        .messages()
        .iter()
        .map(|message| message.content.as_str())
        .collect()
}

fn stream_reply(text: &str) -> ResponseBody {
    ResponseBody::Text(format!(
        "f:{{\"messageId\":\"m1\"}}\n0:{}\ne:{{\"finishReason\":\"stop\",\"isContinued\":false}}\nd:{{\"finishReason\":\"stop\"}}\n",
        json!(text)
    ))
}

#[test]
fn fresh_session_is_seeded_with_welcome_message() {
    let (session, _backend) = open_shared();

    assert_eq!(contents(&session), vec![WELCOME_TEXT]);
    let welcome = &session.messages()[0];
    assert_eq!(welcome.role, Role::Agent);
    let values: Vec<_> = welcome
        .quick_replies()
        .iter()
        .map(|reply| reply.value.as_deref())
        .collect();
    assert_eq!(values, vec![Some("current"), Some("forecast"), Some("alerts")]);
    assert!(!session.thread_id().is_empty());
    assert_eq!(session.mode(), Mode::Idle);
}

#[test]
fn successful_send_appends_reply_and_marks_delivery() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    assert!(session.send_message("  weather in Oslo?  ", &mut host));
    assert_eq!(host.requests, vec![(session.thread_id().to_string(), "weather in Oslo?".to_string())]);
    assert_eq!(session.mode(), Mode::Sending { request_id: 1 });
    assert_eq!(session.messages()[1].delivery_status, Some(DeliveryStatus::Sent));

    session.on_response(1, &stream_reply("It is sunny in Oslo."));

    assert_eq!(session.mode(), Mode::Idle);
    assert_eq!(
        contents(&session),
        vec![WELCOME_TEXT, "weather in Oslo?", "It is sunny in Oslo."]
    );
    assert_eq!(session.messages()[1].delivery_status, Some(DeliveryStatus::Delivered));
    let reply = &session.messages()[2];
    assert_eq!(reply.role, Role::Agent);
    assert_eq!(reply.delivery_status, None);
    assert_eq!(reply.quick_replies().len(), 2);
}

#[test]
fn every_sent_user_message_is_delivered_by_the_next_success() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("first", &mut host);
    session.on_failure(1, &TransportFailure::Timeout);
    session.send_message("second", &mut host);
    session.on_response(2, &ResponseBody::Json(json!({"content": "Clear skies all day."})));

    let statuses: Vec<_> = session
        .messages()
        .iter()
        .filter(|message| message.is_user())
        .map(|message| message.delivery_status)
        .collect();
    assert_eq!(
        statuses,
        vec![Some(DeliveryStatus::Delivered), Some(DeliveryStatus::Delivered)]
    );
}

#[test]
fn failure_records_sticky_error_and_retry_restores_one_user_turn() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("forecast?", &mut host);
    session.on_failure(
        1,
        &TransportFailure::Status {
            status: 503,
            message: "unavailable".to_string(),
        },
    );

    assert_eq!(session.error(), Some(ErrorKind::ServerError));
    assert_eq!(
        contents(&session),
        vec![WELCOME_TEXT, "forecast?", "⚠️ Server error, please try again later"]
    );

    assert!(session.retry_last_message(&mut host));
    assert_eq!(session.error(), None);
    assert_eq!(contents(&session), vec![WELCOME_TEXT, "forecast?"]);
    assert_eq!(host.requests.len(), 2);
    assert_eq!(host.requests[1].1, "forecast?");

    session.on_response(2, &ResponseBody::Text("The weather is mild tomorrow.".to_string()));
    assert_eq!(
        contents(&session),
        vec![WELCOME_TEXT, "forecast?", "The weather is mild tomorrow."]
    );
}

#[test]
fn retry_without_remembered_message_is_a_no_op() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    assert!(!session.retry_last_message(&mut host));
    assert!(host.requests.is_empty());
}

#[test]
fn retry_while_sending_is_a_no_op() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("hi", &mut host);
    assert!(!session.retry_last_message(&mut host));
    assert_eq!(host.requests.len(), 1);
}

#[test]
fn blank_and_in_flight_sends_are_ignored() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    assert!(!session.send_message("   ", &mut host));
    assert!(session.send_message("one", &mut host));
    assert!(!session.send_message("two", &mut host));

    assert_eq!(host.requests.len(), 1);
    assert_eq!(contents(&session), vec![WELCOME_TEXT, "one"]);
}

#[test]
fn host_refusal_surfaces_unknown_error() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy {
        refuse: true,
        ..HostSpy::default()
    };

    assert!(!session.send_message("hello", &mut host));
    assert_eq!(session.mode(), Mode::Errored(ErrorKind::Unknown));
    assert_eq!(
        contents(&session).last().copied(),
        Some("⚠️ Something went wrong, try again")
    );
}

#[test]
fn empty_response_yields_unprocessable_reply_without_delivery() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("anything?", &mut host);
    session.on_response(1, &ResponseBody::Empty);

    assert_eq!(contents(&session).last().copied(), Some(UNPROCESSABLE_REPLY));
    assert_eq!(session.messages()[1].delivery_status, Some(DeliveryStatus::Sent));
    assert_eq!(session.mode(), Mode::Idle);
}

#[test]
fn outcomes_for_inactive_requests_are_ignored() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("hi", &mut host);
    let before = session.messages().to_vec();

    session.on_response(7, &ResponseBody::Text("It is raining heavily.".to_string()));
    session.on_failure(7, &TransportFailure::Timeout);

    assert_eq!(session.messages(), before.as_slice());
    assert_eq!(session.mode(), Mode::Sending { request_id: 1 });
}

#[test]
fn clear_resets_identity_and_discards_late_reply() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();
    let old_thread = session.thread_id().to_string();

    session.send_message("hi", &mut host);
    session.clear_messages();

    assert_ne!(session.thread_id(), old_thread);
    assert_eq!(contents(&session), vec![WELCOME_TEXT]);
    assert_eq!(session.messages()[0].quick_replies().len(), 3);
    assert_eq!(session.last_user_message(), None);
    assert_matches!(session.mode(), Mode::Sending { request_id: 1 });

    session.on_response(1, &ResponseBody::Text("It is sunny in the old thread.".to_string()));

    assert_eq!(contents(&session), vec![WELCOME_TEXT]);
    assert_eq!(session.mode(), Mode::Idle);
}

#[test]
fn clear_drops_sticky_error() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("hi", &mut host);
    session.on_failure(1, &TransportFailure::Connect("refused".to_string()));
    assert_eq!(session.error(), Some(ErrorKind::NetworkError));

    session.clear_messages();
    assert_eq!(session.error(), None);
    assert_eq!(session.mode(), Mode::Idle);
}

#[test]
fn message_ids_are_unique_and_timestamps_ordered() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    for round in 1..=5 {
        session.send_message(&format!("question {round}"), &mut host);
        session.on_response(round, &ResponseBody::Text(format!("It is answer number {round}.")));
    }

    let ids: HashSet<_> = session.messages().iter().map(|message| &message.id).collect();
    assert_eq!(ids.len(), session.messages().len());
    assert!(session
        .messages()
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[test]
fn quick_replies_come_from_latest_agent_message() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    assert_eq!(
        session.quick_reply(0, 2).map(|reply| reply.text.as_str()),
        Some("⚠️ Weather alerts")
    );
    assert_eq!(session.quick_reply(0, 3), None);
    assert!(session.send_quick_reply(1, &mut host));
    assert_eq!(host.requests[0].1, "📅 5-day forecast");

    session.on_response(1, &ResponseBody::Text("It is going to rain on Friday.".to_string()));
    let texts: Vec<_> = session
        .latest_quick_replies()
        .iter()
        .map(|reply| reply.text.as_str())
        .collect();
    assert_eq!(texts, vec!["💬 Tell me more", "👍 That's helpful"]);
    assert!(!session.send_quick_reply(5, &mut host));
}

#[test]
fn session_state_survives_reopen() {
    let (mut session, backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("persist me", &mut host);
    session.on_response(1, &ResponseBody::Text("It is stored safely.".to_string()));
    let thread_id = session.thread_id().to_string();
    let messages = session.messages().to_vec();
    drop(session);

    let reopened = ChatSession::open(SessionStore::new(backend));
    assert_eq!(reopened.thread_id(), thread_id);
    assert_eq!(reopened.messages(), messages.as_slice());
}

#[test]
fn ids_after_reopen_sort_after_restored_ids() {
    let backend = MemoryBackend::new();
    let restored_id = "msg_4102444800000_a1b2c3d4e";
    SessionStore::new(backend.clone()).save(
        "thread_4102444800000_f9e8d7c6b",
        &[Message {
            id: restored_id.to_string(),
            role: Role::User,
            content: "from a skewed clock".to_string(),
            timestamp: time::OffsetDateTime::now_utc(),
            quick_replies: None,
            delivery_status: Some(DeliveryStatus::Sent),
        }],
    );

    let mut session = ChatSession::open(SessionStore::new(backend));
    let new_id = session.add_message("after restart", Role::User, None, None);

    let millis = |id: &str| -> u128 {
        id.split('_').nth(1).and_then(|part| part.parse().ok()).expect("millis")
    };
    assert!(millis(&new_id) > millis(restored_id), "{new_id}");
}

#[test]
fn storage_failures_do_not_interrupt_the_session() {
    let (mut session, backend) = open_shared();
    let mut host = HostSpy::default();
    backend.set_fail_writes(true);

    assert!(session.send_message("still works", &mut host));
    session.on_response(1, &ResponseBody::Text("It is fine in memory.".to_string()));

    assert_eq!(session.messages().len(), 3);
}

#[test]
fn search_filters_without_touching_transcript() {
    let (mut session, _backend) = open_shared();
    let mut host = HostSpy::default();

    session.send_message("Rain in Bergen?", &mut host);
    session.on_response(1, &ResponseBody::Text("It is raining in Bergen.".to_string()));

    let found = session.search("bergen");
    assert_eq!(found.len(), 2);
    assert_eq!(session.messages().len(), 3);
}
