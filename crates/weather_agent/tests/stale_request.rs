use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_contract::{AgentRequest, AgentTransport, ResponseBody, TransportFailure, TransportProfile};
use assert_matches::assert_matches;
use chat_store::SessionStore;
use mock_transport::MockTransport;
use pretty_assertions::assert_eq;
use weather_agent::runtime::{ControllerHost, RuntimeController};
use weather_chat::{ChatSession, ErrorKind, Mode, WELCOME_TEXT};

const WAIT: Duration = Duration::from_secs(5);

fn controller_with(transport: Arc<dyn AgentTransport>) -> Arc<RuntimeController> {
    let session = ChatSession::open(SessionStore::in_memory());
    RuntimeController::new(Arc::new(Mutex::new(session)), transport)
}

fn send(controller: &Arc<RuntimeController>, text: &str) -> bool {
    let mut host = ControllerHost(Arc::clone(controller));
    controller
        .session()
        .lock()
        .expect("session lock")
        .send_message(text, &mut host)
}

fn contents(controller: &RuntimeController) -> Vec<String> {
    controller
        .session()
        .lock()
        .expect("session lock")
        .messages()
        .iter()
        .map(|message| message.content.clone())
        .collect()
}

fn mode(controller: &RuntimeController) -> Mode {
    controller.session().lock().expect("session lock").mode()
}

#[test]
fn reply_for_cleared_thread_is_discarded() {
    let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(100)));
    let controller = controller_with(transport);

    assert!(send(&controller, "Is it windy?"));
    let first_thread = controller
        .session()
        .lock()
        .expect("session lock")
        .thread_id()
        .to_string();
    controller.session().lock().expect("session lock").clear_messages();

    assert_matches!(mode(&controller), Mode::Sending { .. });
    assert!(!send(&controller, "blocked while in flight"));

    assert!(controller.wait_for_events(WAIT));
    assert_eq!(controller.flush_pending_events(), 1);

    assert_eq!(contents(&controller), vec![WELCOME_TEXT.to_string()]);
    assert_eq!(mode(&controller), Mode::Idle);
    assert_ne!(
        controller.session().lock().expect("session lock").thread_id(),
        first_thread
    );
    controller.join_workers();
}

#[test]
fn new_thread_accepts_sends_after_late_reply_settles() {
    let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(50)));
    let controller = controller_with(transport.clone());

    send(&controller, "old question");
    controller.session().lock().expect("session lock").clear_messages();
    assert!(controller.wait_for_events(WAIT));
    controller.flush_pending_events();

    assert!(send(&controller, "new question"));
    assert!(controller.wait_for_events(WAIT));
    controller.flush_pending_events();

    let messages = contents(&controller);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1], "new question");
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].thread_id, requests[1].thread_id);
    assert!(requests[1].request_id > requests[0].request_id);
    controller.join_workers();
}

#[test]
fn transport_failure_is_classified() {
    let transport = Arc::new(MockTransport::scripted([Err(TransportFailure::Timeout)]));
    let controller = controller_with(transport);

    send(&controller, "slow?");
    assert!(controller.wait_for_events(WAIT));
    controller.flush_pending_events();

    assert_eq!(mode(&controller), Mode::Errored(ErrorKind::Timeout));
    assert_eq!(
        contents(&controller).last().map(String::as_str),
        Some("⚠️ Request timeout, please try again")
    );
}

struct PanickingTransport;

impl AgentTransport for PanickingTransport {
    fn profile(&self) -> TransportProfile {
        TransportProfile {
            transport_id: "panicking".to_string(),
            endpoint: "test://panic".to_string(),
        }
    }

    fn send(&self, _request: AgentRequest) -> Result<ResponseBody, TransportFailure> {
        panic!("transport exploded");
    }
}

#[test]
fn panicking_transport_surfaces_unknown_error() {
    let controller = controller_with(Arc::new(PanickingTransport));

    send(&controller, "boom?");
    assert!(controller.wait_for_events(WAIT));
    controller.flush_pending_events();

    assert_eq!(mode(&controller), Mode::Errored(ErrorKind::Unknown));
    controller.join_workers();
}

#[test]
fn flush_without_events_is_a_no_op() {
    let controller = controller_with(Arc::new(MockTransport::new()));

    assert!(!controller.wait_for_events(Duration::from_millis(10)));
    assert_eq!(controller.flush_pending_events(), 0);
    assert_eq!(mode(&controller), Mode::Idle);
}
