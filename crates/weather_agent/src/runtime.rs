use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use agent_contract::{
    AgentRequest, AgentTransport, RequestId, ResponseBody, TransportFailure, TransportProfile,
};
use tracing::{debug, warn};
use weather_chat::{ChatSession, SendHost};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestEvent {
    Completed {
        request_id: RequestId,
        body: ResponseBody,
    },
    Failed {
        request_id: RequestId,
        failure: TransportFailure,
    },
}

impl RequestEvent {
    fn request_id(&self) -> RequestId {
        match self {
            Self::Completed { request_id, .. } | Self::Failed { request_id, .. } => *request_id,
        }
    }
}

pub struct RuntimeController {
    session: Arc<Mutex<ChatSession>>,
    transport: Arc<dyn AgentTransport>,
    pending_events: Mutex<VecDeque<RequestEvent>>,
    events_ready: Condvar,
    next_request_id: AtomicU64,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl RuntimeController {
    /// Creates a controller that runs each request on its own worker thread.
    ///
    /// Outcomes are buffered until the owner calls
    /// [`RuntimeController::flush_pending_events`], which applies them to the
    /// session on the caller's thread.
    pub fn new(session: Arc<Mutex<ChatSession>>, transport: Arc<dyn AgentTransport>) -> Arc<Self> {
        Arc::new(Self {
            session,
            transport,
            pending_events: Mutex::new(VecDeque::new()),
            events_ready: Condvar::new(),
            next_request_id: AtomicU64::new(1),
            workers: Mutex::new(Vec::new()),
        })
    }

    pub fn session(&self) -> &Arc<Mutex<ChatSession>> {
        &self.session
    }

    pub fn transport_profile(&self) -> TransportProfile {
        self.transport.profile()
    }

    fn start_request_internal(
        self: &Arc<Self>,
        thread_id: String,
        content: String,
    ) -> Result<RequestId, String> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let request = AgentRequest {
            request_id,
            thread_id,
            content,
        };
        let join_handle = self.spawn_worker(request)?;

        let mut workers = lock_unpoisoned(&self.workers);
        workers.retain(|worker| !worker.is_finished());
        workers.push(join_handle);
        Ok(request_id)
    }

    fn spawn_worker(self: &Arc<Self>, request: AgentRequest) -> Result<JoinHandle<()>, String> {
        let request_id = request.request_id;
        let controller = Arc::clone(self);
        thread::Builder::new()
            .name(format!("weather-agent-request-{request_id}"))
            .spawn(move || controller.run_worker(request))
            .map_err(|error| format!("Failed to spawn request worker: {error}"))
    }

    fn run_worker(self: Arc<Self>, request: AgentRequest) {
        let request_id = request.request_id;
        let transport = Arc::clone(&self.transport);
        let outcome = catch_unwind(AssertUnwindSafe(|| transport.send(request)));

        let event = match outcome {
            Ok(Ok(body)) => RequestEvent::Completed { request_id, body },
            Ok(Err(failure)) => RequestEvent::Failed {
                request_id,
                failure,
            },
            Err(_) => {
                warn!(request_id, "transport panicked");
                RequestEvent::Failed {
                    request_id,
                    failure: TransportFailure::Other("transport panicked".to_string()),
                }
            }
        };
        self.enqueue_event(event);
    }

    fn enqueue_event(&self, event: RequestEvent) {
        debug!(request_id = event.request_id(), "request outcome queued");
        lock_unpoisoned(&self.pending_events).push_back(event);
        self.events_ready.notify_all();
    }

    /// Blocks until at least one outcome is queued or `timeout` elapses.
    ///
    /// Returns true when outcomes are waiting to be flushed.
    pub fn wait_for_events(&self, timeout: Duration) -> bool {
        let queue = lock_unpoisoned(&self.pending_events);
        let (queue, _) = match self
            .events_ready
            .wait_timeout_while(queue, timeout, |queue| queue.is_empty())
        {
            Ok(result) => result,
            Err(poisoned) => poisoned.into_inner(),
        };
        !queue.is_empty()
    }

    /// Applies every queued outcome to the session. Returns how many were applied.
    ///
    /// Must not be called while holding the session lock.
    pub fn flush_pending_events(&self) -> usize {
        let mut drained = 0usize;

        loop {
            let event = lock_unpoisoned(&self.pending_events).pop_front();
            match event {
                Some(event) => {
                    self.apply_event(event);
                    drained += 1;
                }
                None => break,
            }
        }

        drained
    }

    /// Waits for every spawned worker to finish.
    pub fn join_workers(&self) {
        let workers = std::mem::take(&mut *lock_unpoisoned(&self.workers));
        for worker in workers {
            let _ = worker.join();
        }
    }

    fn apply_event(&self, event: RequestEvent) {
        let mut session = lock_unpoisoned(&self.session);
        match event {
            RequestEvent::Completed { request_id, body } => session.on_response(request_id, &body),
            RequestEvent::Failed {
                request_id,
                failure,
            } => session.on_failure(request_id, &failure),
        }
    }
}

/// [`SendHost`] adapter over a shared [`RuntimeController`].
pub struct ControllerHost(pub Arc<RuntimeController>);

impl SendHost for ControllerHost {
    fn start_request(&mut self, thread_id: String, content: String) -> Result<RequestId, String> {
        self.0.start_request_internal(thread_id, content)
    }
}

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
