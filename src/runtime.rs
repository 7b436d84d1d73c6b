//! Runtime for hosting widget instances
//!
//! Each embedded widget owns its own conversation and transcript, driven by
//! a dedicated task. A widget processes one submit at a time; a second
//! submit while the first is suspended on an external call is rejected.

mod executor;
pub mod traits;


pub use executor::WidgetRuntime;
pub use traits::*;

use crate::backend::{ContactCaptureService, KnowledgeBaseService};
use crate::config::WidgetConfig;
use crate::state_machine::{Flow, LeadFields, Step, TransitionError, WidgetContext};
use crate::transcript::Message;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tokio_util::sync::CancellationToken;

/// Manager wired to the real HTTP collaborators
pub type ProductionManager = WidgetManager<KnowledgeBaseService, ContactCaptureService>;

/// Widgets untouched for this long are unmounted (30 minutes)
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Idle sweep interval (60 seconds)
pub const IDLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Events sent to transcript subscribers
#[derive(Debug, Clone)]
pub enum TranscriptEvent {
    Init { snapshot: WidgetSnapshot },
    Message { message: Message },
    /// Host reinitialized the widget; previous messages are gone
    Reset,
    Error { message: String },
}

/// Everything a host needs to render the widget
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSnapshot {
    pub widget_id: String,
    pub display_name: String,
    pub flow: Option<Flow>,
    pub step: Step,
    pub fields: LeadFields,
    pub messages: Vec<Message>,
    pub input_disabled: bool,
}

/// Errors at the widget boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("Widget is busy with a previous message")]
    Busy,
    #[error("Message is empty")]
    EmptyInput,
    #[error("Please choose one of: {}", options.join(", "))]
    OptionRequired { options: Vec<String> },
    #[error("Widget has been closed")]
    Closed,
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

type Reply = oneshot::Sender<Result<WidgetSnapshot, WidgetError>>;

/// Work handed to a widget's task
#[derive(Debug)]
pub enum WidgetCommand {
    Submit { text: String, reply: Reply },
    Reinitialize { config: WidgetConfig, reply: Reply },
}

/// Handle to interact with a hosted widget
pub struct WidgetHandle {
    command_tx: mpsc::Sender<WidgetCommand>,
    snapshot_rx: watch::Receiver<WidgetSnapshot>,
    broadcast_tx: broadcast::Sender<TranscriptEvent>,
    closed: CancellationToken,
    in_flight: Arc<AtomicBool>,
    last_activity: Mutex<Instant>,
}

impl WidgetHandle {
    /// Submit visitor input. Rejected rather than queued if a submit is in flight.
    /// Dropping the returned future does not interrupt the widget's task.
    pub async fn submit(&self, input: &str) -> Result<WidgetSnapshot, WidgetError> {
        self.dispatch(|reply| WidgetCommand::Submit {
            text: input.to_string(),
            reply,
        })
        .await
    }

    pub async fn reinitialize(&self, config: WidgetConfig) -> Result<WidgetSnapshot, WidgetError> {
        let config = config.normalized();
        self.dispatch(|reply| WidgetCommand::Reinitialize { config, reply })
            .await
    }

    async fn dispatch(
        &self,
        command: impl FnOnce(Reply) -> WidgetCommand,
    ) -> Result<WidgetSnapshot, WidgetError> {
        self.touch();
        if self.is_closed() {
            return Err(WidgetError::Closed);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WidgetError::Busy);
        }

        let (reply, reply_rx) = oneshot::channel();
        if self.command_tx.try_send(command(reply)).is_err() {
            self.in_flight.store(false, Ordering::Release);
            return Err(WidgetError::Closed);
        }

        // Sender dropped means the task stopped with the command unanswered
        reply_rx.await.map_err(|_| WidgetError::Closed)?
    }

    /// Latest render state; never waits on an external call
    pub fn snapshot(&self) -> WidgetSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Whether a submit is currently being processed
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.touch();
        self.broadcast_tx.subscribe()
    }

    /// Tear down; any in-flight external result is discarded
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Idle past `timeout` with nothing running and nobody streaming
    fn is_idle(&self, timeout: Duration) -> bool {
        let last_activity = *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        last_activity.elapsed() >= timeout
            && !self.is_busy()
            && self.broadcast_tx.receiver_count() == 0
    }
}

/// Manager for all hosted widgets
pub struct WidgetManager<K, C>
where
    K: KnowledgeBaseClient + 'static,
    C: ContactCaptureClient + 'static,
{
    knowledge_base: Arc<K>,
    contact_capture: Arc<C>,
    idle_timeout: Duration,
    widgets: RwLock<HashMap<String, Arc<WidgetHandle>>>,
}

impl<K, C> WidgetManager<K, C>
where
    K: KnowledgeBaseClient + 'static,
    C: ContactCaptureClient + 'static,
{
    pub fn new(knowledge_base: K, contact_capture: C) -> Self {
        Self {
            knowledge_base: Arc::new(knowledge_base),
            contact_capture: Arc::new(contact_capture),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            widgets: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Mount a new widget; the greeting is already in its transcript
    pub async fn create(&self, config: WidgetConfig) -> (String, Arc<WidgetHandle>) {
        let widget_id = uuid::Uuid::new_v4().to_string();
        let (command_tx, command_rx) = mpsc::channel(8);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (snapshot_tx, snapshot_rx) = watch::channel(WidgetSnapshot::default());
        let closed = CancellationToken::new();
        let in_flight = Arc::new(AtomicBool::new(false));

        let runtime = WidgetRuntime::new(
            WidgetContext::new(&widget_id, config.normalized()),
            Arc::clone(&self.knowledge_base),
            Arc::clone(&self.contact_capture),
            broadcast_tx.clone(),
            snapshot_tx,
            closed.clone(),
            Arc::clone(&in_flight),
        );
        tokio::spawn(runtime.run(command_rx));

        let handle = Arc::new(WidgetHandle {
            command_tx,
            snapshot_rx,
            broadcast_tx,
            closed,
            in_flight,
            last_activity: Mutex::new(Instant::now()),
        });

        let active = {
            let mut widgets = self.widgets.write().await;
            widgets.insert(widget_id.clone(), Arc::clone(&handle));
            widgets.len()
        };
        tracing::info!(widget_id = %widget_id, active, "Widget created");

        (widget_id, handle)
    }

    pub async fn get(&self, widget_id: &str) -> Option<Arc<WidgetHandle>> {
        self.widgets.read().await.get(widget_id).cloned()
    }

    /// Unmount a widget. Returns false if it did not exist.
    pub async fn remove(&self, widget_id: &str) -> bool {
        let removed = self.widgets.write().await.remove(widget_id);
        match removed {
            Some(handle) => {
                handle.close();
                tracing::info!(widget_id = %widget_id, "Widget removed");
                true
            }
            None => false,
        }
    }

    /// Unmount every idle widget. Returns how many were evicted.
    pub async fn evict_idle(&self) -> usize {
        let evicted: Vec<(String, Arc<WidgetHandle>)> = {
            let mut widgets = self.widgets.write().await;
            let idle: Vec<String> = widgets
                .iter()
                .filter(|(_, handle)| handle.is_idle(self.idle_timeout))
                .map(|(id, _)| id.clone())
                .collect();
            idle.into_iter()
                .filter_map(|id| widgets.remove(&id).map(|handle| (id, handle)))
                .collect()
        };

        for (widget_id, handle) in &evicted {
            handle.close();
            tracing::info!(widget_id = %widget_id, "Idle widget evicted");
        }
        evicted.len()
    }

    /// Start the background sweep for idle widgets. Stops once the manager is dropped.
    pub fn start_idle_sweeper(self: &Arc<Self>, every: Duration) {
        let manager_weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                if let Some(manager) = manager_weak.upgrade() {
                    manager.evict_idle().await;
                } else {
                    tracing::debug!("WidgetManager dropped, idle sweeper exiting");
                    break;
                }
            }
        });
    }
}
