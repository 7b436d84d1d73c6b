//! Widget runtime executor

use super::traits::{ContactCaptureClient, KnowledgeBaseClient};
use super::{TranscriptEvent, WidgetCommand, WidgetError, WidgetSnapshot};
use crate::config::WidgetConfig;
use crate::state_machine::{
    initial_effects, transition, ConversationState, Effect, Event, WidgetContext,
};
use crate::tone::format_by_tone;
use crate::transcript::{Message, Transcript};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

/// One embedded widget: its conversation, transcript and collaborators.
/// Runs as its own task so a caller going away never strands a pending call.
pub struct WidgetRuntime<K, C>
where
    K: KnowledgeBaseClient + 'static,
    C: ContactCaptureClient + 'static,
{
    context: WidgetContext,
    state: ConversationState,
    transcript: Transcript,
    knowledge_base: Arc<K>,
    contact_capture: Arc<C>,
    broadcast_tx: broadcast::Sender<TranscriptEvent>,
    /// Render state readable without waiting on this task
    snapshot_tx: watch::Sender<WidgetSnapshot>,
    /// Cancelled when the host tears the widget down
    closed: CancellationToken,
    /// Set by the handle when a command is accepted, cleared here when it completes
    in_flight: Arc<AtomicBool>,
}

impl<K, C> WidgetRuntime<K, C>
where
    K: KnowledgeBaseClient + 'static,
    C: ContactCaptureClient + 'static,
{
    pub fn new(
        context: WidgetContext,
        knowledge_base: Arc<K>,
        contact_capture: Arc<C>,
        broadcast_tx: broadcast::Sender<TranscriptEvent>,
        snapshot_tx: watch::Sender<WidgetSnapshot>,
        closed: CancellationToken,
        in_flight: Arc<AtomicBool>,
    ) -> Self {
        let mut runtime = Self {
            context,
            state: ConversationState::default(),
            transcript: Transcript::new(),
            knowledge_base,
            contact_capture,
            broadcast_tx,
            snapshot_tx,
            closed,
            in_flight,
        };
        runtime.greet();
        runtime
    }

    /// Process commands until the widget is closed or every handle is gone
    pub async fn run(mut self, mut commands: mpsc::Receiver<WidgetCommand>) {
        tracing::debug!(widget_id = %self.context.widget_id, "Starting widget runtime");

        loop {
            let command = tokio::select! {
                () = self.closed.cancelled() => None,
                command = commands.recv() => command,
            };
            let Some(command) = command else { break };
            self.handle_command(command).await;
        }

        tracing::debug!(widget_id = %self.context.widget_id, "Widget runtime stopped");
    }

    async fn handle_command(&mut self, command: WidgetCommand) {
        match command {
            WidgetCommand::Submit { text, reply } => {
                let result = self.submit(&text).await.map(|()| self.snapshot());
                self.complete(reply, result);
            }
            WidgetCommand::Reinitialize { config, reply } => {
                let result = self.reinitialize(config).map(|()| self.snapshot());
                self.complete(reply, result);
            }
        }
    }

    fn complete(
        &self,
        reply: oneshot::Sender<Result<WidgetSnapshot, WidgetError>>,
        result: Result<WidgetSnapshot, WidgetError>,
    ) {
        if let Err(e) = &result {
            let _ = self.broadcast_tx.send(TranscriptEvent::Error {
                message: e.to_string(),
            });
        }
        self.in_flight.store(false, Ordering::Release);
        // The caller may have gone away; the conversation has still advanced
        let _ = reply.send(result);
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        WidgetSnapshot {
            widget_id: self.context.widget_id.clone(),
            display_name: self.context.config.display_name.clone(),
            flow: self.state.flow,
            step: self.state.step,
            fields: self.state.fields.clone(),
            messages: self.transcript.messages().to_vec(),
            input_disabled: self.transcript.input_disabled() || self.state.is_busy(),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    /// Feed one visitor input through the engine, running any external calls
    pub async fn submit(&mut self, input: &str) -> Result<(), WidgetError> {
        if self.closed.is_cancelled() {
            return Err(WidgetError::Closed);
        }
        if input.trim().is_empty() {
            return Err(WidgetError::EmptyInput);
        }
        if !self.transcript.accepts(input) {
            return Err(WidgetError::OptionRequired {
                options: self
                    .transcript
                    .pending_options()
                    .map(<[String]>::to_vec)
                    .unwrap_or_default(),
            });
        }

        tracing::debug!(
            widget_id = %self.context.widget_id,
            step = ?self.state.step,
            "Processing submit"
        );
        self.process_event(Event::user_input(input)).await
    }

    /// Replace configuration and start a fresh conversation
    pub fn reinitialize(&mut self, config: WidgetConfig) -> Result<(), WidgetError> {
        if self.closed.is_cancelled() {
            return Err(WidgetError::Closed);
        }
        tracing::info!(widget_id = %self.context.widget_id, "Reinitializing widget");
        self.context.config = config;
        self.state = ConversationState::default();
        self.transcript = Transcript::new();
        self.publish();
        let _ = self.broadcast_tx.send(TranscriptEvent::Reset);
        self.greet();
        Ok(())
    }

    fn greet(&mut self) {
        for effect in initial_effects(&self.context) {
            if let Effect::AppendSystemMessage { content, options } = effect {
                self.append_system(&content, options);
            }
        }
    }

    async fn process_event(&mut self, event: Event) -> Result<(), WidgetError> {
        // Completion events from external calls are chained here, no recursion
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let result = transition(&self.state, &self.context, current_event)?;

            let old_step = self.state.step;
            self.state = result.new_state;
            if old_step != self.state.step {
                tracing::debug!(
                    widget_id = %self.context.widget_id,
                    flow = ?self.state.flow,
                    from = ?old_step,
                    to = ?self.state.step,
                    "Step transition"
                );
            }
            self.publish();

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await? {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(&mut self, effect: Effect) -> Result<Option<Event>, WidgetError> {
        match effect {
            Effect::AppendUserMessage { text } => {
                self.append(Message::user(text));
                Ok(None)
            }

            Effect::AppendSystemMessage { content, options } => {
                self.append_system(&content, options);
                Ok(None)
            }

            Effect::ConversationReset => {
                tracing::info!(widget_id = %self.context.widget_id, "Conversation reset");
                Ok(None)
            }

            Effect::QueryKnowledgeBase { query } => {
                let knowledge_base = Arc::clone(&self.knowledge_base);
                let owner_id = self.context.config.owner_id.clone();
                let answer = tokio::select! {
                    () = self.closed.cancelled() => None,
                    answer = knowledge_base.query(&query, owner_id.as_deref()) => Some(answer),
                };
                match answer {
                    Some(answer) => Ok(Some(Event::KnowledgeBaseAnswered { answer })),
                    None => self.discard("knowledge base answer"),
                }
            }

            Effect::CaptureContact { lead } => {
                let contact_capture = Arc::clone(&self.contact_capture);
                let outcome = tokio::select! {
                    () = self.closed.cancelled() => None,
                    result = contact_capture.capture(&lead) => Some(result),
                };
                match outcome {
                    Some(Ok(())) => Ok(Some(Event::ContactCaptureFinished { success: true })),
                    Some(Err(e)) => {
                        tracing::warn!(
                            widget_id = %self.context.widget_id,
                            flow = %lead.flow,
                            error = %e,
                            "Lead not saved, continuing with apology"
                        );
                        Ok(Some(Event::ContactCaptureFinished { success: false }))
                    }
                    None => self.discard("contact capture result"),
                }
            }
        }
    }

    fn append_system(&mut self, content: &str, options: Option<Vec<String>>) {
        let content = format_by_tone(content, self.context.config.tone);
        self.append(Message::system(content, options));
    }

    /// Publish before broadcasting so a new subscriber never misses a message
    fn append(&mut self, message: Message) {
        let message = self.transcript.append(message).clone();
        self.publish();
        let _ = self.broadcast_tx.send(TranscriptEvent::Message { message });
    }

    /// The widget went away mid-call; drop the result untouched
    fn discard(&self, what: &str) -> Result<Option<Event>, WidgetError> {
        tracing::info!(
            widget_id = %self.context.widget_id,
            what,
            "Widget closed during external call, discarding result"
        );
        Err(WidgetError::Closed)
    }
}
