//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! new state and effects. All I/O is left to the runtime.

use super::effect::Effect;
use super::event::Event;
use super::flows::{self, Turn};
use super::state::{ConversationState, Flow, KnowledgeBasePurpose, PendingCall, Step, WidgetContext};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

impl Turn<'_> {
    fn finish(self) -> TransitionResult {
        TransitionResult::new(self.state).with_effects(self.effects)
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Conversation is waiting on an external call, cannot accept input")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Effects that open a fresh conversation
pub fn initial_effects(context: &WidgetContext) -> Vec<Effect> {
    vec![flows::greeting(context)]
}

/// Pure transition function
pub fn transition(
    state: &ConversationState,
    context: &WidgetContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.pending, event) {
        // A submit is already in flight
        (Some(_), Event::UserInput { .. }) => Err(TransitionError::Busy),

        (None, Event::UserInput { text }) => Ok(handle_input(state, context, &text)?
            .with_leading_user_message(text)),

        (
            Some(PendingCall::KnowledgeBase { purpose }),
            Event::KnowledgeBaseAnswered { answer },
        ) => {
            let mut turn = Turn::new(state.clone(), context);
            turn.knowledge_base_answered(purpose, answer);
            Ok(turn.finish())
        }

        (Some(PendingCall::ContactCapture), Event::ContactCaptureFinished { success }) => {
            let mut turn = Turn::new(state.clone(), context);
            turn.contact_capture_finished(success);
            Ok(turn.finish())
        }

        (pending, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} while pending {pending:?} at {:?}",
            state.step
        ))),
    }
}

impl TransitionResult {
    /// The visitor's message always precedes the replies it caused
    fn with_leading_user_message(mut self, text: String) -> Self {
        self.effects.insert(0, Effect::AppendUserMessage { text });
        self
    }
}

fn handle_input(
    state: &ConversationState,
    context: &WidgetContext,
    text: &str,
) -> Result<TransitionResult, TransitionError> {
    if state.step.is_terminal() {
        // Any input starts over, the input itself is not interpreted
        return Ok(TransitionResult::new(ConversationState::default())
            .with_effect(Effect::ConversationReset)
            .with_effects(initial_effects(context)));
    }

    match state.step {
        Step::Initial => {
            let mut turn = Turn::new(state.clone(), context);
            if let Some(flow) = Flow::from_label(text) {
                turn.state.flow = Some(flow);
                run_handler(&mut turn, flow, Step::Start, text)?;
            } else {
                // Quick questions and anything unrecognized go to the knowledge base
                turn.state.flow = Some(Flow::Other);
                turn.state.step = Step::GeneralQuery;
                turn.query_knowledge_base(text, KnowledgeBasePurpose::Fallback);
            }
            Ok(turn.finish())
        }

        step => {
            let flow = state.flow.ok_or_else(|| {
                TransitionError::InvalidTransition(format!("no flow selected at {step:?}"))
            })?;
            let mut turn = Turn::new(state.clone(), context);
            run_handler(&mut turn, flow, step, text)?;
            Ok(turn.finish())
        }
    }
}

fn run_handler(
    turn: &mut Turn<'_>,
    flow: Flow,
    step: Step,
    text: &str,
) -> Result<(), TransitionError> {
    let handler = flows::handler(flow, step).ok_or_else(|| {
        TransitionError::InvalidTransition(format!("no handler for ({flow}, {step:?})"))
    })?;
    handler(turn, text);
    Ok(())
}
