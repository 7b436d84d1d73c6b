//! Lead-qualification flow engine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! `(state, event) -> (state, effects)`. The runtime executes effects and
//! feeds completion events back in.

mod effect;
pub mod event;
pub(crate) mod flows;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ConversationState, Flow, LeadFields, Step, WidgetContext};
pub use transition::{initial_effects, transition, TransitionError};
