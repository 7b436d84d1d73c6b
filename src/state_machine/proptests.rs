//! Property-based tests for the flow engine
//!
//! A visitor is simulated by walking the machine with random choices among
//! the offered quick replies (or random free text when none are offered),
//! and answering pending external calls with random outcomes.

use super::state::*;
use super::transition::*;
use super::*;
use crate::config::WidgetConfig;
use crate::tone::Tone;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context(questions: Vec<String>) -> WidgetContext {
    WidgetContext::new(
        "test-widget",
        WidgetConfig {
            display_name: "Test Realty".to_string(),
            tone: Tone::Friendly,
            predefined_questions: questions,
            owner_id: Some("owner".to_string()),
        },
    )
}

/// One simulated visitor action
#[derive(Debug, Clone)]
struct Action {
    pick: usize,
    free_text: String,
    outcome: bool,
}

fn arb_action() -> impl Strategy<Value = Action> {
    (any::<usize>(), "[a-zA-Z0-9@. ]{1,20}", any::<bool>()).prop_map(
        |(pick, free_text, outcome)| Action {
            pick,
            free_text,
            outcome,
        },
    )
}

fn arb_questions() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-Z][a-z ]{3,20}\\?", 0..3)
}

/// Options carried by the last system message in `effects`, if any
fn last_options(effects: &[Effect]) -> Option<Option<Vec<String>>> {
    effects.iter().rev().find_map(|e| match e {
        Effect::AppendSystemMessage { options, .. } => Some(options.clone()),
        _ => None,
    })
}

/// Walk the machine, calling `check` on every (before, event, result)
fn walk(
    context: &WidgetContext,
    actions: &[Action],
    mut check: impl FnMut(&ConversationState, &Event, &TransitionResult),
) {
    let mut state = ConversationState::default();
    let mut offered: Option<Vec<String>> = match initial_effects(context).first() {
        Some(Effect::AppendSystemMessage { options, .. }) => options.clone(),
        _ => None,
    };

    for action in actions {
        let event = match state.pending {
            Some(PendingCall::KnowledgeBase { .. }) => Event::KnowledgeBaseAnswered {
                answer: action.outcome.then(|| action.free_text.clone()),
            },
            Some(PendingCall::ContactCapture) => Event::ContactCaptureFinished {
                success: action.outcome,
            },
            None => match offered.as_deref() {
                Some(options) if !options.is_empty() => {
                    Event::user_input(options[action.pick % options.len()].clone())
                }
                _ => Event::user_input(action.free_text.clone()),
            },
        };

        let result = transition(&state, context, event.clone())
            .unwrap_or_else(|e| panic!("{e} at {:?} for {event:?}", state.step));
        check(&state, &event, &result);

        if let Some(options) = last_options(&result.effects) {
            offered = options;
        }
        state = result.new_state;
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Driving the machine the way the UI allows never errors
    #[test]
    fn prop_guided_walk_never_errors(
        questions in arb_questions(),
        actions in proptest::collection::vec(arb_action(), 1..60),
    ) {
        walk(&test_context(questions), &actions, |_, _, _| {});
    }

    /// The visitor's message is the first effect of its submit, and only there
    #[test]
    fn prop_user_message_precedes_replies(
        questions in arb_questions(),
        actions in proptest::collection::vec(arb_action(), 1..60),
    ) {
        walk(&test_context(questions), &actions, |_, event, result| {
            let user_positions: Vec<usize> = result
                .effects
                .iter()
                .enumerate()
                .filter(|(_, e)| matches!(e, Effect::AppendUserMessage { .. }))
                .map(|(i, _)| i)
                .collect();
            match event {
                Event::UserInput { text } => {
                    assert_eq!(user_positions, vec![0]);
                    assert_eq!(
                        result.effects[0],
                        Effect::AppendUserMessage { text: text.clone() }
                    );
                }
                _ => assert!(user_positions.is_empty()),
            }
        });
    }

    /// Every accepted submit makes forward progress: a reply or an external call
    #[test]
    fn prop_every_transition_produces_output(
        questions in arb_questions(),
        actions in proptest::collection::vec(arb_action(), 1..60),
    ) {
        walk(&test_context(questions), &actions, |_, _, result| {
            assert!(result.effects.iter().any(|e| matches!(
                e,
                Effect::AppendSystemMessage { .. }
                    | Effect::QueryKnowledgeBase { .. }
                    | Effect::CaptureContact { .. }
            )));
        });
    }

    /// Collected fields never disappear except on a full reset
    #[test]
    fn prop_fields_only_grow_within_a_traversal(
        questions in arb_questions(),
        actions in proptest::collection::vec(arb_action(), 1..60),
    ) {
        walk(&test_context(questions), &actions, |before, _, result| {
            let after = &result.new_state;
            if before.step == Step::End {
                assert_eq!(after, &ConversationState::default());
                assert!(result.effects.contains(&Effect::ConversationReset));
            } else {
                assert!(after.fields.filled() >= before.fields.filled());
                if before.flow.is_some() {
                    assert_eq!(after.flow, before.flow);
                }
            }
        });
    }

    /// Contact collection runs email -> phone -> name -> time -> END
    #[test]
    fn prop_contact_suffix_order(
        questions in arb_questions(),
        actions in proptest::collection::vec(arb_action(), 1..80),
    ) {
        walk(&test_context(questions), &actions, |before, _, result| {
            let expected = match before.step {
                Step::CollectEmail => Some(Step::CollectPhone),
                Step::CollectPhone => Some(Step::CollectName),
                Step::CollectName => Some(Step::CollectTime),
                _ => None,
            };
            if let Some(next) = expected {
                assert_eq!(result.new_state.step, next);
            }
            if before.step == Step::CollectTime {
                match before.pending {
                    None => {
                        assert_eq!(result.new_state.pending, Some(PendingCall::ContactCapture));
                    }
                    Some(_) => assert_eq!(result.new_state.step, Step::End),
                }
            }
        });
    }

    /// Input is rejected while an external call is outstanding
    #[test]
    fn prop_busy_rejects_input(
        questions in arb_questions(),
        actions in proptest::collection::vec(arb_action(), 1..60),
        text in "[a-z ]{1,12}",
    ) {
        let context = test_context(questions);
        walk(&context, &actions, |_, _, result| {
            if result.new_state.is_busy() {
                let err = transition(&result.new_state, &context, Event::user_input(text.clone()))
                    .unwrap_err();
                assert_eq!(err, TransitionError::Busy);
            }
        });
    }

    /// From END, any input at all resets and greets
    #[test]
    fn prop_end_always_resets(text in ".{0,40}", questions in arb_questions()) {
        let context = test_context(questions);
        let state = ConversationState {
            flow: Some(Flow::Rent),
            step: Step::End,
            fields: LeadFields {
                budget: Some("Under $1,000".to_string()),
                ..LeadFields::default()
            },
            pending: None,
        };
        let fresh = ConversationState::default();
        let greeting = initial_effects(&context);
        let result = transition(&state, &context, Event::user_input(text)).unwrap();
        prop_assert_eq!(&result.new_state, &fresh);
        prop_assert_eq!(result.effects.last(), greeting.last());
    }
}
