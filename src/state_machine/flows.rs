//! Scripted flow definitions
//!
//! Each flow is a static table of `(Step, Handler)`. A handler consumes the
//! visitor's input for its step, records fields, queues effects and picks
//! the next step. Lookup is always scoped by `(flow, step)`.

use super::effect::Effect;
use super::state::{ConversationState, Flow, KnowledgeBasePurpose, PendingCall, Step, WidgetContext};
use crate::backend::ContactLead;

// ============================================================================
// Scripted Text
// ============================================================================

pub const GREETING: &str = "How may we help you today?";
pub const GREETING_WITH_QUESTIONS: &str =
    "How may we help you today? Here are some common questions:";

pub const YES: &str = "Yes";
pub const NO: &str = "No";
const YES_NO: &[&str] = &[YES, NO];

const PROPERTY_TYPES: &[&str] = &["House", "Apartment", "Condo", "Other"];
const PROPERTY_TYPE_QUESTION: &str = "What type of property are you looking for?";

const SELL_VALUATION: &str = "Schedule property valuation";
const SELL_LEARN: &str = "Learn about the selling process";
const SELL_AGENT: &str = "Talk to an agent";

const RENT_BUDGETS: &[&str] = &[
    "Under $1,000",
    "$1,000 - $2,000",
    "$2,000 - $3,000",
    "Above $3,000",
];

pub const AGENT_PROMPT: &str =
    "Would you like to speak with one of our agents for more information?";
pub const ADDITIONAL_HELP_PROMPT: &str = "Is there anything else you'd like help with?";
pub const DESCRIBE_QUERY_PROMPT: &str = "Please describe what you'd like to know:";
pub const GOODBYE: &str = "Thank you for your interest. Have a great day!";
pub const NO_ANSWER: &str = "Sorry, we can't help with that.";

pub const EMAIL_PROMPT: &str = "Please provide your email address:";
pub const PHONE_PROMPT: &str = "Please provide your phone number:";
pub const NAME_PROMPT: &str = "What is your name?";
pub const TIME_PROMPT: &str = "What is the best time for our agent to contact you?";
pub const CAPTURE_OK: &str =
    "Thank you! Our agent will contact you soon using the details you provided.";
pub const CAPTURE_FAILED: &str =
    "There was an issue saving your information. Our agent will still contact you.";

/// Topic sent to the knowledge base when a seller asks about the process
pub const SELLING_PROCESS_QUERY: &str = "selling process";
pub const SELLING_PROCESS_STEPS: &str = "Here are the key steps in our selling process:\n\
1. Property Valuation\n\
2. Market Analysis\n\
3. Property Marketing\n\
4. Viewings & Offers\n\
5. Sale Completion\n\
\n\
Would you like to speak with an agent to learn more?";

// ============================================================================
// Turn
// ============================================================================

/// Working copy of the state for one transition, plus the effects it queues
pub(crate) struct Turn<'a> {
    pub state: ConversationState,
    pub context: &'a WidgetContext,
    pub effects: Vec<Effect>,
}

impl<'a> Turn<'a> {
    pub fn new(state: ConversationState, context: &'a WidgetContext) -> Self {
        Self {
            state,
            context,
            effects: Vec::new(),
        }
    }

    fn say(&mut self, content: &str) {
        self.effects.push(Effect::say(content));
    }

    fn ask(&mut self, content: &str, options: &[&str]) {
        self.effects.push(Effect::ask(content, options));
    }

    fn goto(&mut self, step: Step) {
        self.state.step = step;
    }

    pub fn query_knowledge_base(&mut self, query: &str, purpose: KnowledgeBasePurpose) {
        self.state.pending = Some(PendingCall::KnowledgeBase { purpose });
        self.effects.push(Effect::QueryKnowledgeBase {
            query: query.to_string(),
        });
    }

    fn capture_contact(&mut self) {
        let lead = ContactLead::from_fields(
            self.state.flow.unwrap_or(Flow::Other),
            &self.state.fields,
            self.context.config.owner_id.clone(),
        );
        self.state.pending = Some(PendingCall::ContactCapture);
        self.effects.push(Effect::CaptureContact { lead });
    }

    /// Offer a human agent with Yes/No
    pub fn agent_prompt(&mut self) {
        self.ask(AGENT_PROMPT, YES_NO);
        self.goto(Step::AgentContactPrompt);
    }

    /// Enter the shared email -> phone -> name -> time suffix
    fn collect_contact_details(&mut self) {
        self.say(EMAIL_PROMPT);
        self.goto(Step::CollectEmail);
    }

    fn goodbye(&mut self) {
        self.say(GOODBYE);
        self.goto(Step::End);
    }

    /// Apply a finished knowledge-base lookup
    pub fn knowledge_base_answered(&mut self, purpose: KnowledgeBasePurpose, answer: Option<String>) {
        self.state.pending = None;
        match purpose {
            KnowledgeBasePurpose::Fallback => {
                match answer {
                    Some(answer) => self.say(&answer),
                    None => self.say(NO_ANSWER),
                }
                self.agent_prompt();
            }
            KnowledgeBasePurpose::SellingProcess => {
                let content = answer.unwrap_or_else(|| SELLING_PROCESS_STEPS.to_string());
                self.ask(&content, YES_NO);
                self.goto(Step::SellProcess);
            }
        }
    }

    /// Apply a finished contact capture; always terminal
    pub fn contact_capture_finished(&mut self, success: bool) {
        self.state.pending = None;
        self.say(if success { CAPTURE_OK } else { CAPTURE_FAILED });
        self.goto(Step::End);
    }
}

/// Greeting shown at mount and after every reset
pub fn greeting(context: &WidgetContext) -> Effect {
    let questions = &context.config.predefined_questions;
    let mut options: Vec<String> = Flow::all().iter().map(|f| f.label().to_string()).collect();
    let content = if questions.is_empty() {
        GREETING
    } else {
        options.extend(questions.iter().cloned());
        GREETING_WITH_QUESTIONS
    };
    Effect::AppendSystemMessage {
        content: content.to_string(),
        options: Some(options),
    }
}

// ============================================================================
// Handler Tables
// ============================================================================

pub(crate) type Handler = fn(&mut Turn<'_>, &str);

const BUY: &[(Step, Handler)] = &[
    (Step::Start, buy_start),
    (Step::LocationInput, buy_location),
    (Step::PropertyTypeSelection, buy_property_type),
    (Step::PropertyDescription, buy_property_description),
    (Step::AgentContactPrompt, agent_contact_with_followup),
    (Step::AdditionalHelp, additional_help),
    (Step::CheckKnowledgeBase, check_knowledge_base),
    (Step::CollectEmail, collect_email),
    (Step::CollectPhone, collect_phone),
    (Step::CollectName, collect_name),
    (Step::CollectTime, collect_time),
];

const SELL: &[(Step, Handler)] = &[
    (Step::Start, sell_start),
    (Step::SellLocationInput, sell_location),
    (Step::SellOptions, sell_options),
    (Step::SellValuation, sell_valuation),
    (Step::SellProcess, sell_process),
    (Step::CollectEmail, collect_email),
    (Step::CollectPhone, collect_phone),
    (Step::CollectName, collect_name),
    (Step::CollectTime, collect_time),
];

const RENT: &[(Step, Handler)] = &[
    (Step::Start, rent_start),
    (Step::RentBudget, rent_budget),
    (Step::RentLocation, rent_location),
    (Step::RentType, rent_type),
    (Step::AgentContactPrompt, agent_contact_with_followup),
    (Step::AdditionalHelp, additional_help),
    (Step::CheckKnowledgeBase, check_knowledge_base),
    (Step::CollectEmail, collect_email),
    (Step::CollectPhone, collect_phone),
    (Step::CollectName, collect_name),
    (Step::CollectTime, collect_time),
];

const OTHER: &[(Step, Handler)] = &[
    (Step::Start, other_start),
    (Step::GeneralQuery, general_query),
    (Step::AgentContactPrompt, agent_contact_or_goodbye),
    (Step::CollectEmail, collect_email),
    (Step::CollectPhone, collect_phone),
    (Step::CollectName, collect_name),
    (Step::CollectTime, collect_time),
];

pub(crate) fn table(flow: Flow) -> &'static [(Step, Handler)] {
    match flow {
        Flow::Buy => BUY,
        Flow::Sell => SELL,
        Flow::Rent => RENT,
        Flow::Other => OTHER,
    }
}

/// Resolve the handler for `(flow, step)`
pub(crate) fn handler(flow: Flow, step: Step) -> Option<Handler> {
    table(flow)
        .iter()
        .find(|(s, _)| *s == step)
        .map(|(_, h)| *h)
}

// ============================================================================
// Buy
// ============================================================================

fn buy_start(turn: &mut Turn<'_>, _input: &str) {
    turn.say("Great! Let me help you find your dream home. What location are you interested in?");
    turn.goto(Step::LocationInput);
}

fn buy_location(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.location = Some(input.to_string());
    turn.ask(PROPERTY_TYPE_QUESTION, PROPERTY_TYPES);
    turn.goto(Step::PropertyTypeSelection);
}

fn buy_property_type(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.property_type = Some(input.to_string());
    if input == "Other" {
        turn.say("Please describe the type of property you're looking for:");
        turn.goto(Step::PropertyDescription);
    } else {
        turn.agent_prompt();
    }
}

fn buy_property_description(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.property_type = Some(input.to_string());
    turn.agent_prompt();
}

// ============================================================================
// Sell
// ============================================================================

fn sell_start(turn: &mut Turn<'_>, _input: &str) {
    turn.say("Great, where is the property located?");
    turn.goto(Step::SellLocationInput);
}

fn sell_location(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.location = Some(input.to_string());
    turn.ask(
        "Would you like to schedule a property valuation or learn more about the selling process?",
        &[SELL_VALUATION, SELL_LEARN, SELL_AGENT],
    );
    turn.goto(Step::SellOptions);
}

fn sell_options(turn: &mut Turn<'_>, input: &str) {
    match input {
        SELL_VALUATION => {
            turn.say("When would be a good time for the valuation?");
            turn.goto(Step::SellValuation);
        }
        SELL_LEARN => {
            turn.query_knowledge_base(SELLING_PROCESS_QUERY, KnowledgeBasePurpose::SellingProcess);
        }
        _ => turn.collect_contact_details(),
    }
}

fn sell_valuation(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.valuation_time = Some(input.to_string());
    turn.collect_contact_details();
}

fn sell_process(turn: &mut Turn<'_>, input: &str) {
    if input == YES {
        turn.collect_contact_details();
    } else {
        turn.goodbye();
    }
}

// ============================================================================
// Rent
// ============================================================================

fn rent_start(turn: &mut Turn<'_>, _input: &str) {
    turn.ask(
        "I can help you find the perfect rental. What is your preferred monthly budget?",
        RENT_BUDGETS,
    );
    turn.goto(Step::RentBudget);
}

fn rent_budget(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.budget = Some(input.to_string());
    turn.say("Great! Which location are you interested in?");
    turn.goto(Step::RentLocation);
}

fn rent_location(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.location = Some(input.to_string());
    turn.ask(PROPERTY_TYPE_QUESTION, PROPERTY_TYPES);
    turn.goto(Step::RentType);
}

fn rent_type(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.property_type = Some(input.to_string());
    turn.agent_prompt();
}

// ============================================================================
// Other
// ============================================================================

fn other_start(turn: &mut Turn<'_>, _input: &str) {
    turn.say("Sure, what would you like to know?");
    turn.goto(Step::GeneralQuery);
}

fn general_query(turn: &mut Turn<'_>, input: &str) {
    turn.query_knowledge_base(input, KnowledgeBasePurpose::Fallback);
}

fn agent_contact_or_goodbye(turn: &mut Turn<'_>, input: &str) {
    if input == YES {
        turn.collect_contact_details();
    } else {
        turn.goodbye();
    }
}

// ============================================================================
// Shared Steps
// ============================================================================

fn agent_contact_with_followup(turn: &mut Turn<'_>, input: &str) {
    if input == YES {
        turn.collect_contact_details();
    } else {
        turn.ask(ADDITIONAL_HELP_PROMPT, YES_NO);
        turn.goto(Step::AdditionalHelp);
    }
}

fn additional_help(turn: &mut Turn<'_>, input: &str) {
    if input == YES {
        turn.say(DESCRIBE_QUERY_PROMPT);
        turn.goto(Step::CheckKnowledgeBase);
    } else {
        turn.goodbye();
    }
}

fn check_knowledge_base(turn: &mut Turn<'_>, input: &str) {
    turn.query_knowledge_base(input, KnowledgeBasePurpose::Fallback);
}

fn collect_email(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.email = Some(input.to_string());
    turn.say(PHONE_PROMPT);
    turn.goto(Step::CollectPhone);
}

fn collect_phone(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.phone = Some(input.to_string());
    turn.say(NAME_PROMPT);
    turn.goto(Step::CollectName);
}

fn collect_name(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.name = Some(input.to_string());
    turn.say(TIME_PROMPT);
    turn.goto(Step::CollectTime);
}

fn collect_time(turn: &mut Turn<'_>, input: &str) {
    turn.state.fields.contact_time = Some(input.to_string());
    turn.capture_contact();
}
