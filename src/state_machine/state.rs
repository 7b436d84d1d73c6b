//! Conversation state types

use crate::config::WidgetConfig;
use serde::{Deserialize, Serialize};

// ============================================================================
// Flows and Steps
// ============================================================================

/// Top-level intent chosen by the visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flow {
    Buy,
    Sell,
    Rent,
    Other,
}

impl Flow {
    pub fn all() -> [Flow; 4] {
        [Flow::Buy, Flow::Sell, Flow::Rent, Flow::Other]
    }

    /// Quick-reply label that selects this flow from the greeting
    pub fn label(self) -> &'static str {
        match self {
            Flow::Buy => "Buy a Property",
            Flow::Sell => "Sell a Property",
            Flow::Rent => "Rent a Property",
            Flow::Other => "Other",
        }
    }

    pub fn from_label(label: &str) -> Option<Flow> {
        Flow::all().into_iter().find(|flow| flow.label() == label)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Flow::Buy => "BUY",
            Flow::Sell => "SELL",
            Flow::Rent => "RENT",
            Flow::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node within a flow. The same step may appear in several flows; it is
/// only meaningful together with the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Step {
    #[default]
    Initial,
    Start,

    // Buy
    LocationInput,
    PropertyTypeSelection,
    PropertyDescription,

    // Sell
    SellLocationInput,
    SellOptions,
    SellValuation,
    SellProcess,

    // Rent
    RentBudget,
    RentLocation,
    RentType,

    // Other
    GeneralQuery,

    // Shared follow-ups
    AgentContactPrompt,
    AdditionalHelp,
    CheckKnowledgeBase,

    // Contact collection
    CollectEmail,
    CollectPhone,
    CollectName,
    CollectTime,

    End,
}

impl Step {
    /// Terminal step: the next input resets the conversation
    pub fn is_terminal(self) -> bool {
        matches!(self, Step::End)
    }
}

// ============================================================================
// Lead Fields
// ============================================================================

/// Partial lead record, filled in as steps complete
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_time: Option<String>,
}

impl LeadFields {
    /// Number of populated fields
    pub fn filled(&self) -> usize {
        [
            &self.location,
            &self.property_type,
            &self.budget,
            &self.valuation_time,
            &self.email,
            &self.phone,
            &self.name,
            &self.contact_time,
        ]
        .iter()
        .filter(|f| f.is_some())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }
}

// ============================================================================
// Pending External Calls
// ============================================================================

/// What a knowledge-base answer will be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeBasePurpose {
    /// Free-form question: answer (or apology) then offer an agent
    Fallback,
    /// Seller asked about the selling process
    SellingProcess,
}

/// An external call the conversation is suspended on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PendingCall {
    KnowledgeBase { purpose: KnowledgeBasePurpose },
    ContactCapture,
}

// ============================================================================
// Conversation State
// ============================================================================

/// Mutable dialogue state of one widget instance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// `None` until the visitor picks a flow
    pub flow: Option<Flow>,
    pub step: Step,
    pub fields: LeadFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingCall>,
}

impl ConversationState {
    /// Suspended on an external call
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }
}

/// Context for a widget instance (immutable configuration)
#[derive(Debug, Clone)]
pub struct WidgetContext {
    pub widget_id: String,
    pub config: WidgetConfig,
}

impl WidgetContext {
    pub fn new(widget_id: impl Into<String>, config: WidgetConfig) -> Self {
        Self {
            widget_id: widget_id.into(),
            config,
        }
    }
}
