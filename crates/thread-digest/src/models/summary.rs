//! Per-conversation output handed to the classifier and the dashboard

use serde::{Deserialize, Serialize};

use crate::billing::ElapsedDelta;

/// Whether every participant sits on the organization's domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreadScope {
    #[serde(rename = "INTERNAL THREAD")]
    Internal,
    #[serde(rename = "EXTERNAL THREAD")]
    External,
}

impl ThreadScope {
    pub fn label(&self) -> &'static str {
        match self {
            ThreadScope::Internal => "INTERNAL THREAD",
            ThreadScope::External => "EXTERNAL THREAD",
        }
    }
}

/// Coarse keyword-derived status of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversationStatus {
    #[serde(rename = "Approved / Closed")]
    Approved,
    #[serde(rename = "Awaiting review/approval")]
    AwaitingReview,
    #[serde(rename = "Issue / Rejection noted")]
    IssueNoted,
    #[serde(rename = "General business communication")]
    General,
}

impl ConversationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConversationStatus::Approved => "Approved / Closed",
            ConversationStatus::AwaitingReview => "Awaiting review/approval",
            ConversationStatus::IssueNoted => "Issue / Rejection noted",
            ConversationStatus::General => "General business communication",
        }
    }
}

/// First contact with billing, the first reply after it, and the gap between them.
///
/// When billing started the conversation, `first_contact` holds billing's own
/// first message and `first_response` the first reply from someone else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingResponseWindow {
    pub first_contact: Option<String>,
    pub first_response: Option<String>,
    pub elapsed: Option<ElapsedDelta>,
    /// True when the window was filled from a billing-initiated exchange
    pub billing_initiated: bool,
}

/// Final per-conversation summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub name: String,
    pub month: String,
    pub conversation_id: String,
    pub subject: String,
    /// Length-capped rendering
    pub summary: String,
    /// Unabridged rendering
    pub summary_full: String,
    pub first_email_to_billing: Option<String>,
    pub first_response_from_billing: Option<String>,
    pub time_delta: Option<ElapsedDelta>,
    pub scope: ThreadScope,
    /// Last activity, `DD/MM/YYYY - HH:MM`
    pub timestamp: Option<String>,
    pub message_count: usize,
    pub status: ConversationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_wire_names() {
        for scope in [ThreadScope::Internal, ThreadScope::External] {
            let json = serde_json::to_value(scope).unwrap();
            assert_eq!(json, scope.label());
        }
        for status in [
            ConversationStatus::Approved,
            ConversationStatus::AwaitingReview,
            ConversationStatus::IssueNoted,
            ConversationStatus::General,
        ] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.label());
        }
    }
}
