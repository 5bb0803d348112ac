//! Aggregate statistics over a batch of conversation summaries

use serde::{Deserialize, Serialize};

use crate::models::{ConversationStatus, ConversationSummary, ThreadScope};

/// How many summaries landed in each status bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub approved: usize,
    pub awaiting_review: usize,
    pub issues: usize,
    pub general: usize,
}

/// Statistics for one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub total_conversations: usize,
    pub total_messages: usize,
    pub internal_threads: usize,
    pub external_threads: usize,
    /// Conversations with a measurable billing response time
    pub conversations_with_response_time: usize,
    /// Rounded mean response time as `"{h}h {m}m"`, or `N/A`
    pub average_response_time: String,
    pub status_breakdown: StatusBreakdown,
}

impl BatchStats {
    pub fn from_summaries(summaries: &[ConversationSummary]) -> Self {
        let mut stats = Self {
            total_conversations: summaries.len(),
            ..Self::default()
        };

        let mut response_minutes = Vec::new();
        for summary in summaries {
            stats.total_messages += summary.message_count;
            match summary.scope {
                ThreadScope::Internal => stats.internal_threads += 1,
                ThreadScope::External => stats.external_threads += 1,
            }
            match summary.status {
                ConversationStatus::Approved => stats.status_breakdown.approved += 1,
                ConversationStatus::AwaitingReview => stats.status_breakdown.awaiting_review += 1,
                ConversationStatus::IssueNoted => stats.status_breakdown.issues += 1,
                ConversationStatus::General => stats.status_breakdown.general += 1,
            }
            if let Some(delta) = summary.time_delta {
                response_minutes.push(delta.total_minutes());
            }
        }

        stats.conversations_with_response_time = response_minutes.len();
        stats.average_response_time = format_average(&response_minutes);
        stats
    }
}

fn format_average(minutes: &[i64]) -> String {
    if minutes.is_empty() {
        return "N/A".to_string();
    }
    let total: i64 = minutes.iter().sum();
    let average = (total as f64 / minutes.len() as f64).round() as i64;
    if average <= 0 {
        return "N/A".to_string();
    }
    format!("{}h {}m", average / 60, average % 60)
}
