//! Batch driver: raw records in, sorted conversation digests out

use std::cmp::Ordering;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::group::{ConversationGroup, group_by_conversation, merge_group};
use crate::models::{ConversationSummary, DecomposedMessage, RawEmailRecord};
use crate::summary::{BatchStats, summarize_conversation};
use crate::text::parse_timestamp;

/// Ordering of summaries by last activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Options for a batch run
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Keep at most this many summaries after sorting
    pub max_summaries: Option<usize>,
    pub sort_order: SortOrder,
    /// Compute [`BatchStats`] over every summary before truncation
    pub include_stats: bool,
}

/// Summary of one conversation plus its canonical message sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDigest {
    #[serde(flatten)]
    pub summary: ConversationSummary,
    pub decomposed_messages: Vec<DecomposedMessage>,
}

/// Result of a batch run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestOutput {
    pub summaries: Vec<ConversationDigest>,
    /// Total conversations before truncation
    pub total_conversations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<BatchStats>,
    /// Duration of the batch run
    pub duration_ms: u64,
}

/// Run decompose, merge, extract and summarize for one group
pub fn process_group(group: &ConversationGroup, config: &EngineConfig) -> ConversationDigest {
    let canonical = merge_group(group);
    debug!(
        "Conversation {}: {} records merged into {} messages",
        canonical.conversation_id.as_str(),
        group.records.len(),
        canonical.message_count()
    );
    let summary = summarize_conversation(&canonical, config);
    ConversationDigest {
        summary,
        decomposed_messages: canonical.messages,
    }
}

/// Summarize a batch of raw records.
///
/// Conversations are processed in parallel and then sorted by last activity;
/// summaries without a parseable timestamp go last and ties fall back to the
/// conversation id.
pub fn process_records(
    records: Vec<RawEmailRecord>,
    config: &EngineConfig,
    options: &SummaryOptions,
) -> DigestOutput {
    let start = std::time::Instant::now();
    let record_count = records.len();

    let groups = group_by_conversation(records);
    info!(
        "Processing {} records in {} conversations",
        record_count,
        groups.len()
    );

    let mut digests: Vec<ConversationDigest> = groups
        .par_iter()
        .map(|group| process_group(group, config))
        .collect();

    digests.sort_by(|a, b| compare_digests(a, b, options.sort_order));

    let stats = options.include_stats.then(|| {
        let summaries: Vec<ConversationSummary> =
            digests.iter().map(|d| d.summary.clone()).collect();
        BatchStats::from_summaries(&summaries)
    });

    let total_conversations = digests.len();
    if let Some(max) = options.max_summaries.filter(|&max| max < total_conversations) {
        info!("Showing {max} of {total_conversations} conversations");
        digests.truncate(max);
    }

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Summarized {} conversations in {}ms",
        total_conversations, duration_ms
    );

    DigestOutput {
        summaries: digests,
        total_conversations,
        stats,
        duration_ms,
    }
}

fn compare_digests(a: &ConversationDigest, b: &ConversationDigest, order: SortOrder) -> Ordering {
    let instant = |d: &ConversationDigest| d.summary.timestamp.as_deref().and_then(parse_timestamp);

    let by_time = match (instant(a), instant(b)) {
        (Some(x), Some(y)) => match order {
            SortOrder::NewestFirst => y.cmp(&x),
            SortOrder::OldestFirst => x.cmp(&y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_time.then_with(|| a.summary.conversation_id.cmp(&b.summary.conversation_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, received: &str) -> RawEmailRecord {
        RawEmailRecord::builder(id)
            .subject("Invoice")
            .received(received)
            .from(&["jane.doe@acme.com"])
            .to(&["billing@gep.com"])
            .body(format!("Message in {id}"))
            .build()
    }

    fn ids(output: &DigestOutput) -> Vec<&str> {
        output
            .summaries
            .iter()
            .map(|d| d.summary.conversation_id.as_str())
            .collect()
    }

    #[test]
    fn test_sorting_and_truncation() {
        let records = vec![
            record("a", "2025-10-01T09:00:00Z"),
            record("b", "2025-10-03T09:00:00Z"),
            record("c", "garbage"),
            record("d", "2025-10-02T09:00:00Z"),
            record("e", "2025-10-02T09:00:00Z"),
        ];
        let config = EngineConfig::default();

        let newest = process_records(records.clone(), &config, &SummaryOptions::default());
        assert_eq!(ids(&newest), vec!["b", "d", "e", "a", "c"]);
        assert!(newest.stats.is_none());

        let oldest = process_records(
            records,
            &config,
            &SummaryOptions {
                max_summaries: Some(2),
                sort_order: SortOrder::OldestFirst,
                include_stats: true,
            },
        );
        assert_eq!(ids(&oldest), vec!["a", "d"]);
        assert_eq!(oldest.total_conversations, 5);
        assert_eq!(oldest.stats.unwrap().total_conversations, 5);
    }

    #[test]
    fn test_digest_flattens_summary() {
        let output = process_records(
            vec![record("a", "2025-10-01T09:00:00Z")],
            &EngineConfig::default(),
            &SummaryOptions::default(),
        );
        let json = serde_json::to_value(&output).unwrap();
        let digest = &json["summaries"][0];
        assert_eq!(digest["conversationId"], "a");
        assert_eq!(digest["messageCount"], 1);
        assert_eq!(digest["decomposedMessages"][0]["isOriginal"], true);
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn test_empty_input() {
        let output = process_records(Vec::new(), &EngineConfig::default(), &SummaryOptions::default());
        assert!(output.summaries.is_empty());
        assert_eq!(output.total_conversations, 0);
    }
}
