//! Grouping raw records by conversation and merging their decompositions

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::participants::{ParticipantBlock, build_participant_index};
use crate::decompose::decompose_record;
use crate::models::{ConversationId, DecomposedMessage, RawEmailRecord};

/// All raw records sharing one conversation identifier, in fetch order
#[derive(Debug, Clone)]
pub struct ConversationGroup {
    pub conversation_id: ConversationId,
    pub records: Vec<RawEmailRecord>,
}

/// Merged, deduplicated and chronologically sorted view of one conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalConversation {
    pub conversation_id: ConversationId,
    /// Assignee name from the group's first record
    pub name: String,
    /// Reporting month from the group's first record
    pub month: String,
    pub participants: Vec<ParticipantBlock>,
    pub messages: Vec<DecomposedMessage>,
}

impl CanonicalConversation {
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

/// Group records by conversation id, keeping first-appearance order of ids.
///
/// Records without an id share the `UNKNOWN_CONVERSATION_ID` bucket.
pub fn group_by_conversation(records: Vec<RawEmailRecord>) -> Vec<ConversationGroup> {
    let mut groups: Vec<ConversationGroup> = Vec::new();
    let mut by_id: HashMap<ConversationId, usize> = HashMap::new();

    for record in records {
        let id = record.conversation_id();
        if record.conversation_id.as_deref().is_none_or(|raw| raw.trim().is_empty()) {
            warn!("Record without conversationId bucketed under {}", id.as_str());
        }

        let slot = match by_id.get(&id) {
            Some(&slot) => slot,
            None => {
                by_id.insert(id.clone(), groups.len());
                groups.push(ConversationGroup {
                    conversation_id: id,
                    records: Vec::new(),
                });
                groups.len() - 1
            }
        };
        groups[slot].records.push(record);
    }

    groups
}

/// Decompose every record of a group and merge the results.
///
/// First occurrence of a duplicate key wins. Only messages recovered from the
/// first record with a body keep `is_original`.
pub fn merge_group(group: &ConversationGroup) -> CanonicalConversation {
    let participants = build_participant_index(&group.records);

    let mut seen = HashSet::new();
    let mut messages = Vec::new();
    let mut original_source = None;

    for (index, record) in group.records.iter().enumerate() {
        if !record.has_body() {
            debug!(
                "Skipping empty record {} of conversation {}",
                index,
                group.conversation_id.as_str()
            );
            continue;
        }
        let first_with_body = *original_source.get_or_insert(index);

        for mut message in decompose_record(record) {
            if !seen.insert(message.dedup_key()) {
                continue;
            }
            message.source_index_in_group = index;
            message.is_original = message.is_original && index == first_with_body;
            messages.push(message);
        }
    }

    // Stable; unparseable timestamps sort first, equal instants keep first-seen order
    messages.sort_by_key(|m| m.instant());
    for (idx, message) in messages.iter_mut().enumerate() {
        message.id = idx + 1;
    }

    let (name, month) = group
        .records
        .first()
        .map(|r| (r.name.clone(), r.month.clone()))
        .unwrap_or_default();

    CanonicalConversation {
        conversation_id: group.conversation_id.clone(),
        name,
        month,
        participants,
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_CONVERSATION_ID;

    fn record(id: &str, received: &str, body: &str) -> RawEmailRecord {
        RawEmailRecord::builder(id)
            .subject("Invoice 1001")
            .received(received)
            .from(&["jane.doe@acme.com"])
            .to(&["billing@gep.com"])
            .body(body)
            .assignee("Pinky", "October")
            .build()
    }

    #[test]
    fn test_group_by_conversation_keeps_first_appearance_order() {
        let mut orphan = record("x", "2025-10-01T09:00:00Z", "hi");
        orphan.conversation_id = None;

        let groups = group_by_conversation(vec![
            record("b", "2025-10-01T09:00:00Z", "one"),
            record("a", "2025-10-01T09:00:00Z", "two"),
            orphan,
            record("b", "2025-10-01T10:00:00Z", "three"),
        ]);

        let ids: Vec<&str> = groups.iter().map(|g| g.conversation_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", UNKNOWN_CONVERSATION_ID]);
        assert_eq!(groups[0].records.len(), 2);
    }

    #[test]
    fn test_merge_dedups_across_records() {
        let quoted = "\
Thanks for the quick reply.

From: Jane Doe <jane.doe@acme.com>
Sent: Wednesday, October 1, 2025 9:00 AM
To: billing@gep.com
Subject: Invoice 1001

Please process invoice 1001.
";
        let group = ConversationGroup {
            conversation_id: ConversationId::new("conv-1"),
            records: vec![
                record("conv-1", "2025-10-01T12:00:00Z", quoted),
                record("conv-1", "2025-10-01T13:00:00Z", quoted),
            ],
        };

        let canonical = merge_group(&group);
        // the second record's quoted message is a duplicate; its preamble is not,
        // because it carries a different received time
        assert_eq!(canonical.message_count(), 3);
        let ids: Vec<usize> = canonical.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(canonical.messages[0].timestamp, "01/10/2025 - 09:00");
        assert_eq!(canonical.messages[0].source_index_in_group, 0);
        assert!(canonical.messages[0].is_original);
        assert_eq!(canonical.messages[2].source_index_in_group, 1);
        assert!(!canonical.messages[2].is_original);
        assert_eq!(canonical.name, "Pinky");
        assert_eq!(canonical.month, "October");
    }

    #[test]
    fn test_merge_original_flag_comes_from_first_non_empty_record() {
        let group = ConversationGroup {
            conversation_id: ConversationId::new("conv-1"),
            records: vec![
                record("conv-1", "2025-10-01T08:00:00Z", "   "),
                record("conv-1", "2025-10-01T12:00:00Z", "Reply from later record"),
                record("conv-1", "2025-10-01T09:00:00Z", "Earlier message"),
            ],
        };

        let canonical = merge_group(&group);
        assert_eq!(canonical.message_count(), 2);
        assert_eq!(canonical.messages[0].content, "Earlier message");
        assert!(!canonical.messages[0].is_original);
        assert_eq!(canonical.messages[1].content, "Reply from later record");
        assert!(canonical.messages[1].is_original);
        assert_eq!(canonical.participants.len(), 1);
        assert_eq!(canonical.participants[0].source_indexes, vec![0, 1, 2]);
    }

    #[test]
    fn test_unparseable_timestamps_sort_first() {
        let group = ConversationGroup {
            conversation_id: ConversationId::new("conv-1"),
            records: vec![
                record("conv-1", "2025-10-01T12:00:00Z", "dated"),
                record("conv-1", "not a date", "undated"),
            ],
        };

        let canonical = merge_group(&group);
        assert_eq!(canonical.messages[0].content, "undated");
        assert_eq!(canonical.messages[0].timestamp, "");
        assert_eq!(canonical.messages[1].content, "dated");
    }
}
