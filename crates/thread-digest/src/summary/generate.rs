//! Rendering a canonical conversation into its summary texts

use std::collections::BTreeSet;

use crate::billing::{extract_response_window, is_billing_sender};
use crate::config::EngineConfig;
use crate::decompose::{is_unknown_sender, name_from_address, sender_from_content};
use crate::group::{CanonicalConversation, ParticipantBlock};
use crate::models::{ConversationStatus, ConversationSummary, DecomposedMessage, ThreadScope};
use crate::text::{repair_mojibake, to_24_hour};

/// Messages always kept at each end of a capped conversation flow
const KEEP_AT_EACH_END: usize = 2;

/// Facts folded out of a conversation's messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationFacts {
    /// Distinct subjects, first-seen order
    pub subjects: Vec<String>,
    /// Distinct senders, first-seen order
    pub senders: Vec<String>,
    /// Business terms present, vocabulary order
    pub keywords: Vec<String>,
    pub first_timestamp: Option<String>,
    pub last_timestamp: Option<String>,
}

/// Build the summary of one canonical conversation
pub fn summarize_conversation(
    conversation: &CanonicalConversation,
    config: &EngineConfig,
) -> ConversationSummary {
    let messages = prepare_messages(&conversation.messages, &conversation.participants);
    let window = extract_response_window(&messages, &conversation.participants, config);
    let facts = collect_facts(&messages, &config.business_terms);
    let status = detect_status(&messages);

    let main_subject = messages
        .first()
        .map(|m| m.subject.clone())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "N/A".to_string());

    let all: Vec<&DecomposedMessage> = messages.iter().collect();
    let full_flow = render_flow(&all);

    let short_flow = if full_flow.chars().count() > config.summary_char_limit {
        capped_flow(&messages, config)
    } else {
        full_flow.clone()
    };

    let render = |flow: &str| {
        render_summary(
            &facts,
            &main_subject,
            messages.len(),
            &conversation.participants,
            flow,
            status,
        )
    };

    ConversationSummary {
        name: conversation.name.clone(),
        month: conversation.month.clone(),
        conversation_id: conversation.conversation_id.as_str().to_string(),
        subject: main_subject.clone(),
        summary: render(&short_flow),
        summary_full: render(&full_flow),
        first_email_to_billing: window.first_contact,
        first_response_from_billing: window.first_response,
        time_delta: window.elapsed,
        scope: detect_scope(&conversation.participants, &config.organization_domain),
        timestamp: facts.last_timestamp.clone(),
        message_count: messages.len(),
        status,
    }
}

/// Repair encoding, normalize clocks to 24-hour and backfill unknown senders
pub fn prepare_messages(
    messages: &[DecomposedMessage],
    blocks: &[ParticipantBlock],
) -> Vec<DecomposedMessage> {
    messages
        .iter()
        .map(|message| {
            let mut message = message.clone();
            message.sender = repair_mojibake(&message.sender);
            message.subject = repair_mojibake(&message.subject);
            message.content = repair_mojibake(&message.content);
            message.timestamp = to_24_hour(&message.timestamp);

            if is_unknown_sender(&message.sender) {
                if let Some(sender) = backfill_sender(&message, blocks) {
                    message.sender = sender;
                }
            }
            message
        })
        .collect()
}

fn backfill_sender(message: &DecomposedMessage, blocks: &[ParticipantBlock]) -> Option<String> {
    sender_from_content(&message.content).or_else(|| {
        blocks
            .iter()
            .filter(|block| block.matches_timestamp(&message.timestamp))
            .find_map(|block| block.primary_sender())
            .and_then(name_from_address)
    })
}

/// `Internal` only when there is at least one address and all sit on `domain`
pub fn detect_scope(blocks: &[ParticipantBlock], domain: &str) -> ThreadScope {
    let suffix = format!("@{}", domain.trim_start_matches('@').to_lowercase());
    let mut addresses = blocks
        .iter()
        .flat_map(|block| block.all_addresses())
        .filter(|a| !a.is_empty())
        .peekable();

    if addresses.peek().is_none() {
        return ThreadScope::External;
    }
    if addresses.all(|a| a.to_lowercase().contains(&suffix)) {
        ThreadScope::Internal
    } else {
        ThreadScope::External
    }
}

/// First matching rule wins: approval, pending review, rejection, otherwise general
pub fn detect_status(messages: &[DecomposedMessage]) -> ConversationStatus {
    let text = messages
        .iter()
        .map(|m| format!("{}\n{}", m.subject, m.content))
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase();

    let rules: [(&[&str], ConversationStatus); 3] = [
        (&["approved", "all good"], ConversationStatus::Approved),
        (&["please approve", "review"], ConversationStatus::AwaitingReview),
        (&["rejection", "reject"], ConversationStatus::IssueNoted),
    ];

    rules
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|t| text.contains(t)))
        .map(|(_, status)| *status)
        .unwrap_or(ConversationStatus::General)
}

/// Fold subjects, senders, keyword hits and the timeline out of the messages
pub fn collect_facts(messages: &[DecomposedMessage], terms: &[String]) -> ConversationFacts {
    let mut facts = messages
        .iter()
        .fold(ConversationFacts::default(), |mut facts, m| {
            let subject = m.subject.trim();
            if !subject.is_empty() && !facts.subjects.iter().any(|s| s == subject) {
                facts.subjects.push(subject.to_string());
            }
            if !m.sender.is_empty() && !facts.senders.contains(&m.sender) {
                facts.senders.push(m.sender.clone());
            }
            if !m.timestamp.is_empty() {
                facts.first_timestamp.get_or_insert_with(|| m.timestamp.clone());
                facts.last_timestamp = Some(m.timestamp.clone());
            }
            facts
        });

    let blobs: Vec<String> = messages
        .iter()
        .map(|m| format!("{} {}", m.subject, m.content).to_lowercase())
        .collect();
    facts.keywords = terms
        .iter()
        .filter(|term| blobs.iter().any(|blob| contains_word(blob, &term.to_lowercase())))
        .cloned()
        .collect();

    facts
}

/// First two, every billing-sent and last two messages, in original order
pub fn key_messages<'a>(
    messages: &'a [DecomposedMessage],
    config: &EngineConfig,
) -> Vec<&'a DecomposedMessage> {
    let n = messages.len();
    let mut keep: BTreeSet<usize> = (0..n.min(KEEP_AT_EACH_END)).collect();
    keep.extend(
        messages
            .iter()
            .enumerate()
            .filter(|(_, m)| is_billing_sender(&m.sender, config))
            .map(|(i, _)| i),
    );
    keep.extend(n.saturating_sub(KEEP_AT_EACH_END)..n);

    keep.into_iter().map(|i| &messages[i]).collect()
}

/// Key-message flow plus the cap note, held within `summary_char_limit`.
///
/// When the key messages alone still overflow the limit, every kept
/// message's content is cut to an equal share of what the line prefixes
/// and the note leave over.
pub fn capped_flow(messages: &[DecomposedMessage], config: &EngineConfig) -> String {
    let kept = key_messages(messages, config);
    let note = format!(
        "\n... (Showing {} of {} messages - key messages only. See summaryFull for the complete version)",
        kept.len(),
        messages.len()
    );
    let flow = render_flow(&kept);
    let flow_chars = flow.chars().count();
    let note_chars = note.chars().count();
    if flow_chars + note_chars <= config.summary_char_limit || kept.is_empty() {
        return flow + &note;
    }

    let content_chars: usize = kept
        .iter()
        .map(|m| or_placeholder(&m.content, "(no content)").chars().count())
        .sum();
    let overhead = flow_chars - content_chars + note_chars;
    let share = config.summary_char_limit.saturating_sub(overhead) / kept.len();

    let trimmed: Vec<DecomposedMessage> = kept
        .iter()
        .map(|m| {
            let mut m = (*m).clone();
            m.content = truncate_content(&m.content, share);
            m
        })
        .collect();
    let trimmed: Vec<&DecomposedMessage> = trimmed.iter().collect();
    render_flow(&trimmed) + &note
}

/// At most `max_chars` characters, the last three being `...` when cut
fn truncate_content(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let mut cut: String = content.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Numbered flow lines, newest first
pub fn render_flow(messages: &[&DecomposedMessage]) -> String {
    if messages.is_empty() {
        return "(no messages)".to_string();
    }

    messages
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, m)| {
            format!(
                "{}. [{}] {}: {}",
                idx + 1,
                or_placeholder(&m.timestamp, "N/A"),
                or_placeholder(&m.sender, "Unknown"),
                or_placeholder(&m.content, "(no content)"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_summary(
    facts: &ConversationFacts,
    main_subject: &str,
    message_count: usize,
    blocks: &[ParticipantBlock],
    flow: &str,
    status: ConversationStatus,
) -> String {
    let joined = |items: &[String], sep: &str| {
        if items.is_empty() {
            "N/A".to_string()
        } else {
            items.join(sep)
        }
    };

    let mut lines = vec![
        format!(
            "TIMELINE: {} to {} ({} messages)",
            facts.first_timestamp.as_deref().unwrap_or("N/A"),
            facts.last_timestamp.as_deref().unwrap_or("N/A"),
            message_count
        ),
        format!("SUBJECTS: {}", joined(&facts.subjects, " | ")),
        format!("MAIN_SUBJECT: {main_subject}"),
        format!("KEY_SENDERS: {}", joined(&facts.senders, ", ")),
        format!("KEY_TOPICS: {}", joined(&facts.keywords, ", ")),
        "PARTICIPANTS_BLOCKS:".to_string(),
    ];
    lines.extend(blocks.iter().map(|block| format!("---\n{}", block.markdown())));
    lines.push("CONVERSATION_FLOW:".to_string());
    lines.push(flow.to_string());
    lines.push(format!("CONVERSATION_STATUS: {}", status.label()));

    lines.join("\n")
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// `term` occurs in `haystack` with no alphanumeric character on either side
fn contains_word(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
