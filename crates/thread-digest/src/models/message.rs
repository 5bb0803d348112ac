//! One logical message recovered from a raw record's body

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::text::timestamp::parse_timestamp;

/// Number of content characters that take part in the duplicate key
pub const DEDUP_CONTENT_CHARS: usize = 200;

/// A discrete message inside a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposedMessage {
    /// 1-based position, chronological
    pub id: usize,
    /// Display name or address-derived name, "Unknown" as last resort
    pub sender: String,
    /// Raw `To:` value of an embedded header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Raw `Cc:` value of an embedded header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    /// Normalized base subject of the conversation
    pub subject: String,
    /// Sanitized body text
    pub content: String,
    /// `DD/MM/YYYY - HH:MM`, empty when no instant could be recovered
    pub timestamp: String,
    /// Earliest message of the first raw record processed
    pub is_original: bool,
    /// Index of the raw record (within its group) this was recovered from
    #[serde(default)]
    pub source_index_in_group: usize,
}

/// Key under which two recovered messages count as the same message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    sender: String,
    subject: String,
    timestamp: String,
    content_head: String,
}

impl DecomposedMessage {
    /// Create a new message builder
    pub fn builder(sender: impl Into<String>) -> DecomposedMessageBuilder {
        DecomposedMessageBuilder::new(sender.into())
    }

    /// Parsed instant of `timestamp`
    pub fn instant(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            sender: self.sender.clone(),
            subject: self.subject.clone(),
            timestamp: self.timestamp.clone(),
            content_head: self.content.chars().take(DEDUP_CONTENT_CHARS).collect(),
        }
    }
}

/// Builder for creating DecomposedMessage instances
pub struct DecomposedMessageBuilder {
    message: DecomposedMessage,
}

impl DecomposedMessageBuilder {
    fn new(sender: String) -> Self {
        Self {
            message: DecomposedMessage {
                id: 0,
                sender,
                to: None,
                cc: None,
                subject: String::new(),
                content: String::new(),
                timestamp: String::new(),
                is_original: false,
                source_index_in_group: 0,
            },
        }
    }

    pub fn id(mut self, id: usize) -> Self {
        self.message.id = id;
        self
    }

    pub fn to(mut self, to: Option<String>) -> Self {
        self.message.to = to;
        self
    }

    pub fn cc(mut self, cc: Option<String>) -> Self {
        self.message.cc = cc;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.subject = subject.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.message.content = content.into();
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.message.timestamp = timestamp.into();
        self
    }

    pub fn original(mut self, is_original: bool) -> Self {
        self.message.is_original = is_original;
        self
    }

    pub fn build(self) -> DecomposedMessage {
        self.message
    }
}
