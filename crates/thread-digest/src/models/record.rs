//! Raw email records as handed over by the ingestion layer

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::text::timestamp::parse_received;

/// Bucket used for records that arrive without a conversation identifier
pub const UNKNOWN_CONVERSATION_ID: &str = "UNKNOWN_CONVERSATION_ID";

/// Identifier shared by every record of one conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel bucket for records without an identifier
    pub fn unknown() -> Self {
        Self(UNKNOWN_CONVERSATION_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Participant addresses of one fetched email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    #[serde(default, deserialize_with = "null_as_default")]
    pub from: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cc: Vec<String>,
}

impl Participants {
    /// First non-empty sender address, if any
    pub fn primary_sender(&self) -> Option<&str> {
        self.from
            .iter()
            .map(|addr| addr.trim())
            .find(|addr| !addr.is_empty())
    }
}

/// One fetched email whose body may quote any number of earlier messages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmailRecord {
    /// Conversation identifier (missing ids are bucketed, not rejected)
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Subject line as fetched
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    /// Received instant, ISO-8601 text as delivered
    #[serde(default)]
    pub received_date_time: Option<String>,
    /// From/To/Cc address sets
    #[serde(default)]
    pub participants: Option<Participants>,
    /// Plain-text body with MIME/HTML already stripped
    #[serde(default)]
    pub cleaned_text: Option<String>,
    /// Assignee name, carried through to the summary
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Reporting month, carried through to the summary
    #[serde(default, deserialize_with = "null_as_default")]
    pub month: String,
}

impl RawEmailRecord {
    /// Create a new record builder
    pub fn builder(conversation_id: impl Into<String>) -> RawEmailRecordBuilder {
        RawEmailRecordBuilder::new(conversation_id.into())
    }

    /// The grouping key, falling back to the sentinel bucket
    pub fn conversation_id(&self) -> ConversationId {
        match self.conversation_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => ConversationId::new(id),
            _ => ConversationId::unknown(),
        }
    }

    /// Parsed received instant, if present and parseable
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_date_time.as_deref().and_then(parse_received)
    }

    /// Body text, empty when missing
    pub fn body(&self) -> &str {
        self.cleaned_text.as_deref().unwrap_or_default()
    }

    /// Whether the body carries anything besides whitespace
    pub fn has_body(&self) -> bool {
        !self.body().trim().is_empty()
    }

    /// First sender address from the participant sets
    pub fn sender_address(&self) -> Option<&str> {
        self.participants.as_ref()?.primary_sender()
    }
}

/// Builder for creating RawEmailRecord instances
pub struct RawEmailRecordBuilder {
    record: RawEmailRecord,
}

impl RawEmailRecordBuilder {
    fn new(conversation_id: String) -> Self {
        Self {
            record: RawEmailRecord {
                conversation_id: Some(conversation_id),
                ..RawEmailRecord::default()
            },
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.record.subject = subject.into();
        self
    }

    pub fn received(mut self, received: impl Into<String>) -> Self {
        self.record.received_date_time = Some(received.into());
        self
    }

    pub fn from(mut self, addresses: &[&str]) -> Self {
        self.participants_mut().from = to_owned_list(addresses);
        self
    }

    pub fn to(mut self, addresses: &[&str]) -> Self {
        self.participants_mut().to = to_owned_list(addresses);
        self
    }

    pub fn cc(mut self, addresses: &[&str]) -> Self {
        self.participants_mut().cc = to_owned_list(addresses);
        self
    }

    pub fn body(mut self, text: impl Into<String>) -> Self {
        self.record.cleaned_text = Some(text.into());
        self
    }

    pub fn assignee(mut self, name: impl Into<String>, month: impl Into<String>) -> Self {
        self.record.name = name.into();
        self.record.month = month.into();
        self
    }

    pub fn build(self) -> RawEmailRecord {
        self.record
    }

    fn participants_mut(&mut self) -> &mut Participants {
        self.record.participants.get_or_insert_with(Participants::default)
    }
}

fn to_owned_list(addresses: &[&str]) -> Vec<String> {
    addresses.iter().map(|a| a.to_string()).collect()
}

/// Parse the ingestion layer's JSON array of records
pub fn records_from_json(json: &str) -> Result<Vec<RawEmailRecord>> {
    serde_json::from_str(json).context("Input must be a JSON array of email records")
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
