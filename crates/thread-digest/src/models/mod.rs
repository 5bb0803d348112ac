//! Domain models for conversations, messages and summaries

mod message;
mod record;
mod summary;

pub use message::{DEDUP_CONTENT_CHARS, DecomposedMessage, DecomposedMessageBuilder, DedupKey};
pub use record::{
    ConversationId, Participants, RawEmailRecord, RawEmailRecordBuilder,
    UNKNOWN_CONVERSATION_ID, records_from_json,
};
pub use summary::{BillingResponseWindow, ConversationStatus, ConversationSummary, ThreadScope};
