//! Thread digest crate - Email-thread decomposition and billing response analytics
//!
//! This crate turns raw email export records into per-conversation digests:
//! - Text utilities (subject normalization, header sanitizing, timestamps)
//! - Thread decomposition of quoted reply chains into discrete messages
//! - Conversation grouping, participant signatures and cross-record dedup
//! - Billing response-window extraction with elapsed-time deltas
//! - Summary rendering, status labels and batch statistics
//!
//! The engine is a pure batch transform with no I/O; the `sla-digest` binary
//! owns reading input and writing output.

pub mod billing;
pub mod config;
pub mod decompose;
pub mod group;
pub mod models;
pub mod pipeline;
pub mod summary;
pub mod text;

pub use billing::{ElapsedDelta, extract_response_window, is_billing_sender, is_from_billing, is_to_billing};
pub use config::{ConfigError, EngineConfig};
pub use decompose::{decompose_record, resolve_sender};
pub use group::{
    CanonicalConversation, ConversationGroup, ParticipantBlock, build_participant_index,
    group_by_conversation, merge_group,
};
pub use models::{
    BillingResponseWindow, ConversationId, ConversationStatus, ConversationSummary,
    DecomposedMessage, Participants, RawEmailRecord, ThreadScope, UNKNOWN_CONVERSATION_ID,
    records_from_json,
};
pub use pipeline::{
    ConversationDigest, DigestOutput, SortOrder, SummaryOptions, process_group, process_records,
};
pub use summary::{BatchStats, summarize_conversation};
pub use text::{normalize_subject, repair_mojibake, sanitize_headers, strip_subject_variants, to_24_hour};
