//! Summary rendering and batch statistics

pub mod generate;
pub mod stats;

pub use generate::{
    ConversationFacts, collect_facts, detect_scope, detect_status, key_messages, prepare_messages,
    render_flow, summarize_conversation,
};
pub use stats::{BatchStats, StatusBreakdown};
