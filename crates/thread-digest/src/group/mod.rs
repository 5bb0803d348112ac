//! Conversation grouping, participant signatures and cross-record merging

pub mod merge;
pub mod participants;

pub use merge::{CanonicalConversation, ConversationGroup, group_by_conversation, merge_group};
pub use participants::{
    ParticipantBlock, ParticipantRole, ParticipantSignature, build_participant_index,
};
