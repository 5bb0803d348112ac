//! Thread decomposition
//!
//! Turns one raw record's body into the discrete messages it quotes, and
//! recovers a display sender for each of them.

pub mod sender;
pub mod thread;

pub use sender::{
    UNKNOWN_SENDER, is_unknown_sender, name_from_address, resolve_sender, sender_from_content,
    sender_from_header,
};
pub use thread::{EmbeddedHeader, decompose_record, find_embedded_headers, subject_remainder};
