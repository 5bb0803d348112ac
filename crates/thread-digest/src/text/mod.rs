//! Pure text transforms shared by the decomposer and the summarizer

pub mod encoding;
pub mod sanitize;
pub mod subject;
pub mod timestamp;

pub use encoding::repair_mojibake;
pub use sanitize::sanitize_headers;
pub use subject::{normalize_subject, strip_subject_variants};
pub use timestamp::{
    TIMESTAMP_FORMAT, format_timestamp, parse_received, parse_sent, parse_timestamp, to_24_hour,
};
