//! Billing response-window analytics
//!
//! Finds the first message directed to the billing mailbox (or, when billing
//! started the conversation, billing's own first message), the first reply
//! after it, and the elapsed time between the two.

pub mod delta;
pub mod response;

pub use delta::{ElapsedDelta, ParseDeltaError};
pub use response::{extract_response_window, is_billing_sender, is_from_billing, is_to_billing};
