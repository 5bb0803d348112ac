//! Billing contact and first-response detection

use log::debug;

use super::delta::ElapsedDelta;
use crate::config::EngineConfig;
use crate::group::ParticipantBlock;
use crate::models::{BillingResponseWindow, DecomposedMessage};
use crate::text::parse_timestamp;

/// Whether a display sender belongs to the billing team.
///
/// Matches a billing address anywhere in the sender, or a billing display
/// name either on its own or in front of an `<address>`.
pub fn is_billing_sender(sender: &str, config: &EngineConfig) -> bool {
    let sender = sender.trim().to_lowercase();
    if sender.is_empty() {
        return false;
    }

    if config
        .billing_addresses
        .iter()
        .chain(std::iter::once(&config.billing_address))
        .any(|addr| !addr.is_empty() && sender.contains(&addr.to_lowercase()))
    {
        return true;
    }

    let display_name = sender.split('<').next().unwrap_or_default().trim();
    config
        .billing_names
        .iter()
        .any(|name| name.to_lowercase() == display_name)
}

/// Whether a message was addressed to the billing mailbox.
///
/// Checks the message's own `To:` value first, then the participant block
/// stamped with the message's timestamp.
pub fn is_to_billing(
    message: &DecomposedMessage,
    blocks: &[ParticipantBlock],
    config: &EngineConfig,
) -> bool {
    if let Some(to) = message.to.as_deref() {
        let to = to.to_lowercase();
        let keyword = config.billing_keyword.to_lowercase();
        if (!keyword.is_empty() && to.contains(&keyword))
            || to.contains(&config.billing_address.to_lowercase())
        {
            return true;
        }
    }

    blocks_for(message, blocks).any(|block| block.lists_recipient(&config.billing_address))
}

/// Whether a message was sent by the billing team
pub fn is_from_billing(
    message: &DecomposedMessage,
    blocks: &[ParticipantBlock],
    config: &EngineConfig,
) -> bool {
    if is_billing_sender(&message.sender, config) {
        return true;
    }

    blocks_for(message, blocks).any(|block| {
        config
            .billing_addresses
            .iter()
            .chain(std::iter::once(&config.billing_address))
            .any(|addr| !addr.is_empty() && block.lists_sender(addr))
    })
}

/// Find the first billing contact, the first reply after it and their gap.
///
/// A message to billing that billing did not send opens the window, and any
/// later message closes it. Without such a message, billing's own first
/// message opens the window and the first later non-billing message closes it.
pub fn extract_response_window(
    messages: &[DecomposedMessage],
    blocks: &[ParticipantBlock],
    config: &EngineConfig,
) -> BillingResponseWindow {
    let dated = || messages.iter().filter(|m| !m.timestamp.is_empty());

    let first_to_billing = dated()
        .find(|m| is_to_billing(m, blocks, config) && !is_from_billing(m, blocks, config))
        .map(|m| m.timestamp.clone());
    let first_from_billing = dated()
        .find(|m| is_from_billing(m, blocks, config))
        .map(|m| m.timestamp.clone());

    if let Some(contact) = first_to_billing {
        let response = dated()
            .find(|m| is_after(&m.timestamp, &contact))
            .map(|m| m.timestamp.clone());
        let elapsed = response
            .as_deref()
            .and_then(|r| ElapsedDelta::between(&contact, r));

        return BillingResponseWindow {
            first_contact: Some(contact),
            first_response: response,
            elapsed,
            billing_initiated: false,
        };
    }

    let Some(initiated) = first_from_billing else {
        return BillingResponseWindow::default();
    };

    let reply = dated()
        .filter(|m| !is_from_billing(m, blocks, config))
        .find(|m| is_after(&m.timestamp, &initiated))
        .map(|m| m.timestamp.clone());

    match reply {
        Some(reply) => {
            debug!("Billing initiated at {initiated}, first reply at {reply}");
            BillingResponseWindow {
                elapsed: ElapsedDelta::between(&initiated, &reply),
                first_contact: Some(initiated),
                first_response: Some(reply),
                billing_initiated: true,
            }
        }
        None => BillingResponseWindow::default(),
    }
}

fn blocks_for<'a>(
    message: &'a DecomposedMessage,
    blocks: &'a [ParticipantBlock],
) -> impl Iterator<Item = &'a ParticipantBlock> {
    blocks
        .iter()
        .filter(|block| block.matches_timestamp(&message.timestamp))
}

/// Strict "later than"; false when either side does not parse
fn is_after(candidate: &str, reference: &str) -> bool {
    match (parse_timestamp(candidate), parse_timestamp(reference)) {
        (Some(candidate), Some(reference)) => candidate > reference,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: &str, to: Option<&str>, timestamp: &str) -> DecomposedMessage {
        DecomposedMessage::builder(sender)
            .to(to.map(str::to_string))
            .timestamp(timestamp)
            .build()
    }

    fn block(timestamp: &str, from: &str, to: &[&str]) -> ParticipantBlock {
        ParticipantBlock {
            timestamp: timestamp.to_string(),
            from: vec![from.to_string()],
            to: to.iter().map(|s| s.to_string()).collect(),
            cc: Vec::new(),
            source_indexes: vec![0],
        }
    }

    #[test]
    fn test_billing_sender_identities() {
        let cfg = EngineConfig::default();
        assert!(is_billing_sender("Billing <billing@gep.com>", &cfg));
        assert!(is_billing_sender("billing@gep.com", &cfg));
        assert!(is_billing_sender("Billing", &cfg));
        assert!(is_billing_sender("Pinky Pal", &cfg));
        assert!(is_billing_sender("Pinky <pinky.pal@gep.com>", &cfg));
        assert!(!is_billing_sender("Jane <jane.doe@acme.com>", &cfg));
        assert!(!is_billing_sender("Billing Ops Lead", &cfg));
        assert!(!is_billing_sender("", &cfg));
    }

    #[test]
    fn test_to_billing_from_header_or_block() {
        let cfg = EngineConfig::default();
        let blocks = vec![block("01/10/2025 - 09:00", "jane.doe@acme.com", &["billing@gep.com"])];

        assert!(is_to_billing(&msg("Jane", Some("Billing Team <billing@gep.com>"), ""), &[], &cfg));
        assert!(is_to_billing(&msg("Jane", None, "01/10/2025 - 09:00"), &blocks, &cfg));
        assert!(!is_to_billing(&msg("Jane", None, "01/10/2025 - 09:30"), &blocks, &cfg));
    }

    #[test]
    fn test_from_billing_via_block() {
        let cfg = EngineConfig::default();
        let blocks = vec![block("01/10/2025 - 11:00", "pinky.pal@gep.com", &["jane.doe@acme.com"])];
        assert!(is_from_billing(&msg("Pinky", None, "01/10/2025 - 11:00"), &blocks, &cfg));
        assert!(!is_from_billing(&msg("Pinky", None, "01/10/2025 - 12:00"), &blocks, &cfg));
    }

    #[test]
    fn test_contact_then_response() {
        let cfg = EngineConfig::default();
        let messages = vec![
            msg("Jane <jane.doe@acme.com>", Some("billing@gep.com"), "01/10/2025 - 09:00"),
            msg("Billing <billing@gep.com>", Some("jane.doe@acme.com"), "01/10/2025 - 09:45"),
        ];
        let window = extract_response_window(&messages, &[], &cfg);
        assert_eq!(window.first_contact.as_deref(), Some("01/10/2025 - 09:00"));
        assert_eq!(window.first_response.as_deref(), Some("01/10/2025 - 09:45"));
        assert_eq!(window.elapsed.unwrap().to_string(), "45 Min");
        assert!(!window.billing_initiated);
    }

    #[test]
    fn test_response_must_be_strictly_later() {
        let cfg = EngineConfig::default();
        let messages = vec![
            msg("Jane", Some("billing@gep.com"), "01/10/2025 - 09:00"),
            msg("John", None, "01/10/2025 - 09:00"),
        ];
        let window = extract_response_window(&messages, &[], &cfg);
        assert_eq!(window.first_contact.as_deref(), Some("01/10/2025 - 09:00"));
        assert!(window.first_response.is_none());
        assert!(window.elapsed.is_none());
    }

    #[test]
    fn test_earlier_messages_never_respond() {
        let cfg = EngineConfig::default();
        let messages = vec![
            msg("John", None, "30/09/2025 - 08:00"),
            msg("Billing", Some("jane.doe@acme.com"), "30/09/2025 - 16:00"),
            msg("Jane", Some("billing@gep.com"), "01/10/2025 - 09:00"),
        ];
        let window = extract_response_window(&messages, &[], &cfg);
        assert_eq!(window.first_contact.as_deref(), Some("01/10/2025 - 09:00"));
        assert!(window.first_response.is_none());
        assert!(window.elapsed.is_none());
        assert!(!window.billing_initiated);
    }

    #[test]
    fn test_configured_billing_address_initiates() {
        let cfg = EngineConfig::from_json(r#"{"billingAddress":"ap@acme.com"}"#).unwrap();
        let blocks = vec![
            block("01/10/2025 - 09:00", "ap@acme.com", &["vendor@x.com"]),
            block("01/10/2025 - 12:00", "vendor@x.com", &["ops@x.com"]),
        ];
        let messages = vec![
            msg("Accounts Payable", None, "01/10/2025 - 09:00"),
            msg("Vendor", None, "01/10/2025 - 12:00"),
        ];

        assert!(is_from_billing(&messages[0], &blocks, &cfg));
        let window = extract_response_window(&messages, &blocks, &cfg);
        assert!(window.billing_initiated);
        assert_eq!(window.first_contact.as_deref(), Some("01/10/2025 - 09:00"));
        assert_eq!(window.first_response.as_deref(), Some("01/10/2025 - 12:00"));
        assert_eq!(window.elapsed.unwrap().to_string(), "3 Hours : 0 Min");
    }

    #[test]
    fn test_billing_initiated() {
        let cfg = EngineConfig::default();
        let messages = vec![
            msg("Billing <billing@gep.com>", Some("jane.doe@acme.com"), "01/10/2025 - 09:00"),
            msg("Pinky Pal", None, "01/10/2025 - 10:00"),
            msg("Jane", None, "02/10/2025 - 11:15"),
        ];
        let window = extract_response_window(&messages, &[], &cfg);
        assert_eq!(window.first_contact.as_deref(), Some("01/10/2025 - 09:00"));
        assert_eq!(window.first_response.as_deref(), Some("02/10/2025 - 11:15"));
        assert_eq!(window.elapsed.unwrap().to_string(), "1 Days : 2 Hours : 15 Min");
        assert!(window.billing_initiated);
    }

    #[test]
    fn test_no_billing_involvement() {
        let cfg = EngineConfig::default();
        let messages = vec![
            msg("Jane", Some("ops@acme.com"), "01/10/2025 - 09:00"),
            msg("John", None, "01/10/2025 - 10:00"),
        ];
        assert_eq!(
            extract_response_window(&messages, &[], &cfg),
            BillingResponseWindow::default()
        );
        assert_eq!(
            extract_response_window(&[], &[], &cfg),
            BillingResponseWindow::default()
        );
    }

    #[test]
    fn test_undated_messages_are_ignored() {
        let cfg = EngineConfig::default();
        let messages = vec![
            msg("Jane", Some("billing@gep.com"), ""),
            msg("Jane", Some("billing@gep.com"), "01/10/2025 - 09:00"),
            msg("Billing", None, "01/10/2025 - 12:00"),
        ];
        let window = extract_response_window(&messages, &[], &cfg);
        assert_eq!(window.first_contact.as_deref(), Some("01/10/2025 - 09:00"));
        assert_eq!(window.elapsed.unwrap().to_string(), "3 Hours : 0 Min");
    }
}
