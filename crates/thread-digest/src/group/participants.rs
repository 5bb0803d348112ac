//! Participant-signature index for one conversation group

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Participants, RawEmailRecord};
use crate::text::format_timestamp;

/// Canonical key of a participant set: sorted, lower-cased, deduplicated lists
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantSignature {
    from: Vec<String>,
    to: Vec<String>,
    cc: Vec<String>,
}

impl ParticipantSignature {
    pub fn of(participants: &Participants) -> Self {
        Self {
            from: normalize_addresses(&participants.from),
            to: normalize_addresses(&participants.to),
            cc: normalize_addresses(&participants.cc),
        }
    }
}

/// Role of an address inside a participant block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantRole {
    From,
    ToMain,
    ToCc,
}

impl ParticipantRole {
    pub fn label(self) -> &'static str {
        match self {
            ParticipantRole::From => "From",
            ParticipantRole::ToMain => "To (main)",
            ParticipantRole::ToCc => "To (cc)",
        }
    }
}

/// First occurrence of a participant signature within a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantBlock {
    /// Formatted received time of the first record with this signature
    pub timestamp: String,
    pub from: Vec<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    /// Every record index (within the group) that shares the signature
    pub source_indexes: Vec<usize>,
}

impl ParticipantBlock {
    fn new(signature: &ParticipantSignature, timestamp: String) -> Self {
        Self {
            timestamp,
            from: signature.from.clone(),
            to: signature.to.clone(),
            cc: signature.cc.clone(),
            source_indexes: Vec::new(),
        }
    }

    /// Whether this block was stamped with exactly `timestamp`
    pub fn matches_timestamp(&self, timestamp: &str) -> bool {
        !timestamp.is_empty() && self.timestamp == timestamp
    }

    pub fn addresses(&self, role: ParticipantRole) -> &[String] {
        match role {
            ParticipantRole::From => &self.from,
            ParticipantRole::ToMain => &self.to,
            ParticipantRole::ToCc => &self.cc,
        }
    }

    /// Every address in every role, in block order
    pub fn all_addresses(&self) -> impl Iterator<Item = &str> {
        self.from
            .iter()
            .chain(&self.to)
            .chain(&self.cc)
            .map(String::as_str)
    }

    /// Whether `address` is listed as a recipient (main or cc)
    pub fn lists_recipient(&self, address: &str) -> bool {
        let address = address.trim().to_lowercase();
        self.to.iter().chain(&self.cc).any(|a| *a == address)
    }

    /// Whether `address` is listed as the sender
    pub fn lists_sender(&self, address: &str) -> bool {
        let address = address.trim().to_lowercase();
        self.from.iter().any(|a| *a == address)
    }

    /// First sender address, if any
    pub fn primary_sender(&self) -> Option<&str> {
        self.from.first().map(String::as_str)
    }

    /// Markdown rendering consumed by the summary text
    pub fn markdown(&self) -> String {
        let mut lines = vec!["**Participants**".to_string()];
        if !self.timestamp.is_empty() {
            lines.push(format!("**Date:** {}", self.timestamp));
        }
        for role in [
            ParticipantRole::From,
            ParticipantRole::ToMain,
            ParticipantRole::ToCc,
        ] {
            let addresses = self.addresses(role);
            let joined = if addresses.is_empty() {
                "N/A".to_string()
            } else {
                addresses.join(", ")
            };
            lines.push(format!("- {} → {}", role.label(), joined));
        }
        lines.join("\n")
    }
}

/// Build the participant blocks of a group, in order of first occurrence.
///
/// Records without a participants structure are skipped.
pub fn build_participant_index(records: &[RawEmailRecord]) -> Vec<ParticipantBlock> {
    let mut blocks: Vec<ParticipantBlock> = Vec::new();
    let mut by_signature: HashMap<ParticipantSignature, usize> = HashMap::new();

    for (index, record) in records.iter().enumerate() {
        let Some(participants) = record.participants.as_ref() else {
            continue;
        };

        let signature = ParticipantSignature::of(participants);
        let slot = *by_signature.entry(signature).or_insert_with_key(|sig| {
            let timestamp = record
                .received_at()
                .map(|at| format_timestamp(&at))
                .unwrap_or_default();
            blocks.push(ParticipantBlock::new(sig, timestamp));
            blocks.len() - 1
        });
        blocks[slot].source_indexes.push(index);
    }

    blocks
}

fn normalize_addresses(addresses: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = addresses
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}
