//! Sender recovery heuristics
//!
//! Each rule is a small pure function returning `Option<String>`; callers
//! chain them in priority order and take the first hit.

use regex::Regex;
use std::sync::OnceLock;

/// Placeholder when no rule produces a sender
pub const UNKNOWN_SENDER: &str = "Unknown";

/// How many trailing lines count as "near the end" of a message
const SIGNATURE_WINDOW: usize = 10;

fn re_signoff() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)(?i:\b(?:best regards|kind regards|warm regards|thank you|regards|thanks|sincerely|cheers|best))[ \t]*[,!.]?\s*([A-Z][a-z]+(?: [A-Z][a-z]+){0,3})[ \t]*$",
        )
        .unwrap()
    })
}

fn re_name_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][a-z]+(?: [A-Z][a-z]+){1,3}$").unwrap())
}

fn re_dotted_address() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([a-z]+)\.([a-z]+)@").unwrap())
}

fn re_angle_address() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([^>]+)>").unwrap())
}

/// Whether a sender still needs to be recovered
pub fn is_unknown_sender(sender: &str) -> bool {
    let sender = sender.trim();
    sender.is_empty() || sender == UNKNOWN_SENDER
}

/// Name following a sign-off word near the end, e.g. `Regards,\nJane Doe`
pub fn sender_from_signoff(content: &str) -> Option<String> {
    let tail = signature_tail(content);
    let name = re_signoff()
        .captures_iter(&tail)
        .last()
        .map(|caps| caps[1].trim().to_string())?;

    (name.len() > 2 && name.len() < 50).then_some(name)
}

/// A bare 2-4 word capitalized line near the end, after a blank or sign-off line
pub fn sender_from_name_line(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.lines().collect();
    let floor = lines.len().saturating_sub(SIGNATURE_WINDOW);

    (floor..lines.len()).rev().find_map(|i| {
        let line = lines[i].trim();
        if !re_name_line().is_match(line) {
            return None;
        }
        let prev = if i > 0 {
            lines[i - 1].trim().to_lowercase()
        } else {
            String::new()
        };
        let after_break = prev.is_empty()
            || ["regards", "thanks", "best", "sincerely"]
                .iter()
                .any(|word| prev.contains(word));
        after_break.then(|| line.to_string())
    })
}

/// Content-only rules: sign-off first, then a bare name line
pub fn sender_from_content(content: &str) -> Option<String> {
    sender_from_signoff(content).or_else(|| sender_from_name_line(content))
}

/// Turn `firstname.lastname@domain` into `Firstname Lastname`.
///
/// Other addresses fall back to their local part with `.`/`_` as spaces.
pub fn name_from_address(address: &str) -> Option<String> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }

    if let Some(caps) = re_dotted_address().captures(address) {
        return Some(format!("{} {}", capitalize(&caps[1]), capitalize(&caps[2])));
    }

    let local = address.split('@').next().unwrap_or(address);
    let name = local.replace(['.', '_'], " ").trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// Resolve a sender for text that has no structured `From:` header.
///
/// Priority: sign-off line, bare name line, participant address, "Unknown".
pub fn resolve_sender(content: &str, from_address: Option<&str>) -> String {
    let rules: [&dyn Fn() -> Option<String>; 3] = [
        &|| sender_from_signoff(content),
        &|| sender_from_name_line(content),
        &|| from_address.and_then(name_from_address),
    ];

    rules
        .iter()
        .find_map(|rule| rule())
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string())
}

/// Display sender for a quoted `From:` header value.
///
/// `Jane Doe <jane.doe@acme.com>` becomes `Jane <jane.doe@acme.com>`; any
/// other value is kept as written.
pub fn sender_from_header(raw_from: &str) -> String {
    let raw = raw_from.trim();
    if let Some(caps) = re_angle_address().captures(raw) {
        let email = caps[1].trim();
        if let Some(parts) = re_dotted_address().captures(email) {
            return format!("{} <{}>", capitalize(&parts[1]), email);
        }
    }
    if raw.is_empty() {
        UNKNOWN_SENDER.to_string()
    } else {
        raw.to_string()
    }
}

fn signature_tail(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(SIGNATURE_WINDOW);
    lines[start..].join("\n")
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
