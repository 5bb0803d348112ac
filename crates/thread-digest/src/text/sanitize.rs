//! Header-field stripping for recovered message bodies

use regex::Regex;
use std::sync::OnceLock;

/// Header keys whose lines never belong in a message body
const HEADER_KEYS: [&str; 7] = ["from", "sent", "to", "cc", "bcc", "subject", "date"];

fn re_inline_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(From:|Sent:|To:|Cc:|Bcc:|Subject:|Date:)").unwrap())
}

fn re_header_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[>\-\s]*([A-Za-z]{2,})\s*:").unwrap())
}

fn re_reply_continuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:re|fw|fwd)\s*:").unwrap())
}

fn re_blank_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").unwrap())
}

/// Strip leaked header fields from a message body.
///
/// Every inline header key is moved onto its own line, header lines and bare
/// `Re:`/`Fw:`/`Fwd:` continuations are dropped, runs of blank lines collapse
/// to one and the result is trimmed. Applying it twice changes nothing.
pub fn sanitize_headers(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let broken = re_inline_header().replace_all(content, "\n${1}");
    let kept = broken
        .lines()
        .filter(|line| !is_header_noise(line))
        .collect::<Vec<_>>()
        .join("\n");

    re_blank_run()
        .replace_all(&kept, "\n\n")
        .trim()
        .to_string()
}

fn is_header_noise(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }

    if let Some(caps) = re_header_line().captures(trimmed) {
        let key = caps[1].to_ascii_lowercase();
        if HEADER_KEYS.contains(&key.as_str()) {
            return true;
        }
    }

    re_reply_continuation().is_match(trimmed)
}
