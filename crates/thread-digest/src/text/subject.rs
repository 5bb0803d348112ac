//! Subject canonicalization and subject-echo stripping

use log::debug;
use regex::Regex;
use std::sync::OnceLock;

fn re_reply_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(?:\s*(?:re|fw|fwd)\s*:\s*)+").unwrap())
}

fn re_subject_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^subject\s*:\s*(.*)$").unwrap())
}

/// Canonical form of a subject line for comparison.
///
/// Lower-cases, strips any run of leading `Re:`/`Fw:`/`Fwd:` prefixes and
/// collapses whitespace. Total: empty input gives an empty string.
pub fn normalize_subject(subject: &str) -> String {
    let lowered = subject.to_lowercase();
    let stripped = re_reply_prefix().replace(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove echoes of the conversation subject from a message body.
///
/// A leading occurrence of any variant (optionally behind reply prefixes) is
/// cut from the start of the body, and any line that is `Subject: <variant>`
/// or just the variant itself is dropped.
pub fn strip_subject_variants(content: &str, variants: &[&str]) -> String {
    let variants: Vec<&str> = variants
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if content.is_empty() || variants.is_empty() {
        return content.to_string();
    }

    let normalized: Vec<String> = variants
        .iter()
        .map(|v| normalize_subject(v))
        .filter(|v| !v.is_empty())
        .collect();

    let mut cleaned = content.to_string();
    for variant in &variants {
        let pattern = format!(
            r"(?i)^(?:\s*(?:re|fw|fwd)\s*:\s*)*{}(?:\s+|\s*$)",
            regex::escape(variant)
        );
        match Regex::new(&pattern) {
            Ok(re) => cleaned = re.replace(&cleaned, "").trim_start().to_string(),
            Err(e) => debug!("Skipping subject variant {:?}: {}", variant, e),
        }
    }

    cleaned
        .lines()
        .filter(|line| !is_subject_echo(line, &normalized))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn is_subject_echo(line: &str, normalized: &[String]) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }

    if let Some(caps) = re_subject_line().captures(trimmed) {
        let value = normalize_subject(&caps[1]);
        if normalized.contains(&value) {
            return true;
        }
    }

    normalized.contains(&normalize_subject(trimmed))
}
