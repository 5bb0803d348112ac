//! Splitting one raw record's body into the messages quoted inside it

use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

use super::sender::{resolve_sender, sender_from_header};
use crate::models::{DecomposedMessage, RawEmailRecord};
use crate::text::{
    format_timestamp, normalize_subject, parse_sent, sanitize_headers, strip_subject_variants,
};

fn re_embedded_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)From:\s*([^\n\r]+?)\s+Sent:\s*([^\n\r]+?)\s+To:\s*([^\n\r]+?)(?:\s+Cc:\s*([^\n\r]+?))?\s+Subject:\s*([^\n\r]+?)\s*\n+",
        )
        .unwrap()
    })
}

fn re_next_from() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\nFrom:\s").unwrap())
}

/// A quoted `From:/Sent:/To:/[Cc:]/Subject:` block and the body that follows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedHeader<'a> {
    /// Byte offset of the `From:` that opens the block
    pub start: usize,
    pub from: &'a str,
    pub sent: &'a str,
    pub to: &'a str,
    pub cc: Option<&'a str>,
    pub subject: &'a str,
    /// Text up to the next `\nFrom:` or the end of input
    pub body: &'a str,
}

/// Locate every embedded header block in `text`, in order of appearance
pub fn find_embedded_headers(text: &str) -> Vec<EmbeddedHeader<'_>> {
    let mut headers = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(caps) = re_embedded_header().captures_at(text, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };

        let body_start = whole.end();
        let body_end = re_next_from()
            .find_at(text, body_start)
            .map(|m| m.start())
            .unwrap_or(text.len());

        let field = |i: usize| caps.get(i).map(|m| m.as_str().trim()).unwrap_or_default();
        headers.push(EmbeddedHeader {
            start: whole.start(),
            from: field(1),
            sent: field(2),
            to: field(3),
            cc: caps
                .get(4)
                .map(|m| m.as_str().trim())
                .filter(|cc| !cc.is_empty()),
            subject: field(5),
            body: &text[body_start..body_end],
        });

        // body_start lies past this header's `From:`, so the scan always advances
        pos = body_end;
    }

    headers
}

/// Extra subject text a quoted message carries beyond the conversation's base subject.
///
/// Both arguments are normalized subjects.
pub fn subject_remainder(base: &str, matched: &str) -> Option<String> {
    if matched.is_empty() {
        return None;
    }

    let extra = if !base.is_empty() && matched.starts_with(base) {
        matched[base.len()..].trim().to_string()
    } else if !base.is_empty() && base.starts_with(matched) {
        String::new()
    } else if matched != base {
        let base_tokens: Vec<&str> = base.split(' ').collect();
        let matched_tokens: Vec<&str> = matched.split(' ').collect();
        let divergence = base_tokens
            .iter()
            .zip(&matched_tokens)
            .take_while(|(b, m)| b == m)
            .count();
        matched_tokens[divergence..].join(" ").trim().to_string()
    } else {
        String::new()
    };

    (!extra.is_empty()).then_some(extra)
}

/// A message recovered from the body, before ids and display timestamps are assigned
struct Recovered {
    sent_at: Option<DateTime<Utc>>,
    sender: String,
    to: Option<String>,
    cc: Option<String>,
    content: String,
}

/// Split one raw record into its discrete messages.
///
/// Messages come back sorted by recovered timestamp with ids `1..=N`; only
/// the earliest is flagged original. An empty body yields no messages.
pub fn decompose_record(record: &RawEmailRecord) -> Vec<DecomposedMessage> {
    let text = record.body();
    if text.trim().is_empty() {
        return Vec::new();
    }

    let base_subject = normalize_subject(&record.subject);
    let received = record.received_at();
    if received.is_none() {
        debug!(
            "Record in conversation {} has no parseable receivedDateTime",
            record.conversation_id().as_str()
        );
    }

    let headers = find_embedded_headers(text);
    let mut recovered = Vec::with_capacity(headers.len() + 1);

    match headers.first() {
        None => recovered.push(own_message(text, record, &base_subject, received)),
        Some(first) => {
            let preamble = text[..first.start].trim();
            if !preamble.is_empty() {
                recovered.push(own_message(preamble, record, &base_subject, received));
            }
            recovered.extend(
                headers
                    .iter()
                    .map(|h| quoted_message(h, record, &base_subject, received)),
            );
        }
    }

    // Stable: equal instants keep body order
    recovered.sort_by_key(|m| m.sent_at);

    recovered
        .into_iter()
        .enumerate()
        .map(|(idx, m)| {
            DecomposedMessage::builder(m.sender)
                .id(idx + 1)
                .to(m.to)
                .cc(m.cc)
                .subject(base_subject.clone())
                .content(m.content)
                .timestamp(m.sent_at.map(|at| format_timestamp(&at)).unwrap_or_default())
                .original(idx == 0)
                .build()
        })
        .collect()
}

/// The record's own text: the whole body, or the preamble above the first quote
fn own_message(
    text: &str,
    record: &RawEmailRecord,
    base_subject: &str,
    received: Option<DateTime<Utc>>,
) -> Recovered {
    let sender = resolve_sender(text, record.sender_address());
    let stripped = strip_subject_variants(text.trim(), &[record.subject.as_str(), base_subject]);

    Recovered {
        sent_at: received,
        sender,
        to: None,
        cc: None,
        content: sanitize_headers(&stripped),
    }
}

fn quoted_message(
    header: &EmbeddedHeader<'_>,
    record: &RawEmailRecord,
    base_subject: &str,
    received: Option<DateTime<Utc>>,
) -> Recovered {
    let sent_at = parse_sent(header.sent).or_else(|| {
        debug!("Unparseable Sent value {:?}, using received time", header.sent);
        received
    });

    let mut content = strip_subject_variants(
        header.body.trim(),
        &[header.subject, record.subject.as_str(), base_subject],
    );
    if let Some(extra) = subject_remainder(base_subject, &normalize_subject(header.subject)) {
        content = if content.is_empty() {
            extra
        } else {
            format!("{extra}\n{content}")
        };
    }

    Recovered {
        sent_at,
        sender: sender_from_header(header.from),
        to: Some(header.to.to_string()).filter(|to| !to.is_empty()),
        cc: header.cc.map(str::to_string),
        content: sanitize_headers(&content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(body: &str) -> RawEmailRecord {
        RawEmailRecord::builder("conv-1")
            .subject("RE: Invoice 1001 for October")
            .received("2025-10-03T10:00:00Z")
            .from(&["jane.doe@acme.com"])
            .to(&["billing@gep.com"])
            .body(body)
            .build()
    }

    #[test]
    fn test_single_message_thread() {
        let msgs = decompose_record(&record("Please process the invoice.\n\nThanks,\nJane Doe"));
        assert_eq!(msgs.len(), 1);
        let msg = &msgs[0];
        assert_eq!(msg.id, 1);
        assert!(msg.is_original);
        assert_eq!(msg.sender, "Jane Doe");
        assert_eq!(msg.subject, "invoice 1001 for october");
        assert_eq!(msg.timestamp, "03/10/2025 - 10:00");
        assert!(msg.to.is_none());
    }

    #[test]
    fn test_single_message_falls_back_to_address() {
        let msgs = decompose_record(&record("see attached"));
        assert_eq!(msgs[0].sender, "Jane Doe");
        assert_eq!(msgs[0].content, "see attached");
    }

    #[test]
    fn test_empty_body_yields_nothing() {
        assert!(decompose_record(&record("  \n\t ")).is_empty());
        let mut no_body = record("x");
        no_body.cleaned_text = None;
        assert!(decompose_record(&no_body).is_empty());
    }

    #[test]
    fn test_preamble_and_three_quotes() {
        let body = "\
Latest reply on top.

From: Billing <billing@gep.com>
Sent: Thursday, October 2, 2025 11:15 AM
To: Jane Doe <jane.doe@acme.com>
Subject: RE: Invoice 1001 for October

We have received it.

From: Jane Doe <jane.doe@acme.com>
Sent: Wednesday, October 1, 2025 9:00 AM
To: billing@gep.com
Cc: ap@acme.com
Subject: Invoice 1001 for October

Please process invoice 1001.

From: Ravi Kumar <ravi.kumar@acme.com>
Sent: Tuesday, September 30, 2025 4:30 PM
To: jane.doe@acme.com
Subject: Invoice 1001 for October - draft

Draft attached for review.
";
        let msgs = decompose_record(&record(body));
        assert_eq!(msgs.len(), 4);

        let ids: Vec<usize> = msgs.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);

        let stamps: Vec<&str> = msgs.iter().map(|m| m.timestamp.as_str()).collect();
        assert_eq!(
            stamps,
            vec![
                "30/09/2025 - 16:30",
                "01/10/2025 - 09:00",
                "02/10/2025 - 11:15",
                "03/10/2025 - 10:00",
            ]
        );

        assert!(msgs[0].is_original);
        assert!(msgs[1..].iter().all(|m| !m.is_original));

        assert_eq!(msgs[0].sender, "Ravi <ravi.kumar@acme.com>");
        assert_eq!(msgs[0].content, "- draft\nDraft attached for review.");

        assert_eq!(msgs[1].sender, "Jane <jane.doe@acme.com>");
        assert_eq!(msgs[1].to.as_deref(), Some("billing@gep.com"));
        assert_eq!(msgs[1].cc.as_deref(), Some("ap@acme.com"));
        assert_eq!(msgs[1].content, "Please process invoice 1001.");

        assert_eq!(msgs[2].sender, "Billing <billing@gep.com>");
        assert_eq!(msgs[2].content, "We have received it.");

        assert_eq!(msgs[3].content, "Latest reply on top.");
    }

    #[test]
    fn test_unparseable_sent_uses_received_time() {
        let body = "\
From: Jane Doe <jane.doe@acme.com>
Sent: sometime last week
To: billing@gep.com
Subject: Invoice 1001 for October

Body text.
";
        let msgs = decompose_record(&record(body));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].timestamp, "03/10/2025 - 10:00");
        assert!(msgs[0].is_original);
    }

    #[test]
    fn test_find_embedded_headers_single_line_fields() {
        let text = "intro\nFrom: a@x.com Sent: 2025-10-01 09:00 To: b@x.com Subject: Hello\nbody one\nFrom: c@x.com Sent: 2025-10-01 10:00 To: d@x.com Cc: e@x.com Subject: Hello\nbody two";
        let headers = find_embedded_headers(text);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].from, "a@x.com");
        assert_eq!(headers[0].sent, "2025-10-01 09:00");
        assert_eq!(headers[0].cc, None);
        assert_eq!(headers[0].body, "body one");
        assert_eq!(headers[1].cc, Some("e@x.com"));
        assert_eq!(headers[1].body, "body two");
        assert_eq!(&text[..headers[0].start], "intro\n");
    }

    #[test]
    fn test_subject_remainder() {
        assert_eq!(
            subject_remainder("invoice 1001", "invoice 1001 - urgent"),
            Some("- urgent".to_string())
        );
        assert_eq!(subject_remainder("invoice 1001 for october", "invoice 1001"), None);
        assert_eq!(subject_remainder("invoice 1001", "invoice 1001"), None);
        assert_eq!(
            subject_remainder("invoice 1001 october", "invoice 2002 october"),
            Some("2002 october".to_string())
        );
        assert_eq!(subject_remainder("", "hello"), Some("hello".to_string()));
        assert_eq!(subject_remainder("base", ""), None);
    }
}
