//! Repair of UTF-8 text that was decoded as Windows-1252 somewhere upstream

/// Mojibake sequences and their intended characters.
///
/// Longer sequences come first: `â€` alone is a prefix of most of them.
const MOJIBAKE: &[(&str, &str)] = &[
    ("â€™", "'"),
    ("â€˜", "'"),
    ("â€œ", "\""),
    ("â€\u{9d}", "\""),
    ("â€”", "—"),
    ("â€“", "–"),
    ("â€¢", "•"),
    ("â€¦", "…"),
    ("â€¨", " "),
    ("â€©", " "),
    ("â‚¬", "€"),
    ("â€", "\""),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ã¢", "â"),
    ("Ã§", "ç"),
    ("Ã\u{a0}", "à"),
    ("Ã ", "à"),
    ("Â\u{a0}", " "),
    ("Â ", " "),
    ("Â", ""),
    ("\u{a0}", " "),
];

/// Replace common mojibake sequences and non-breaking spaces, then trim.
pub fn repair_mojibake(text: &str) -> String {
    if !text.contains(['â', 'Ã', 'Â', '\u{a0}']) {
        return text.trim().to_string();
    }

    let mut repaired = text.to_string();
    for (bad, good) in MOJIBAKE {
        if repaired.contains(bad) {
            repaired = repaired.replace(bad, good);
        }
    }
    repaired.trim().to_string()
}
