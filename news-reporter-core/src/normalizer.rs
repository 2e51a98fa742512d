use unicode_normalization::UnicodeNormalization;

/// Unicode NFC normalization + BOM strip + whitespace collapse + trim.
///
/// Line breaks are folded too: a query is a single line by the time it
/// reaches the request.
pub fn normalize_query(s: &str) -> String {
    let t = s.nfc().collect::<String>();
    let t = t.strip_prefix('\u{FEFF}').unwrap_or(&t);
    t.split_whitespace().collect::<Vec<_>>().join(" ")
}
