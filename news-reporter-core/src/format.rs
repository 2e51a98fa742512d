//! Fixed-width layout helpers for terminal output.
//!
//! Widths count `char`s, so CJK text is measured by characters, not bytes.

const ELLIPSIS: &str = "...";

fn width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate to a single line of at most `max_width` characters, ending in `...`.
///
/// Text that already fits is returned unchanged. Otherwise words are taken
/// greedily while they fit in `max_width - 3`, and everything after the
/// break point is dropped.
pub fn format_snippet(snippet: &str, max_width: usize) -> String {
    if width(snippet) <= max_width {
        return snippet.to_string();
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut out = String::new();
    let mut current = 0;

    for word in snippet.split_whitespace() {
        let w = width(word);
        if current + w + 1 > budget {
            out.push_str(ELLIPSIS);
            break;
        }
        if current > 0 {
            out.push(' ');
            current += 1;
        }
        out.push_str(word);
        current += w;
    }

    out
}

/// Wrap text to `max_width` columns.
///
/// Existing line breaks are kept. Lines that fit are kept verbatim; longer
/// ones are re-flowed word by word (a single word wider than `max_width`
/// still gets a line of its own).
pub fn format_text(text: &str, max_width: usize) -> String {
    if width(text) <= max_width {
        return text.to_string();
    }

    let mut out = String::new();
    for line in text.split('\n') {
        if width(line) <= max_width {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        let mut current_line = String::new();
        let mut current = 0;
        for word in line.split_whitespace() {
            let w = width(word);
            if current > 0 && current + w + 1 > max_width {
                out.push_str(&current_line);
                out.push('\n');
                current_line.clear();
                current = 0;
            }
            if current > 0 {
                current_line.push(' ');
                current += 1;
            }
            current_line.push_str(word);
            current += w;
        }
        if !current_line.is_empty() {
            out.push_str(&current_line);
            out.push('\n');
        }
    }

    match out.strip_suffix('\n') {
        Some(trimmed) => trimmed.to_string(),
        None => out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_short_is_unchanged() {
        assert_eq!(format_snippet("short", 80), "short");
        assert_eq!(format_snippet("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn snippet_truncates_with_ellipsis() {
        let out = format_snippet("a b c d e f g h", 10);
        assert_eq!(out, "a b c d...");
        assert!(out.ends_with("..."));
        assert!(width(&out) <= 10);
    }

    #[test]
    fn snippet_drops_everything_after_break() {
        let out = format_snippet("alpha beta gamma delta epsilon", 16);
        assert_eq!(out, "alpha beta...");
    }

    #[test]
    fn snippet_counts_chars_not_bytes() {
        // 7 chars, 21 bytes: fits.
        assert_eq!(format_snippet("日本語ニュース", 7), "日本語ニュース");
        assert_eq!(format_snippet("東京 大阪 名古屋 札幌", 10), "東京 大阪...");
    }

    #[test]
    fn snippet_first_word_too_long_is_just_ellipsis() {
        assert_eq!(format_snippet("supercalifragilistic", 10), "...");
    }

    #[test]
    fn text_short_is_unchanged() {
        assert_eq!(format_text("hello\nworld\n", 80), "hello\nworld\n");
    }

    #[test]
    fn text_wraps_long_lines_within_width() {
        let line = "the quick brown fox jumps over the lazy dog again and again";
        let out = format_text(line, 20);
        for l in out.lines() {
            assert!(width(l) <= 20, "line too long: {l:?}");
        }
        assert_eq!(out.split_whitespace().collect::<Vec<_>>().join(" "), line);
        assert_eq!(
            out,
            "the quick brown fox\njumps over the lazy\ndog again and again"
        );
    }

    #[test]
    fn text_keeps_short_lines_and_boundaries() {
        let text = "Title\n\none two three four five six seven eight\nend";
        let out = format_text(text, 12);
        assert_eq!(out, "Title\n\none two\nthree four\nfive six\nseven eight\nend");
    }

    #[test]
    fn text_preserves_inner_spacing_of_fitting_lines() {
        let text = "a  b\nccccc ddddd eeeee";
        assert_eq!(format_text(text, 11), "a  b\nccccc ddddd\neeeee");
    }

    #[test]
    fn text_strips_only_one_trailing_newline() {
        let text = "one two three four\n";
        assert_eq!(format_text(text, 9), "one two\nthree\nfour\n");
    }

    #[test]
    fn text_overlong_word_gets_own_line() {
        let out = format_text("a bbbbbbbbbbbb c", 5);
        assert_eq!(out, "a\nbbbbbbbbbbbb\nc");
    }
}
