//! Utility functions and helpers.

pub mod http;

use unicode_segmentation::UnicodeSegmentation;
use url::Url;

/// Collapse every whitespace run to a single space and trim the ends.
pub fn clean_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a potentially relative link against a base URL.
///
/// Links that already carry a scheme are returned verbatim. Bare paths,
/// relative paths and protocol-relative (`//host/path`) forms are joined
/// onto `base`. Returns `None` when the link is empty or cannot be resolved.
pub fn resolve_link(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }
    Url::parse(base)
        .ok()?
        .join(href)
        .ok()
        .map(|u| u.to_string())
}

/// Truncate to at most `max` UTF-16 code units, appending `…` when cut.
///
/// Chat providers measure message length in UTF-16 units; cuts only fall on
/// grapheme boundaries so emoji sequences are never split.
pub fn truncate_utf16(s: &str, max: usize) -> String {
    if s.encode_utf16().count() <= max {
        return s.to_string();
    }
    let budget = max.saturating_sub('…'.len_utf16());
    if budget == 0 {
        return String::new();
    }

    let mut used = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let len = grapheme.encode_utf16().count();
        if used + len > budget {
            break;
        }
        used += len;
        out.push_str(grapheme);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(
            clean_whitespace("  Data\n\tAnalyst   (Remote) "),
            "Data Analyst (Remote)"
        );
        assert_eq!(clean_whitespace(" \n\t "), "");
    }

    #[test]
    fn test_resolve_link_absolute_verbatim() {
        assert_eq!(
            resolve_link("https://example.com/path/", "https://other.com/x"),
            Some("https://other.com/x".to_string())
        );
    }

    #[test]
    fn test_resolve_link_bare_path() {
        assert_eq!(
            resolve_link("https://www.jobberman.com/jobs?q=x", "/job/123"),
            Some("https://www.jobberman.com/job/123".to_string())
        );
    }

    #[test]
    fn test_resolve_link_relative_path() {
        assert_eq!(
            resolve_link("https://example.com/path/index.html", "other.html"),
            Some("https://example.com/path/other.html".to_string())
        );
    }

    #[test]
    fn test_resolve_link_protocol_relative() {
        assert_eq!(
            resolve_link("https://example.com/jobs", "//cdn.example.com/job/9"),
            Some("https://cdn.example.com/job/9".to_string())
        );
    }

    #[test]
    fn test_resolve_link_empty_or_unresolvable() {
        assert_eq!(resolve_link("https://example.com", "   "), None);
        assert_eq!(resolve_link("not a base", "/job/1"), None);
    }

    #[test]
    fn test_truncate_utf16() {
        assert_eq!(truncate_utf16("short", 10), "short");
        assert_eq!(truncate_utf16("abcdef", 4), "abc…");
        assert_eq!(truncate_utf16("abc", 0), "");
        assert_eq!(truncate_utf16("abcdef", 1), "");
    }

    #[test]
    fn test_truncate_utf16_counts_surrogate_pairs() {
        // each 🔥 is two UTF-16 units
        let cut = truncate_utf16("🔥🔥🔥", 4);
        assert_eq!(cut, "🔥…");
        assert!(cut.encode_utf16().count() <= 4);

        // an 8-unit family emoji is dropped whole rather than split
        let family = "ab👨\u{200d}👩\u{200d}👧";
        assert_eq!(family.encode_utf16().count(), 10);
        assert_eq!(truncate_utf16(family, 5), "ab…");
    }

    #[test]
    fn test_truncate_utf16_respects_limit_for_emoji_heavy_text() {
        let text = "🔥".repeat(3000);
        let cut = truncate_utf16(&text, 4096);
        assert!(cut.encode_utf16().count() <= 4096);
        assert!(cut.ends_with('…'));
    }
}
