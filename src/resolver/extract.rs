// src/resolver/extract.rs
// =============================================================================
// This module pulls a numeric profile ID out of a resolved page.
//
// Two steps, always in this order:
// 1. Look at the final URL (after redirects). Profile URLs like
//    profile.php?id=123 or facebook.com/123 are canonical, so they win.
// 2. Scan the HTML body for ID fields the site embeds in inline scripts
//    and meta tags. The pattern list is a priority ranking: most reliable
//    first. The first pattern that matches anywhere in the body wins, even
//    if a lower-ranked pattern appears earlier in the text.
//
// Rust concepts:
// - LazyLock: Compile each regex once, on first use
// - Iterators: find_map stops at the first pattern that matches
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

// Numeric ID directly in the URL
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:profile\.php\?id=|facebook\.com/|fb://profile/)(\d+)")
        .expect("url id regex is valid")
});

// Embedded ID fields, highest priority first. Do not reorder.
const BODY_PATTERNS: [&str; 8] = [
    r#""userID":"(\d+)""#,
    r#""authorID":"(\d+)""#,
    r#""node_id":"(\d+)""#,
    r#""entity_id":"(\d+)""#,
    r#""delegate_page":\{"id":"(\d+)"\}"#,
    r"fb://profile/(\d+)",
    r#"content="fb://profile/(\d+)""#,
    r#""owning_profile_id":"(\d+)""#,
];

static BODY_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BODY_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("body id regex is valid"))
        .collect()
});

// Extracts a profile ID from a resolved page
//
// Parameters:
//   final_url: the URL after all redirects were followed
//   body: the full response body
//
// Returns: Some(id) with only ASCII digits, or None if nothing matched
pub fn extract_id(final_url: &str, body: &str) -> Option<String> {
    if let Some(id) = first_capture(&URL_PATTERN, final_url) {
        return Some(id);
    }

    BODY_REGEXES.iter().find_map(|re| first_capture(re, body))
}

fn first_capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
