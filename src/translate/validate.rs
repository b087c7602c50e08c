//! Structural checks on a backend response.
//!
//! Nothing here looks at meaning. A response is accepted when its emphasis
//! markup is balanced, it splits into one segment per submitted entry, and it
//! carries no markdown fencing.

use once_cell::sync::Lazy;
use regex::Regex;

use super::prompt::SEGMENT_SEPARATOR;
use crate::error::ValidationFailure;

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\s*i\s*>").expect("valid regex"));
static CLOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<\s*/\s*i\s*>").expect("valid regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid regex"));

const FORBIDDEN: char = '`';

/// Validate `raw` against a window of `expected` entries and return one segment per entry.
pub fn validate_response(raw: &str, expected: usize) -> Result<Vec<String>, ValidationFailure> {
    let content = normalize_markup(raw);

    let open = content.matches("<i>").count();
    let close = content.matches("</i>").count();
    if open != close {
        return Err(ValidationFailure::UnbalancedTags { open, close });
    }

    let segments: Vec<String> = content
        .split(SEGMENT_SEPARATOR)
        .map(|segment| segment.trim().to_string())
        .collect();
    if segments.len() != expected {
        return Err(ValidationFailure::SegmentCount {
            expected,
            actual: segments.len(),
        });
    }
    if let Some(position) = segments.iter().position(|segment| segment.is_empty()) {
        return Err(ValidationFailure::EmptySegment { position });
    }

    if segments.iter().any(|segment| segment.contains(FORBIDDEN)) {
        return Err(ValidationFailure::ForbiddenToken(FORBIDDEN));
    }

    Ok(segments)
}

/// Tidy whitespace inside `<i>`/`</i>` and drop any other tag.
///
/// A foreign tag survives when a `</i>` follows it on the same line, so an
/// emphasised span with odd markup inside is not torn apart.
pub fn normalize_markup(raw: &str) -> String {
    let content = raw.trim();
    let content = OPEN_TAG.replace_all(content, "<i>");
    let content = CLOSE_TAG.replace_all(&content, "</i>");

    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for tag in ANY_TAG.find_iter(&content) {
        out.push_str(&content[last..tag.start()]);
        let keep = matches!(tag.as_str(), "<i>" | "</i>")
            || closes_emphasis_later(&content[tag.end()..]);
        if keep {
            out.push_str(tag.as_str());
        }
        last = tag.end();
    }
    out.push_str(&content[last..]);
    out
}

fn closes_emphasis_later(rest: &str) -> bool {
    rest.split('\n')
        .next()
        .is_some_and(|line| line.contains("</i>"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_response() {
        let raw = "  Bonjour.\n\n<i>Au revoir</i>, mon ami.\n\n- Oui ?\n- Non.\n";
        let segments = validate_response(raw, 3).unwrap();
        assert_eq!(
            segments,
            vec!["Bonjour.", "<i>Au revoir</i>, mon ami.", "- Oui ?\n- Non."]
        );
    }

    #[test]
    fn test_rejects_unclosed_tag() {
        assert_eq!(
            validate_response("<i>hello", 1),
            Err(ValidationFailure::UnbalancedTags { open: 1, close: 0 })
        );
    }

    #[test]
    fn test_tag_balance_checked_before_count() {
        assert!(matches!(
            validate_response("<i>a\n\nb\n\nc", 2),
            Err(ValidationFailure::UnbalancedTags { .. })
        ));
    }

    #[test]
    fn test_rejects_segment_count_mismatch() {
        assert_eq!(
            validate_response("un\n\ndeux\n\ntrois", 2),
            Err(ValidationFailure::SegmentCount { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn test_rejects_backtick() {
        assert_eq!(
            validate_response("```\nun\n\ndeux```", 2),
            Err(ValidationFailure::ForbiddenToken('`'))
        );
    }

    #[test]
    fn test_rejects_empty_segment() {
        assert_eq!(
            validate_response("un\n\n \n\ndeux", 3),
            Err(ValidationFailure::EmptySegment { position: 1 })
        );
    }

    #[test]
    fn test_normalizes_tag_whitespace() {
        assert_eq!(normalize_markup("< i >oui< / i >"), "<i>oui</i>");
        assert!(validate_response("< i>oui</i >", 1).is_ok());
    }

    #[test]
    fn test_strips_foreign_tags() {
        assert_eq!(
            normalize_markup("<font color=\"#fff\">Salut</font> toi"),
            "Salut toi"
        );
        assert_eq!(normalize_markup("a <br/> b"), "a  b");
    }

    #[test]
    fn test_keeps_foreign_tag_before_emphasis_close() {
        assert_eq!(normalize_markup("<i>un <b>deux</b></i>"), "<i>un <b>deux</b></i>");
        // only the same line counts
        assert_eq!(normalize_markup("<b>x\n</i>"), "x\n</i>");
    }
}
