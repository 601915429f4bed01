//! Identifier spelling shared by the backends.

use std::fmt::Write;

/// Rewrites `text` into an ASCII identifier.
///
/// ASCII letters, digits and `_` pass through. Every other character becomes
/// `x` followed by its lower-case hex code point. A leading digit gets a `_`
/// prefix. Returns an empty string for empty input.
pub fn sanitize_identifier(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if out.is_empty() && ch.is_ascii_digit() {
                out.push('_');
            }
            out.push(ch);
        } else {
            let _ = write!(out, "x{:x}", ch as u32);
        }
    }
    out
}

/// Appends `_` while `ident` collides with a reserved word.
pub fn avoid_keywords(mut ident: String, keywords: &[&str]) -> String {
    while keywords.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(sanitize_identifier("snake_case9"), "snake_case9");
    }

    #[test]
    fn test_non_ascii_escapes() {
        assert_eq!(sanitize_identifier("τó🐝"), "x3c4ox301x1f41d");
        assert_eq!(sanitize_identifier("a-b"), "ax2db");
    }

    #[test]
    fn test_leading_digit() {
        assert_eq!(sanitize_identifier("9lives"), "_9lives");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(avoid_keywords("end".into(), &["end", "end_"]), "end__");
        assert_eq!(avoid_keywords("ends".into(), &["end"]), "ends");
    }
}
