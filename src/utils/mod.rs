//! Project-specific utilities live here.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Fold text for case- and accent-insensitive comparison.
///
/// Decomposes to NFD, drops combining marks and lower-cases, so `"Émile"`,
/// `"emile"` and `"EMILE"` all fold to `"emile"`.
pub fn fold_search_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse the leading integer of `raw` the way query strings are usually read:
/// leading whitespace and an optional sign are accepted and parsing stops at
/// the first non-digit (`"12abc"` is 12). `None` when there are no digits or
/// the value does not fit in an `i64`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_and_case() {
        assert_eq!(fold_search_text("Machado de ASSIS"), "machado de assis");
        assert_eq!(fold_search_text("Émile Zola"), "emile zola");
        assert_eq!(fold_search_text("São Bernardo"), "sao bernardo");
        assert_eq!(fold_search_text("Coração"), "coracao");
    }

    #[test]
    fn leading_int_accepts_prefixes() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int("  7 "), Some(7));
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("-5"), Some(-5));
        assert_eq!(parse_leading_int("+3"), Some(3));
        assert_eq!(parse_leading_int("1899.5"), Some(1899));
    }

    #[test]
    fn leading_int_rejects_non_numbers() {
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), None);
    }
}
