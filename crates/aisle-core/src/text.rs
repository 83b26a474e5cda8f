//! Text normalization shared by filters, scoring, and extraction.
//!
//! All comparisons in the engine run on normalized text: quote variants
//! collapsed to ASCII, lowercased, whitespace collapsed. Normalization is
//! idempotent.

/// Collapse quote and apostrophe variants (Hebrew geresh/gershayim, curly
/// quotes, primes, backticks) to their ASCII equivalents.
pub fn normalize_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{05F3}' | '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}'
            | '\u{0060}' | '\u{00B4}' => '\'',
            '\u{05F4}' | '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{05BE}' => '-',
            other => other,
        })
        .collect()
}

/// Quote-normalize, lowercase, trim, and collapse internal whitespace.
pub fn normalize_text(s: &str) -> String {
    let quoted = normalize_quotes(s);
    let lower = quoted.to_lowercase();
    lower.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalization for category, type, and color values.
pub fn normalize_category(s: &str) -> String {
    normalize_text(s)
}

/// Split normalized text into word tokens.
///
/// Apostrophes and double quotes inside a word are kept (Hebrew transliterations
/// such as `ג'ינס` and acronyms such as `בע"מ` rely on them); surrounding
/// punctuation is dropped.
pub fn tokenize(s: &str) -> Vec<String> {
    normalize_text(s)
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '"' || c == '.'))
        .map(|t| t.trim_matches(|c: char| c == '\'' || c == '"' || c == '.'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case- and quote-insensitive equality.
pub fn eq_normalized(a: &str, b: &str) -> bool {
    normalize_category(a) == normalize_category(b)
}

/// Whether any value of `have` equals (normalized) any value of `want`.
pub fn intersects_normalized(have: &[String], want: &[String]) -> bool {
    want.iter()
        .map(|w| normalize_category(w))
        .any(|w| have.iter().any(|h| normalize_category(h) == w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_collapse_to_ascii() {
        assert_eq!(normalize_quotes("ג\u{05F3}ינס"), "ג'ינס");
        assert_eq!(normalize_quotes("\u{201C}hi\u{201D}"), "\"hi\"");
        assert_eq!(normalize_quotes("it\u{2019}s"), "it's");
    }

    #[test]
    fn normalize_text_is_idempotent() {
        let once = normalize_text("  Red   WINE\u{2019}s ");
        assert_eq!(once, "red wine's");
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn tokenize_keeps_inner_apostrophes() {
        assert_eq!(tokenize("ג'ינס כחול, 2023!"), vec!["ג'ינס", "כחול", "2023"]);
        assert_eq!(tokenize("'quoted'"), vec!["quoted"]);
    }

    #[test]
    fn intersection_ignores_case() {
        let have = vec!["Red Wine".to_string()];
        assert!(intersects_normalized(&have, &["red wine".to_string()]));
        assert!(!intersects_normalized(&have, &["white wine".to_string()]));
    }
}
