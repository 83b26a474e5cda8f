//! Rule-based price recognition for Hebrew and English queries.
//!
//! Recognized forms, tried in order: ranges ("50-100", "between 50 and 100",
//! "בין 50 ל-100"), upper bounds ("up to 100", "עד 100"), lower bounds
//! ("from 100", "מעל 100"), and targets ("around 100", "בסביבות 100",
//! "100 ₪").

use std::sync::LazyLock;

use aisle_core::text::normalize_text;
use regex::{Captures, Regex};

/// Prices recognized in a query, plus the text that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceMatch {
    pub price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// The matched fragment of the normalized query.
    pub matched: String,
}

macro_rules! price_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($pattern).ok());
    };
}

// Numbers: "1,200", "99.90", "100".
const NUM: &str = r"(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)";
const CUR: &str = r#"\s*(?:₪|\$|ש"ח|שקלים|שקל|nis|ils|shekels?|dollars?)?"#;

price_regex!(
    RANGE_WORDS,
    &format!(r"(?i)(?:between|בין)\s*[₪$]?{NUM}{CUR}\s*(?:and|to|-|עד|ל-?)\s*[₪$]?{NUM}{CUR}")
);
price_regex!(
    RANGE_DASH,
    &format!(r"(?i)[₪$]?{NUM}{CUR}\s*(?:-|to|עד)\s*[₪$]?{NUM}{CUR}")
);
price_regex!(
    MAX,
    &format!(
        r"(?i)(?:up\s+to|under|below|less\s+than|cheaper\s+than|no\s+more\s+than|max(?:imum)?|עד|פחות\s+מ-?|מתחת\s+ל-?|לא\s+יותר\s+מ-?)\s*[₪$]?{NUM}{CUR}"
    )
);
price_regex!(
    MIN,
    &format!(
        r"(?i)(?:\b(?:from|over|above|more\s+than|at\s+least|min(?:imum)?|starting\s+at)|(?:^|\s)(?:החל\s+מ-?|מעל|יותר\s+מ-?|לפחות|מ-?))\s*[₪$]?{NUM}{CUR}"
    )
);
price_regex!(
    AROUND,
    &format!(
        r"(?i)(?:around|about|approximately|roughly|~|בסביבות|בערך|סביב|כ-)\s*[₪$]?{NUM}{CUR}"
    )
);
price_regex!(
    BARE_CURRENCY,
    r#"(?i)(?:[₪$]\s*(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)|(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*(?:₪|ש"ח|שקלים|שקל|nis|ils|shekels?|dollars?))"#
);

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "").parse::<f64>().ok()
}

fn group(caps: &Captures<'_>, i: usize) -> Option<f64> {
    caps.get(i).and_then(|m| parse_number(m.as_str()))
}

fn first_match<'a>(re: &LazyLock<Option<Regex>>, text: &'a str) -> Option<Captures<'a>> {
    re.as_ref().and_then(|r| r.captures(text))
}

fn matched(caps: &Captures<'_>) -> String {
    caps.get(0).map(|m| m.as_str().trim().to_string()).unwrap_or_default()
}

/// Recognize a price constraint in `query`.
pub fn extract_price(query: &str) -> Option<PriceMatch> {
    let text = normalize_text(query);

    for re in [&RANGE_WORDS, &RANGE_DASH] {
        if let Some(caps) = first_match(re, &text) {
            if let (Some(a), Some(b)) = (group(&caps, 1), group(&caps, 2)) {
                return Some(PriceMatch {
                    price: None,
                    min_price: Some(a.min(b)),
                    max_price: Some(a.max(b)),
                    matched: matched(&caps),
                });
            }
        }
    }
    if let Some(caps) = first_match(&MAX, &text) {
        return group(&caps, 1).map(|v| PriceMatch {
            price: None,
            min_price: None,
            max_price: Some(v),
            matched: matched(&caps),
        });
    }
    if let Some(caps) = first_match(&MIN, &text) {
        return group(&caps, 1).map(|v| PriceMatch {
            price: None,
            min_price: Some(v),
            max_price: None,
            matched: matched(&caps),
        });
    }
    for re in [&AROUND, &BARE_CURRENCY] {
        if let Some(caps) = first_match(re, &text) {
            let value = group(&caps, 1).or_else(|| group(&caps, 2));
            if let Some(v) = value {
                return Some(PriceMatch {
                    price: Some(v),
                    min_price: None,
                    max_price: None,
                    matched: matched(&caps),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(q: &str) -> (Option<f64>, Option<f64>, Option<f64>) {
        let m = extract_price(q).unwrap_or_else(|| panic!("no price in {q:?}"));
        (m.price, m.min_price, m.max_price)
    }

    #[test]
    fn english_bounds() {
        assert_eq!(bounds("red wine up to 100"), (None, None, Some(100.0)));
        assert_eq!(bounds("whisky under $80"), (None, None, Some(80.0)));
        assert_eq!(bounds("gift from 200"), (None, Some(200.0), None));
        assert_eq!(bounds("wine around 50"), (Some(50.0), None, None));
    }

    #[test]
    fn hebrew_bounds() {
        assert_eq!(bounds("יין אדום עד 100 ש\"ח"), (None, None, Some(100.0)));
        assert_eq!(bounds("ויסקי מעל 200"), (None, Some(200.0), None));
        assert_eq!(bounds("יין מ-150"), (None, Some(150.0), None));
        assert_eq!(bounds("בסביבות 80 שקל"), (Some(80.0), None, None));
    }

    #[test]
    fn ranges() {
        assert_eq!(bounds("wine 50-100"), (None, Some(50.0), Some(100.0)));
        assert_eq!(bounds("between 100 and 50"), (None, Some(50.0), Some(100.0)));
        assert_eq!(bounds("בין 50 ל-100"), (None, Some(50.0), Some(100.0)));
        assert_eq!(bounds("wine 50\u{2013}100"), (None, Some(50.0), Some(100.0)));
    }

    #[test]
    fn bare_currency_is_a_target() {
        assert_eq!(bounds("wine 120 ₪"), (Some(120.0), None, None));
        assert_eq!(bounds("gift 1,200 nis"), (Some(1200.0), None, None));
    }

    #[test]
    fn plain_numbers_are_not_prices() {
        assert!(extract_price("glenfiddich 12").is_none());
        assert!(extract_price("barolo 2016").is_none());
    }

    #[test]
    fn matched_fragment_is_reported() {
        let m = extract_price("red wine up to 100").unwrap();
        assert_eq!(m.matched, "up to 100");
    }
}
