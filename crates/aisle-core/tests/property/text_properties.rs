use aisle_core::text::{normalize_category, normalize_quotes, normalize_text, tokenize};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalize_text_is_idempotent(s in "\\PC{0,80}") {
        let once = normalize_text(&s);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn normalize_category_is_idempotent(s in "[a-zA-Zא-ת '\u{05F3}\u{2019}]{0,40}") {
        let once = normalize_category(&s);
        prop_assert_eq!(normalize_category(&once), once);
    }

    #[test]
    fn quote_normalization_preserves_char_count(s in "\\PC{0,80}") {
        prop_assert_eq!(normalize_quotes(&s).chars().count(), s.chars().count());
    }

    #[test]
    fn tokens_contain_no_whitespace(s in "\\PC{0,80}") {
        for t in tokenize(&s) {
            prop_assert!(!t.is_empty());
            prop_assert!(!t.chars().any(char::is_whitespace));
        }
    }
}
