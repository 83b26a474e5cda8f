//! Overlap resolution between extracted vocabulary values.

use std::collections::HashSet;

use aisle_core::text::{normalize_category, tokenize};

/// `general` is subsumed by `specific`: every token of `general` appears in
/// `specific`, which has strictly more tokens ("Wine" by "Red Wine"). Shared
/// characters inside a word do not count: "Gin" is not subsumed by
/// "Ginger Beer".
fn is_subsumed(general: &str, specific: &str) -> bool {
    let g = normalize_category(general);
    let s = normalize_category(specific);
    if g == s || g.is_empty() {
        return false;
    }
    let g_tokens: HashSet<String> = tokenize(&g).into_iter().collect();
    let s_tokens: HashSet<String> = tokenize(&s).into_iter().collect();
    s_tokens.len() > g_tokens.len() && g_tokens.is_subset(&s_tokens)
}

/// Keep only the most specific of overlapping values, preserving order and
/// dropping normalized duplicates.
pub fn keep_most_specific(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let deduped: Vec<String> = values
        .into_iter()
        .filter(|v| seen.insert(normalize_category(v)))
        .collect();

    deduped
        .iter()
        .filter(|v| !deduped.iter().any(|other| is_subsumed(v, other)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_the_general_category() {
        assert_eq!(keep_most_specific(strs(&["Wine", "Red Wine"])), strs(&["Red Wine"]));
        assert_eq!(keep_most_specific(strs(&["Red Wine", "wine"])), strs(&["Red Wine"]));
    }

    #[test]
    fn unrelated_values_survive() {
        let v = strs(&["Red Wine", "White Wine"]);
        assert_eq!(keep_most_specific(v.clone()), v);
    }

    #[test]
    fn shared_prefixes_are_not_overlap() {
        let v = strs(&["Gin", "Ginger Beer"]);
        assert_eq!(keep_most_specific(v.clone()), v);
        let v = strs(&["Port", "Sports Drinks"]);
        assert_eq!(keep_most_specific(v.clone()), v);
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(keep_most_specific(strs(&["Beer", "beer"])), strs(&["Beer"]));
    }

    #[test]
    fn hebrew_substrings() {
        assert_eq!(keep_most_specific(strs(&["יין", "יין אדום"])), strs(&["יין אדום"]));
    }
}
