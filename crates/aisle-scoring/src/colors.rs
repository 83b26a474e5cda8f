//! Cross-language color synonym groups.
//!
//! Each group lists a base color and its shades in English and Hebrew. Every
//! term belongs to exactly one group, so expansion is closed and idempotent.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use aisle_core::text::normalize_category;

const COLOR_GROUPS: &[&[&str]] = &[
    &["red", "אדום", "burgundy", "בורדו", "wine", "maroon", "crimson", "ruby", "scarlet", "ארגמן"],
    &["white", "לבן", "cream", "קרם", "ivory", "שנהב", "off-white", "offwhite"],
    &["black", "שחור", "charcoal", "פחם", "jet black"],
    &["blue", "כחול", "navy", "נייבי", "turquoise", "טורקיז", "light blue", "תכלת", "royal blue"],
    &["green", "ירוק", "olive", "זית", "mint", "מנטה", "khaki", "חאקי", "emerald"],
    &["pink", "ורוד", "rose", "רוז", "blush", "fuchsia", "פוקסיה", "salmon", "סלמון"],
    &["yellow", "צהוב", "mustard", "חרדל", "gold", "זהב", "זהוב", "lemon"],
    &["brown", "חום", "beige", "בז'", "camel", "קאמל", "tan", "chocolate", "שוקולד"],
    &["gray", "grey", "אפור", "silver", "כסף", "כסוף"],
    &["purple", "סגול", "lilac", "לילך", "lavender", "לבנדר", "violet"],
    &["orange", "כתום", "coral", "קורל", "peach", "אפרסק"],
];

/// Normalized term -> group index.
static COLOR_INDEX: LazyLock<HashMap<String, usize>> = LazyLock::new(|| {
    COLOR_GROUPS
        .iter()
        .enumerate()
        .flat_map(|(i, group)| group.iter().map(move |term| (normalize_category(term), i)))
        .collect()
});

/// Synonyms of a single color, including itself. Unknown colors map to
/// themselves only.
pub fn color_synonyms(color: &str) -> BTreeSet<String> {
    let key = normalize_category(color);
    match COLOR_INDEX.get(&key) {
        Some(&group) => COLOR_GROUPS[group].iter().map(|t| normalize_category(t)).collect(),
        None => BTreeSet::from([key]),
    }
}

/// The input colors unioned with every synonym of each, normalized.
pub fn expand_similar_colors<S: AsRef<str>>(colors: &[S]) -> BTreeSet<String> {
    colors
        .iter()
        .flat_map(|c| color_synonyms(c.as_ref()))
        .collect()
}

/// Whether two colors belong to the same synonym group.
pub fn same_color_family(a: &str, b: &str) -> bool {
    color_synonyms(a).contains(&normalize_category(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_term_belongs_to_one_group() {
        let total: usize = COLOR_GROUPS.iter().map(|g| g.len()).sum();
        assert_eq!(COLOR_INDEX.len(), total);
    }

    #[test]
    fn expansion_is_bidirectional() {
        assert!(expand_similar_colors(&["red"]).contains("burgundy"));
        assert!(expand_similar_colors(&["burgundy"]).contains("red"));
        assert!(expand_similar_colors(&["בורדו"]).contains("אדום"));
    }

    #[test]
    fn expansion_includes_input() {
        let out = expand_similar_colors(&["Chartreuse"]);
        assert_eq!(out, BTreeSet::from(["chartreuse".to_string()]));
    }

    #[test]
    fn expansion_is_idempotent() {
        let once = expand_similar_colors(&["white", "navy"]);
        let v: Vec<String> = once.iter().cloned().collect();
        assert_eq!(expand_similar_colors(&v), once);
    }

    #[test]
    fn cross_language_family() {
        assert!(same_color_family("White", "שנהב"));
        assert!(!same_color_family("white", "black"));
    }
}
