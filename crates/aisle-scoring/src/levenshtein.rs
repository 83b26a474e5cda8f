//! Bounded edit distance.

/// Inputs longer than this many characters are truncated before comparison.
pub const MAX_INPUT_CHARS: usize = 100;

/// Classic Levenshtein distance over chars, using two rolling rows sized to
/// the shorter input. Each input is capped at [`MAX_INPUT_CHARS`].
pub fn levenshtein(a: &str, b: &str) -> usize {
    levenshtein_capped(a, b, MAX_INPUT_CHARS)
}

pub fn levenshtein_capped(a: &str, b: &str, cap: usize) -> usize {
    let a: Vec<char> = a.chars().take(cap).collect();
    let b: Vec<char> = b.chars().take(cap).collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// `1 - distance / max_len`, in `0.0..=1.0`. Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_capped(a, b, MAX_INPUT_CHARS)
}

pub fn similarity_capped(a: &str, b: &str, cap: usize) -> f64 {
    let max_len = a.chars().take(cap).count().max(b.chars().take(cap).count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_capped(a, b, cap) as f64 / max_len as f64
}
