//! Light Hebrew morphology: suffix stripping, final-letter forms, niqqud and
//! vowel-letter normalization.

/// Known inflectional suffixes, longest first.
const SUFFIXES: &[&str] = &["ייה", "יות", "ות", "ים", "יה", "ה", "ת", "י"];

fn is_hebrew_letter(c: char) -> bool {
    ('\u{05D0}'..='\u{05EA}').contains(&c)
}

fn is_niqqud(c: char) -> bool {
    matches!(c, '\u{0591}'..='\u{05C7}') && !matches!(c, '\u{05BE}' | '\u{05C0}' | '\u{05C3}' | '\u{05C6}')
}

fn to_sofit(c: char) -> char {
    match c {
        'כ' => 'ך',
        'מ' => 'ם',
        'נ' => 'ן',
        'פ' => 'ף',
        'צ' => 'ץ',
        other => other,
    }
}

fn from_sofit(c: char) -> char {
    match c {
        'ך' => 'כ',
        'ם' => 'מ',
        'ן' => 'נ',
        'ף' => 'פ',
        'ץ' => 'צ',
        other => other,
    }
}

pub fn contains_hebrew(s: &str) -> bool {
    s.chars().any(is_hebrew_letter)
}

/// Remove niqqud and cantillation marks.
pub fn strip_niqqud(s: &str) -> String {
    s.chars().filter(|c| !is_niqqud(*c)).collect()
}

/// Shortest stem a suffix may leave behind.
const MIN_STEM_LETTERS: usize = 3;

fn with_final_letter(chars: &[char]) -> String {
    let mut out = chars.to_vec();
    if let Some(last) = out.last_mut() {
        *last = to_sofit(*last);
    }
    out.into_iter().collect()
}

fn stem_once(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let stem_len = SUFFIXES
        .iter()
        .find(|suffix| {
            chars.len() >= suffix.chars().count() + MIN_STEM_LETTERS && word.ends_with(**suffix)
        })
        .map_or(chars.len(), |suffix| chars.len() - suffix.chars().count());
    with_final_letter(&chars[..stem_len])
}

/// Strip the longest known suffix once, keeping at least three letters, and
/// put the final letter in sofit form. A strip whose result would itself be
/// stripped again is not applied, so `stem_hebrew(stem_hebrew(w)) ==
/// stem_hebrew(w)` without eating into the root ("ביתי" stems to "בית").
pub fn stem_hebrew(word: &str) -> String {
    let stripped = strip_niqqud(word);
    if !contains_hebrew(&stripped) {
        return stripped;
    }
    let chars: Vec<char> = stripped.chars().collect();
    let base = with_final_letter(&chars);
    let once = stem_once(&base);
    if stem_once(&once) == once {
        once
    } else {
        base
    }
}

/// Plural stripping for Latin-script words. Idempotent.
fn stem_latin(word: &str) -> String {
    let len = word.chars().count();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Stem a normalized token in whichever script it is written in.
pub fn stem_token(token: &str) -> String {
    if contains_hebrew(token) {
        stem_hebrew(token)
    } else {
        stem_latin(token)
    }
}

/// Spelling-insensitive skeleton of a Hebrew word: niqqud removed, vowel
/// letters (ו, י) dropped after the first letter, final letters folded.
/// "שולחן" and "שלחן" share a skeleton.
pub fn vowel_skeleton(word: &str) -> String {
    strip_niqqud(word)
        .chars()
        .enumerate()
        .filter(|(i, c)| *i == 0 || !matches!(c, 'ו' | 'י'))
        .map(|(_, c)| from_sofit(c))
        .collect()
}
