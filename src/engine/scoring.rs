use crate::catalog::{Language, Verse};

/// Per-word match flags for `input` against `reference`.
///
/// Both strings are split on single spaces with no trimming, and words are
/// compared position by position ignoring case. A missing input word counts
/// as the empty string, so one dropped word shifts every later comparison.
/// An empty reference has no words.
pub fn word_marks(reference: &str, input: &str) -> Vec<bool> {
    if reference.is_empty() {
        return Vec::new();
    }
    let mut typed = input.split(' ');
    reference
        .split(' ')
        .map(|word| {
            let attempt = typed.next().unwrap_or("");
            word.to_lowercase() == attempt.to_lowercase()
        })
        .collect()
}

/// Accuracy of `input` as a whole percentage of reference words matched.
pub fn score(reference: &str, input: &str) -> u8 {
    let marks = word_marks(reference, input);
    if marks.is_empty() {
        return 0;
    }
    let matched = marks.iter().filter(|&&m| m).count();
    (matched as f64 / marks.len() as f64 * 100.0).round() as u8
}

pub fn score_verse(verse: &Verse, input: &str, language: Language) -> u8 {
    score(verse.text(language), input)
}
