//! Five-way vulnerability type scoring
//!
//! A gold answer is `"<Letter>.<label>"` or `"primary|secondary"`. An output
//! matches a gold part through either of two signals: it contains the part's
//! letter followed by a period, or it names a CWE number the part also names.

use super::{SampleScore, Scored};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static CWE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"CWE[-|:| ]?\s?(\d{1,3})").ok());

/// Primary and secondary gold parts
struct GoldParts<'a> {
    primary: &'a str,
    secondary: &'a str,
}

impl<'a> GoldParts<'a> {
    fn parse(gold: &'a str) -> Self {
        let mut parts = gold.split('|');
        let primary = parts.next().unwrap_or_default();
        // A lone gold part is both the primary and the secondary
        let secondary = parts.next().unwrap_or(primary);
        Self { primary, secondary }
    }
}

fn letter(part: &str) -> String {
    part.chars().next().map(String::from).unwrap_or_default()
}

fn letter_hit(output: &str, letter: &str) -> bool {
    !letter.is_empty() && output.contains(&format!("{letter}."))
}

fn cwe_numbers(text: &str) -> HashSet<&str> {
    let Some(pattern) = CWE_PATTERN.as_ref() else {
        return HashSet::new();
    };
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

fn cwe_hit(output: &str, part: &str) -> bool {
    let named = cwe_numbers(output);
    cwe_numbers(part).iter().any(|n| named.contains(n))
}

/// 1 when either signal matches the primary or the secondary part
pub(crate) fn moderate(output: &str, gold: &str) -> Scored {
    let gold = GoldParts::parse(gold);
    let primary = letter(gold.primary);
    let secondary = letter(gold.secondary);
    let mut extracted = String::new();

    let mut by_letter = 0.0;
    if letter_hit(output, &primary) {
        by_letter = 1.0;
        extracted = primary.clone();
    } else if letter_hit(output, &secondary) {
        by_letter = 1.0;
        extracted = secondary.clone();
    }

    let mut by_cwe = 0.0;
    if cwe_hit(output, gold.primary) {
        by_cwe = 1.0;
        extracted = primary;
    } else if cwe_hit(output, gold.secondary) {
        by_cwe = 1.0;
        extracted = secondary;
    }

    Scored {
        extracted_answer: extracted,
        score: SampleScore::Graded(f64::max(by_letter, by_cwe)),
    }
}

/// Per signal: primary +1, secondary +0.5, both (1.5) collapses to 0.
/// The sample scores the better of the two signals. A gold without a
/// secondary repeats its primary, so any match on it collapses.
pub(crate) fn strict(output: &str, gold: &str) -> Scored {
    let gold = GoldParts::parse(gold);
    let primary = letter(gold.primary);
    let secondary = letter(gold.secondary);
    let mut extracted = String::new();

    let mut by_letter: f64 = 0.0;
    if letter_hit(output, &primary) {
        by_letter += 1.0;
        extracted = primary.clone();
    }
    if letter_hit(output, &secondary) {
        by_letter += 0.5;
        if by_letter < 1.0 {
            extracted = secondary.clone();
        }
    }
    if by_letter == 1.5 {
        by_letter = 0.0;
        extracted.clear();
    }

    let mut by_cwe: f64 = 0.0;
    if cwe_hit(output, gold.primary) {
        by_cwe += 1.0;
        extracted = primary;
    }
    if cwe_hit(output, gold.secondary) {
        by_cwe += 0.5;
        extracted = secondary;
    }
    if by_cwe == 1.5 {
        by_cwe = 0.0;
        extracted.clear();
    }

    Scored {
        extracted_answer: extracted,
        score: SampleScore::Graded(by_letter.max(by_cwe)),
    }
}

/// Arithmetic mean; 0 for no samples
pub(crate) fn mean(scores: &[SampleScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(SampleScore::value).sum::<f64>() / scores.len() as f64
}
