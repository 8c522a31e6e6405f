//! Binary vulnerability-existence scoring

use super::{Confusion, Scored, SampleScore};

/// Whether a text reads as a "vulnerable" verdict
fn is_affirmative(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("yes") || lower.contains("is vulnerable")
}

/// Classify one answer against its gold label
pub(crate) fn hit(output: &str, gold: &str) -> Scored {
    let predicted = is_affirmative(output);
    let expected = is_affirmative(gold);

    let confusion = match (predicted, expected) {
        (true, true) => Confusion::TruePositive,
        (true, false) => Confusion::FalsePositive,
        (false, false) => Confusion::TrueNegative,
        (false, true) => Confusion::FalseNegative,
    };

    Scored {
        extracted_answer: if predicted { "YES" } else { "NO" }.to_string(),
        score: SampleScore::Confusion(confusion),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counts {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

fn pooled(scores: &[SampleScore]) -> Counts {
    let mut counts = Counts::default();
    for score in scores {
        if let SampleScore::Confusion(c) = score {
            match c {
                Confusion::TruePositive => counts.tp += 1,
                Confusion::FalsePositive => counts.fp += 1,
                Confusion::TrueNegative => counts.tn += 1,
                Confusion::FalseNegative => counts.fn_ += 1,
            }
        }
    }
    counts
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// `(TP+TN) / total` over pooled counts
pub(crate) fn accuracy(scores: &[SampleScore]) -> f64 {
    let c = pooled(scores);
    let total = (c.tp + c.fp + c.tn + c.fn_) as f64;
    ratio((c.tp + c.tn) as f64, total).unwrap_or(0.0)
}

/// `2PR / (P+R)` with `P = TP/(TP+FN)` and `R = TP/(TP+FP)`; any zero
/// denominator gives 0
pub(crate) fn f1(scores: &[SampleScore]) -> f64 {
    let c = pooled(scores);
    let tp = c.tp as f64;
    let f1 = ratio(tp, (c.tp + c.fn_) as f64).and_then(|p| {
        ratio(tp, (c.tp + c.fp) as f64).and_then(|r| ratio(2.0 * p * r, p + r))
    });
    f1.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, &str)]) -> Vec<SampleScore> {
        pairs.iter().map(|(o, g)| hit(o, g).score).collect()
    }

    #[test]
    fn test_hit_classification() {
        assert_eq!(
            hit("Yes, it is.", "YES").score,
            SampleScore::Confusion(Confusion::TruePositive)
        );
        assert_eq!(
            hit("The code is vulnerable", "NO").score,
            SampleScore::Confusion(Confusion::FalsePositive)
        );
        assert_eq!(
            hit("NO", "NO").score,
            SampleScore::Confusion(Confusion::TrueNegative)
        );
        assert_eq!(
            hit("", "YES").score,
            SampleScore::Confusion(Confusion::FalseNegative)
        );
        assert_eq!(hit("no issues", "YES").extracted_answer, "NO");
        assert_eq!(hit("YES", "NO").extracted_answer, "YES");
    }

    #[test]
    fn test_one_of_each_outcome() {
        let s = scores(&[("YES", "YES"), ("NO", "NO"), ("YES", "NO"), ("NO", "YES")]);
        assert_eq!(accuracy(&s), 0.5);
        assert_eq!(f1(&s), 0.5);
    }

    #[test]
    fn test_no_positives_gives_zero_f1() {
        let s = scores(&[("NO", "NO"), ("NO", "NO")]);
        assert_eq!(accuracy(&s), 1.0);
        assert_eq!(f1(&s), 0.0);
    }

    #[test]
    fn test_empty_scores() {
        assert_eq!(accuracy(&[]), 0.0);
        assert_eq!(f1(&[]), 0.0);
    }
}
