use pretty_assertions::assert_eq;
use vulnrag_core::{AnswerRecord, PromptEnvelope};
use vulnrag_evaluator::{Evaluator, MetricFamily};

fn existence_evaluator() -> Evaluator {
    let family = MetricFamily::from_names(&["hit", "hit"], &["Accuracy", "F1-Score"]).unwrap();
    Evaluator::new("Vulnerability Existence Detection", family)
}

fn type_infer_evaluator() -> Evaluator {
    let family = MetricFamily::from_names(
        &["Moderate Evaluation Score", "Strict Evaluation Score"],
        &["Avg Moderate Evaluation Score", "Avg Strict Evaluation Score"],
    )
    .unwrap();
    Evaluator::new("Vulnerability Type Inference", family)
}

fn answer(id: &str, output: &str, gold: &str) -> AnswerRecord {
    AnswerRecord {
        id: id.to_string(),
        prompt: PromptEnvelope {
            system_text: "system".to_string(),
            user_text: format!("question {id}"),
            example_text: String::new(),
        },
        model_output: output.to_string(),
        gold_answer: gold.to_string(),
    }
}

#[test]
fn test_existence_mixed_outcomes() {
    let answers = vec![
        answer("0", "YES", "YES"),
        answer("1", "NO", "NO"),
        answer("2", "YES", "NO"),
        answer("3", "NO", "YES"),
    ];
    let report = existence_evaluator().eval(&answers);

    assert_eq!(report.overall("Accuracy"), Some(0.5));
    assert_eq!(report.overall("F1-Score"), Some(0.5));
    assert_eq!(report.verbose.len(), 4);
}

#[test]
fn test_existence_all_correct_and_duplicate_names_listed_once() {
    let answers = vec![
        answer("a", "Yes, vulnerable", "YES"),
        answer("b", "No issues", "NO"),
    ];
    let report = existence_evaluator().eval(&answers);

    assert_eq!(report.overall("Accuracy"), Some(1.0));
    assert_eq!(report.overall("F1-Score"), Some(1.0));

    let extracted: Vec<&str> = report
        .verbose
        .iter()
        .map(|e| e.metrics[0].extracted_answer.as_str())
        .collect();
    assert_eq!(extracted, vec!["YES", "NO"]);
    assert!(report.verbose.iter().all(|e| e.metrics.len() == 1));
    assert_eq!(report.verbose[0].metrics[0].prompt.user_text, "question a");
    assert_eq!(report.verbose[1].metrics[0].raw_output, "No issues");
}

#[test]
fn test_type_infer_secondary_and_adversarial() {
    let answers = vec![
        answer("0", "The answer is B.", "A.CWE-787:Write|B.CWE-125:Read"),
        answer("1", "A. B.", "A.CWE-787:Write|B.CWE-125:Read"),
    ];
    let report = type_infer_evaluator().eval(&answers);

    let first = &report.verbose[0].metrics;
    assert_eq!(first[0].score, 1.0);
    assert_eq!(first[1].score, 0.5);
    assert_eq!(report.verbose[1].metrics[1].score, 0.0);

    assert_eq!(report.overall("Avg Moderate Evaluation Score"), Some(1.0));
    assert_eq!(report.overall("Avg Strict Evaluation Score"), Some(0.25));
}

#[test]
fn test_empty_answers() {
    for evaluator in [existence_evaluator(), type_infer_evaluator()] {
        let report = evaluator.eval(&[]);
        assert!(report.verbose.is_empty());
        assert_eq!(report.overall_metrics.len(), 2);
        assert!(report.overall_metrics.iter().all(|m| m.value == 0.0));
    }
}

#[test]
fn test_failed_calls_score_as_negatives() {
    let answers = vec![answer("0", "", "YES"), answer("1", "", "NO")];
    let report = existence_evaluator().eval(&answers);
    assert_eq!(report.overall("Accuracy"), Some(0.5));
    assert_eq!(report.overall("F1-Score"), Some(0.0));
}
