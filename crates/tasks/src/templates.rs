//! Fixed prompt templates of the two benchmark tasks

use vulnrag_core::{BenchmarkSample, PromptEnvelope, PromptMethod, TaskKind};
use vulnrag_core::error::Result;
use vulnrag_evaluator::MetricFamily;

/// Prompt text and metric names of one task
#[derive(Debug)]
pub struct TaskTemplate {
    pub kind: TaskKind,
    pub name: &'static str,
    pub system: &'static str,
    pub question: &'static str,
    pub restriction: &'static str,
    pub single_metrics: &'static [&'static str],
    pub overall_metrics: &'static [&'static str],
}

static EXISTENCE: TaskTemplate = TaskTemplate {
    kind: TaskKind::Existence,
    name: "Vulnerability Existence Detection",
    system: "Assuming you are an experienced code vulnerability analyst and the following code may have vulnerabilities.",
    question: "Is the code vulnerable?(YES/NO)",
    restriction: "Your answer should either be 'YES' or 'NO' only.",
    single_metrics: &["hit", "hit"],
    overall_metrics: &["Accuracy", "F1-Score"],
};

static TYPE_INFER: TaskTemplate = TaskTemplate {
    kind: TaskKind::TypeInfer,
    name: "Vulnerability Type Inference",
    system: "You are an outstanding code vulnerability analyst and expert in single-choice questions.You are only able to pick up 1 answer from given choices.",
    question: "What is the vulnerability type of the code?(A/B/C/D/E)",
    restriction: "output 'A.' or 'B.' or 'C.' or 'D.' or 'E.' only.",
    single_metrics: &["Moderate Evaluation Score", "Strict Evaluation Score"],
    overall_metrics: &["Avg Moderate Evaluation Score", "Avg Strict Evaluation Score"],
};

impl TaskTemplate {
    pub fn for_kind(kind: TaskKind) -> &'static TaskTemplate {
        match kind {
            TaskKind::Existence => &EXISTENCE,
            TaskKind::TypeInfer => &TYPE_INFER,
        }
    }

    /// Resolve this task's metric names
    pub fn metric_family(&self) -> Result<MetricFamily> {
        MetricFamily::from_names(self.single_metrics, self.overall_metrics)
    }

    /// Substitute a sample (and, for few-shot, its exemplar) into the template
    pub fn render(
        &self,
        sample: &BenchmarkSample,
        method: PromptMethod,
        example: &str,
    ) -> PromptEnvelope {
        let code = match self.kind {
            TaskKind::Existence => sample.code.clone(),
            TaskKind::TypeInfer => format!(
                "{}{}",
                sample.selection_text.as_deref().unwrap_or_default(),
                sample.code
            ),
        };

        let user_text = match method {
            PromptMethod::ZeroShot => format!(
                "{}\nNow detect the vulnerability in the following code:\n{code}\n{}\n",
                self.question, self.restriction
            ),
            PromptMethod::FewShot => format!(
                "{}\n{example}\nNow detect the vulnerability in the following code:\n{code}\n{}\n",
                self.question, self.restriction
            ),
        };

        PromptEnvelope {
            system_text: self.system.to_string(),
            user_text,
            example_text: match method {
                PromptMethod::ZeroShot => String::new(),
                PromptMethod::FewShot => example.to_string(),
            },
        }
    }
}
