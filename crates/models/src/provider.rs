use async_trait::async_trait;
use vulnrag_core::PromptEnvelope;

/// A chat model answering one benchmark prompt at a time
///
/// Implementations never fail: any error is logged and reported as an empty
/// answer, which the evaluator scores like any other wrong answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Answer a prompt; empty on failure
    async fn invoke(&self, prompt: &PromptEnvelope) -> String;

    /// Model name for logs and reports
    fn name(&self) -> &str;
}
