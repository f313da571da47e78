//! Response generators: produce the raw text that gets scored when a
//! submission does not carry its own text.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Prompt sent to the generator for a brand.
pub fn brand_prompt(brand_name: &str) -> String {
    format!("Tell me about the brand {brand_name}.")
}

/// Text generator used as the "text source" of a submission.
pub trait ResponseGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynGenerator = Arc<dyn ResponseGenerator>;

/// Deterministic canned responses for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    fn respond(prompt: &str) -> String {
        if prompt.contains("Daraz") {
            "Daraz is a leading e-commerce platform in South Asia, popular for its wide range of products and delivery network. It's often mentioned in terms of online shopping deals.".to_string()
        } else if prompt.contains("Pathao") {
            "Pathao is a popular ride-sharing, food delivery, and logistics service, primarily operating in Bangladesh and Nepal. It's known for its super-app services.".to_string()
        } else {
            "Brand X is a new entrant in the market. The general sentiment is still forming, but visibility is growing.".to_string()
        }
    }
}

impl ResponseGenerator for MockGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        let out = Self::respond(prompt);
        Box::pin(async move { Ok(out) })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
