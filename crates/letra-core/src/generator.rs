//! Text generator collaborators.
//!
//! The orchestrator only sees the [`Generator`] trait: a prompt goes in,
//! text (or a [`GeneratorError`]) comes out. Adapters here cover closures,
//! scripted replays and per-call timeouts.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::GeneratorError;

/// External text generation service.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce a lyric for `prompt`. May fail, return nothing, or return
    /// text that breaks every rule.
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

/// Adapts an async closure `Fn(String) -> Future<Output = Result<..>>`.
pub struct FnGenerator<F> {
    f: F,
}

impl<F> FnGenerator<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Generator for FnGenerator<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, GeneratorError>> + Send + 'static,
{
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        (self.f)(prompt.to_string()).await
    }
}

/// Replays a fixed sequence of outcomes, then reports exhaustion.
///
/// Records every prompt it receives.
#[derive(Default)]
pub struct ScriptedGenerator {
    outputs: Mutex<VecDeque<Result<String, GeneratorError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(outputs: impl IntoIterator<Item = Result<String, GeneratorError>>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A script of successful outputs.
    pub fn from_texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::new(texts.into_iter().map(|t| Ok(t.into())))
    }

    /// Number of `generate` calls so far.
    pub async fn calls(&self) -> usize {
        self.prompts.lock().await.len()
    }

    /// Prompts received, in call order.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        self.prompts.lock().await.push(prompt.to_string());
        self.outputs
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(GeneratorError::Exhausted))
    }
}

/// Bounds every call of an inner generator with a timeout.
pub struct TimeoutGenerator<G> {
    inner: G,
    timeout: Duration,
}

impl<G> TimeoutGenerator<G> {
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<G: Generator> Generator for TimeoutGenerator<G> {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GeneratorError::Timeout(
                u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Slow;

    #[async_trait]
    impl Generator for Slow {
        async fn generate(&self, _prompt: &str) -> Result<String, GeneratorError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("tarde demais".to_string())
        }
    }

    #[tokio::test]
    async fn test_scripted_replays_then_exhausts() {
        let generator = ScriptedGenerator::new(vec![
            Ok("primeira".to_string()),
            Err(GeneratorError::Empty),
        ]);
        assert_eq!(generator.generate("a").await, Ok("primeira".to_string()));
        assert_eq!(generator.generate("b").await, Err(GeneratorError::Empty));
        assert_eq!(generator.generate("c").await, Err(GeneratorError::Exhausted));
        assert_eq!(generator.calls().await, 3);
        assert_eq!(generator.prompts().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_fn_generator_passes_prompt() {
        let generator = FnGenerator::new(|prompt: String| async move { Ok::<_, GeneratorError>(prompt.to_uppercase()) });
        assert_eq!(generator.generate("samba").await, Ok("SAMBA".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_generator() {
        let generator = TimeoutGenerator::new(Slow, Duration::from_millis(250));
        assert_eq!(generator.generate("x").await, Err(GeneratorError::Timeout(250)));
    }
}
