//! Multi-pass summarization.
//!
//! Small documents go to the backend in a single call. Documents larger
//! than the context budget are chunked, each chunk summarized under the
//! concurrency gate, and the partial summaries merged by one final
//! integration call. Results are memoized per (text, prompt) pair.

use std::sync::Arc;

use futures::future;
use tracing::{debug, info};

use crate::cache::{SummaryCache, cache_key};
use crate::chunker::{CharEstimator, Chunk, TokenCounter, chunk};
use crate::clients::llm::LlmBackend;
use crate::core::models::FeedbackKind;
use crate::errors::GatewayError;
use crate::gate::ConcurrencyGate;
use crate::prompt::{PromptSpec, chunk_prompt, integration_prompt, refinement_prompt};

/// Context budget per backend call, in tokens.
pub const DEFAULT_CONTEXT_WINDOW_TOKENS: usize = 6000;

/// Conservative allowance for the system prompt when sizing chunks.
pub const PROMPT_TOKEN_RESERVE: usize = 500;

const REFINEMENT_LARGE_MAX_TOKENS: usize = 1500;
const REFINEMENT_SMALL_MAX_TOKENS: usize = 1000;
const REFINEMENT_TEMPERATURE: f32 = 0.7;

pub struct Summarizer {
    backend: Arc<dyn LlmBackend>,
    gate: ConcurrencyGate,
    cache: SummaryCache,
    counter: Arc<dyn TokenCounter>,
    context_window: usize,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self::with_settings(
            backend,
            DEFAULT_CONTEXT_WINDOW_TOKENS,
            ConcurrencyGate::default(),
        )
    }

    pub fn with_settings(
        backend: Arc<dyn LlmBackend>,
        context_window: usize,
        gate: ConcurrencyGate,
    ) -> Self {
        Self {
            backend,
            gate,
            cache: SummaryCache::new(),
            counter: Arc::new(CharEstimator),
            context_window,
        }
    }

    /// Summarize `text` under the given prompt spec.
    ///
    /// An N-chunk document costs exactly N+1 backend calls (N chunk calls
    /// plus one integration call); a cache hit costs zero. Any backend
    /// failure propagates immediately with no partial result and nothing
    /// cached.
    pub async fn summarize(
        &self,
        text: &str,
        spec: &PromptSpec,
    ) -> Result<String, GatewayError> {
        let key = cache_key(text, &spec.signature());
        if let Some(hit) = self.cache.get(&key) {
            debug!("summary cache hit");
            return Ok(hit);
        }

        let budget = self.context_window.saturating_sub(PROMPT_TOKEN_RESERVE);
        let chunks: Vec<Chunk> = chunk(text, budget, self.counter.as_ref()).collect();
        let system = spec.system_prompt();

        let summary = if chunks.len() <= 1 {
            let body = chunks.first().map(|c| c.text.as_str()).unwrap_or(text);
            let _permit = self.gate.acquire().await;
            self.backend
                .complete(
                    &system,
                    &format!("Here's the document to analyze:\n\n{body}"),
                    spec.max_output_tokens(),
                    spec.temperature(),
                )
                .await?
        } else {
            self.summarize_chunks(&chunks, &system, spec).await?
        };

        self.cache.insert(key, summary.clone());
        Ok(summary)
    }

    async fn summarize_chunks(
        &self,
        chunks: &[Chunk],
        system: &str,
        spec: &PromptSpec,
    ) -> Result<String, GatewayError> {
        let total = chunks.len();
        info!(chunks = total, "document is large, splitting for multi-pass summarization");

        // try_join_all keeps results in submission order, so section
        // numbering matches chunk indices regardless of completion order.
        let partials = future::try_join_all(chunks.iter().map(|chunk| async move {
            let prompt = chunk_prompt(system, chunk.index, total);
            let _permit = self.gate.acquire().await;
            debug!("processing chunk {}/{}", chunk.index + 1, total);
            self.backend
                .complete(
                    &prompt,
                    &format!("Here's the document section to analyze:\n\n{}", chunk.text),
                    spec.max_output_tokens(),
                    spec.temperature(),
                )
                .await
        }))
        .await?;

        let combined = partials
            .iter()
            .enumerate()
            .map(|(i, summary)| format!("Section {} Summary:\n{}", i + 1, summary))
            .collect::<Vec<_>>()
            .join("\n\n");

        let _permit = self.gate.acquire().await;
        self.backend
            .complete(
                &integration_prompt(system),
                &format!("Here are the section summaries to integrate:\n\n{combined}"),
                spec.max_output_tokens(),
                spec.temperature(),
            )
            .await
    }

    /// Revise a summary based on user feedback. Results are one-off and
    /// never cached.
    ///
    /// The token reserve accounts for the original summary riding along
    /// in the prompt. When the source document would need chunking under
    /// that reserve, the whole document is not re-processed; the backend
    /// is asked to improve the existing summary instead (a deliberate
    /// cost/latency tradeoff).
    pub async fn refine(
        &self,
        original_text: &str,
        original_summary: &str,
        kind: FeedbackKind,
        feedback_text: Option<&str>,
    ) -> Result<String, GatewayError> {
        let system = refinement_prompt(kind, feedback_text);
        let reserve = PROMPT_TOKEN_RESERVE + self.counter.count(original_summary);
        let budget = self.context_window.saturating_sub(reserve);

        let needs_chunking = budget == 0
            || chunk(original_text, budget, self.counter.as_ref())
                .nth(1)
                .is_some();

        if needs_chunking {
            info!(kind = kind.as_str(), "document too large for refinement, revising summary only");
            let system = format!(
                "{system}\n\nThe original document is very large, so focus on improving the existing summary based on the feedback without requiring the full document text."
            );
            let _permit = self.gate.acquire().await;
            self.backend
                .complete(
                    &system,
                    &format!(
                        "Original summary to improve:\n\n{original_summary}\n\nPlease provide an improved summary that addresses the feedback."
                    ),
                    REFINEMENT_LARGE_MAX_TOKENS,
                    REFINEMENT_TEMPERATURE,
                )
                .await
        } else {
            info!(kind = kind.as_str(), "refining summary against full document text");
            let _permit = self.gate.acquire().await;
            self.backend
                .complete(
                    &system,
                    &format!(
                        "Original document:\n\n{original_text}\n\nOriginal summary:\n\n{original_summary}\n\nPlease provide an improved summary that addresses the feedback."
                    ),
                    REFINEMENT_SMALL_MAX_TOKENS,
                    REFINEMENT_TEMPERATURE,
                )
                .await
        }
    }

    pub fn cached_summaries(&self) -> usize {
        self.cache.len()
    }
}
