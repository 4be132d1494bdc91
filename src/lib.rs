/// docbrief - document summarization gateway core.
///
/// Accepts extracted document text (PDF uploads upstream), produces
/// LLM-generated summaries with optional personalization and machine
/// translation, and supports feedback-driven refinement.
///
/// # Architecture
///
/// The pipeline is: prompt composition ([`prompt`]) → multi-pass
/// summarization ([`summarizer`]) → token-aware chunking ([`chunker`]) →
/// gated backend calls ([`gate`], [`clients::llm`]) → recombination →
/// cache write ([`cache`]). Translation ([`clients::translator`]) is
/// best-effort on top of a finished summary.
///
/// The system uses:
/// - Tokio for async runtime; CPU-bound PDF parsing runs on the
///   blocking pool
/// - reqwest for the OpenAI and Azure Translator HTTP calls
/// - a counting semaphore (capacity 5 by default) gating backend calls
/// - an append-only in-process cache keyed on (text, prompt)
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use docbrief::core::config::AppConfig;
/// use docbrief::core::models::{SummaryOptions, UploadedDocument};
/// use docbrief::gateway::Gateway;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     docbrief::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let gateway = Gateway::from_config(&config)?;
///
///     let uploads = vec![UploadedDocument {
///         filename: "policy.pdf".to_string(),
///         bytes: std::fs::read("policy.pdf")?,
///     }];
///     let options = SummaryOptions {
///         target_language: Some("es".to_string()),
///         ..Default::default()
///     };
///
///     let response = gateway.process_batch(uploads, &options).await;
///     println!("{}", serde_json::to_string_pretty(&response)?);
///     Ok(())
/// }
/// ```
// Module declarations
pub mod cache;
pub mod chunker;
pub mod clients;
pub mod core;
pub mod errors;
pub mod extract;
pub mod gate;
pub mod gateway;
pub mod prompt;
pub mod retry;
pub mod summarizer;

pub use errors::GatewayError;
pub use prompt::PromptSpec;
pub use summarizer::Summarizer;

/// Configure structured logging with JSON format.
///
/// Sets up tracing-subscriber with a JSON formatter suitable for log
/// aggregation. Call once at process start.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    tracing_subscriber::registry().with(fmt_layer).init();
}
