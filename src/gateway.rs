//! Batch orchestration: extraction, summarization, optional translation
//! and feedback handling for uploaded documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::clients::llm::OpenAiClient;
use crate::clients::translator::{
    AzureTranslator, SUPPORTED_LANGUAGES, Translate, is_supported_language,
};
use crate::core::config::AppConfig;
use crate::core::models::{
    BatchMetadata, BatchResponse, DocumentResult, FeedbackRequest, FeedbackResponse,
    SummaryOptions, UploadedDocument,
};
use crate::errors::GatewayError;
use crate::extract::{PdfExtractor, TextExtractor};
use crate::gate::ConcurrencyGate;
use crate::prompt::{Interest, PromptSpec};
use crate::summarizer::Summarizer;

/// Process-scoped services wired together once at startup and injected
/// into request handling; nothing here is ambient global state.
pub struct Gateway {
    extractor: Arc<dyn TextExtractor>,
    summarizer: Summarizer,
    /// Absent when translator credentials are not configured; translation
    /// requests are then skipped, since translation is best-effort anyway.
    translator: Option<Arc<dyn Translate>>,
}

impl Gateway {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        summarizer: Summarizer,
        translator: Option<Arc<dyn Translate>>,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            translator,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let backend = Arc::new(OpenAiClient::from_config(config)?);
        let summarizer = Summarizer::with_settings(
            backend,
            config.context_window_tokens,
            ConcurrencyGate::new(config.max_concurrent_calls),
        );
        let translator = match AzureTranslator::from_config(config) {
            Ok(translator) => Some(Arc::new(translator) as Arc<dyn Translate>),
            Err(e) => {
                warn!(error = %e, "translator not configured, translations disabled");
                None
            }
        };
        Ok(Self {
            extractor: Arc::new(PdfExtractor),
            summarizer,
            translator,
        })
    }

    /// Summarize a batch of uploads. Failures are captured per document;
    /// one bad file never aborts the batch.
    pub async fn process_batch(
        &self,
        uploads: Vec<UploadedDocument>,
        options: &SummaryOptions,
    ) -> BatchResponse {
        let total = uploads.len();
        let mut results = Vec::with_capacity(total);

        for upload in uploads {
            let filename = upload.filename.clone();
            let result = match self.summarize_upload(upload, options).await {
                Ok(result) => result,
                Err(e) => {
                    error!(%filename, error = %e, "failed to process document");
                    DocumentResult::failed(filename, e.to_string())
                }
            };
            results.push(result);
        }

        BatchResponse {
            results,
            metadata: BatchMetadata {
                processing_timestamp: Utc::now().to_rfc3339(),
                total_files_processed: total,
            },
        }
    }

    async fn summarize_upload(
        &self,
        upload: UploadedDocument,
        options: &SummaryOptions,
    ) -> Result<DocumentResult, GatewayError> {
        if !upload.filename.to_lowercase().ends_with(".pdf") {
            return Err(GatewayError::Extraction(
                "Only PDF files are supported".to_string(),
            ));
        }

        let text = self
            .extractor
            .extract(&upload.filename, upload.bytes)
            .await?;

        let spec = PromptSpec::from_request(
            options.custom_prompt.as_deref(),
            options.reading_level.as_deref(),
            &options.interests,
            options.age_group.as_deref(),
        )?;

        let summary = self.summarizer.summarize(&text, &spec).await?;
        info!(
            filename = %upload.filename,
            chars = summary.len(),
            personalized = spec.is_personalized(),
            "generated summary"
        );

        let mut summaries = BTreeMap::new();
        summaries.insert("original".to_string(), summary.clone());

        if let Some(lang) = options.target_language.as_deref() {
            self.translate_into(&mut summaries, &summary, lang).await;
        }

        Ok(DocumentResult {
            filename: upload.filename,
            summaries: Some(summaries),
            original_text: Some(text),
            personalized: spec.is_personalized(),
            error: None,
        })
    }

    /// Best-effort translation: a failure is logged and the untranslated
    /// summary still goes back to the caller.
    async fn translate_into(
        &self,
        summaries: &mut BTreeMap<String, String>,
        summary: &str,
        lang: &str,
    ) {
        if !is_supported_language(lang) {
            warn!(lang, "unsupported target language, skipping translation");
            return;
        }
        let Some(translator) = &self.translator else {
            warn!(lang, "translator not configured, skipping translation");
            return;
        };
        match translator.translate(summary, lang).await {
            Ok(translated) => {
                summaries.insert(lang.to_string(), translated);
            }
            Err(e) => {
                warn!(lang, error = %e, "translation failed, returning untranslated summary");
            }
        }
    }

    /// Handle a feedback submission. Regenerates the summary only when
    /// the original text is available and the feedback kind warrants it;
    /// otherwise the feedback is acknowledged and recorded.
    ///
    /// Refinement failure propagates; there is no partial refined output.
    pub async fn handle_feedback(
        &self,
        request: FeedbackRequest,
    ) -> Result<FeedbackResponse, GatewayError> {
        info!(
            summary_id = %request.summary_id,
            kind = request.feedback_type.as_str(),
            has_text = request.feedback_text.is_some(),
            "received feedback"
        );

        let original_text = match &request.original_text {
            Some(text) if request.feedback_type.is_refinable() => text,
            _ => return Ok(FeedbackResponse::acknowledged()),
        };
        let original_summary = request.original_summary.as_deref().unwrap_or_default();

        let refined = self
            .summarizer
            .refine(
                original_text,
                original_summary,
                request.feedback_type,
                request.feedback_text.as_deref(),
            )
            .await?;

        let mut summaries = BTreeMap::new();
        summaries.insert("original".to_string(), refined.clone());

        if let Some(lang) = request.target_language.as_deref() {
            self.translate_into(&mut summaries, &refined, lang).await;
        }

        Ok(FeedbackResponse::refined(summaries))
    }

    /// Direct translation endpoint body: validates the language against
    /// the registry before calling out.
    pub async fn translate_text(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, GatewayError> {
        if !is_supported_language(target_language) {
            return Err(GatewayError::Translation(format!(
                "language {target_language} is not supported"
            )));
        }
        let Some(translator) = &self.translator else {
            return Err(GatewayError::Translation(
                "translation service is not configured".to_string(),
            ));
        };
        translator.translate(text, target_language).await
    }
}

/// Registry listing for the supported-languages endpoint.
pub fn supported_languages() -> Vec<(String, String)> {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|(code, name)| ((*code).to_string(), (*name).to_string()))
        .collect()
}

/// Registry listing for the customer-interests endpoint.
pub fn customer_interests() -> Vec<(String, String)> {
    Interest::ALL
        .into_iter()
        .map(|i| (i.code().to_string(), i.display_name().to_string()))
        .collect()
}
