//! Wire-level request and response models for the gateway.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One uploaded document, as received from the route layer.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Per-batch summarization options from the upload form.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    pub target_language: Option<String>,
    pub custom_prompt: Option<String>,
    pub reading_level: Option<String>,
    pub interests: Vec<String>,
    pub age_group: Option<String>,
}

/// Outcome for a single document. Either `summaries` is populated or
/// `error` carries the per-document failure; one bad file never aborts
/// the batch.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<BTreeMap<String, String>>,
    /// Source text kept around so the client can request refinement later.
    #[serde(rename = "originalText", skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub personalized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentResult {
    pub fn failed(filename: String, error: String) -> Self {
        Self {
            filename,
            summaries: None,
            original_text: None,
            personalized: false,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchMetadata {
    pub processing_timestamp: String,
    pub total_files_processed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub results: Vec<DocumentResult>,
    pub metadata: BatchMetadata,
}

/// What the user disliked about a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Unclear,
    Inaccurate,
    NeedsImprovement,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Unclear => "unclear",
            FeedbackKind::Inaccurate => "inaccurate",
            FeedbackKind::NeedsImprovement => "needs_improvement",
        }
    }

    /// Only these kinds trigger summary regeneration; the rest are
    /// acknowledged and recorded.
    pub fn is_refinable(&self) -> bool {
        matches!(self, FeedbackKind::Unclear | FeedbackKind::Inaccurate)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub summary_id: String,
    pub feedback_type: FeedbackKind,
    #[serde(default)]
    pub feedback_text: Option<String>,
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub original_summary: Option<String>,
    #[serde(default)]
    pub target_language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summaries: Option<BTreeMap<String, String>>,
}

impl FeedbackResponse {
    pub fn acknowledged() -> Self {
        Self {
            status: "success".to_string(),
            message: "Feedback submitted successfully".to_string(),
            summaries: None,
        }
    }

    pub fn refined(summaries: BTreeMap<String, String>) -> Self {
        Self {
            status: "success".to_string(),
            message: "Summary has been refined based on your feedback".to_string(),
            summaries: Some(summaries),
        }
    }
}
