//! Azure Translator client with a shared, lazily created session and a
//! bounded retry policy for transient network failures.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::config::AppConfig;
use crate::errors::GatewayError;
use crate::retry::RetryPolicy;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Supported target languages: ISO code to English name.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    // Indian languages
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("te", "Telugu"),
    ("ta", "Tamil"),
    ("mr", "Marathi"),
    ("gu", "Gujarati"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
    ("pa", "Punjabi"),
    ("ur", "Urdu"),
    ("or", "Odia"),
    // Other languages
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ar", "Arabic"),
    ("ru", "Russian"),
];

pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Machine translation of an already-produced summary.
#[async_trait]
pub trait Translate: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str)
    -> Result<String, GatewayError>;
}

pub struct AzureTranslator {
    key: String,
    endpoint: String,
    region: String,
    /// Shared outbound session, created on first use and dropped after a
    /// transport failure so the next attempt starts fresh.
    session: Mutex<Option<Client>>,
    policy: RetryPolicy,
    cache: RwLock<HashMap<String, String>>,
}

impl AzureTranslator {
    pub fn new(key: String, endpoint: &str, region: String, policy: RetryPolicy) -> Self {
        Self {
            key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            region,
            session: Mutex::new(None),
            policy,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        match (
            &config.translator_key,
            &config.translator_endpoint,
            &config.translator_region,
        ) {
            (Some(key), Some(endpoint), Some(region)) => Ok(Self::new(
                key.clone(),
                endpoint,
                region.clone(),
                RetryPolicy::default(),
            )),
            _ => Err(GatewayError::Configuration(
                "Azure Translator credentials not configured".to_string(),
            )),
        }
    }

    async fn session(&self) -> Result<Client, GatewayError> {
        let mut slot = self.session.lock().await;
        if slot.is_none() {
            let client = Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| GatewayError::Configuration(format!("HTTP client: {e}")))?;
            *slot = Some(client);
        }
        // Client handles are reference-counted; cloning shares the pool.
        Ok(slot.as_ref().cloned().expect("session just created"))
    }

    async fn reset_session(&self) {
        let mut slot = self.session.lock().await;
        *slot = None;
    }

    async fn attempt(&self, text: &str, target_language: &str) -> Result<String, GatewayError> {
        let session = self.session().await?;

        let result = session
            .post(format!("{}/translate", self.endpoint))
            .query(&[
                ("api-version", "3.0"),
                ("from", "en"),
                ("to", target_language),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .header("X-ClientTraceId", Uuid::new_v4().to_string())
            .json(&json!([{ "text": text }]))
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                // Drop the shared session so the retry rebuilds it.
                self.reset_session().await;
                return Err(GatewayError::Http(format!(
                    "translation request failed: {e}"
                )));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            self.reset_session().await;
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::Http(format!(
                "translator returned {status}: {error_text}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Translation(format!("failed to parse response: {e}")))?;

        body.get(0)
            .and_then(|item| item.get("translations"))
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("text"))
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Translation("no translation in response".to_string()))
    }
}

#[async_trait]
impl Translate for AzureTranslator {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, GatewayError> {
        if !is_supported_language(target_language) {
            return Err(GatewayError::Translation(format!(
                "language {target_language} is not supported"
            )));
        }

        let cache_key = crate::cache::cache_key(text, target_language);
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&cache_key)
        {
            info!("translation found in cache");
            return Ok(hit.clone());
        }

        let translated = self
            .policy
            .run(
                |attempt| {
                    info!(
                        target_language,
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        "sending translation request"
                    );
                    self.attempt(text, target_language)
                },
                // Only transport-level failures are worth retrying; a
                // malformed or empty body will not improve on its own.
                |error| matches!(error, GatewayError::Http(_)),
            )
            .await
            .map_err(|e| match e {
                GatewayError::Http(msg) => {
                    warn!("translation retries exhausted: {msg}");
                    GatewayError::Translation(msg)
                }
                other => other,
            })?;

        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(cache_key, translated.clone());

        Ok(translated)
    }
}
