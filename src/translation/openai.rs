//! Gateway backed by an OpenAI-compatible chat-completion endpoint.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use super::client::{ChatBackend, ChatClient, ChatRequest};
use super::gateway::{Gateway, GatewayParams, GatewayRequest, TranslationOutcome};
use super::prompt::{
    BATCH_SYSTEM_PROMPT, UNIT_SYSTEM_PROMPT, build_batch_prompt, build_unit_prompt,
};
use crate::xliff::{TokenCheck, check_boundary_tokens, count_boundary_tokens};

/// Retries after the first attempt of a single unit.
pub const MAX_RETRIES: u32 = 2;

pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Sources this short may legitimately come back unchanged.
const MIN_LENGTH_FOR_UNCHANGED_CHECK: usize = 10;

const REFUSAL_PHRASES: &[&str] = &["I cannot", "I apologize"];

const MISSING_FROM_BATCH: &str = "Missing from batch response";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GatewayMode {
    /// Several units per request, JSON in and out.
    #[default]
    Batch,
    /// One request per unit.
    Sequential,
}

/// Pauses between requests, to stay under provider rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub after_rejection: Duration,
    pub after_error: Duration,
    pub between_units: Duration,
    pub between_batches: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            after_rejection: Duration::from_secs(1),
            after_error: Duration::from_secs(2),
            between_units: Duration::from_millis(500),
            between_batches: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    pub const fn none() -> Self {
        Self {
            after_rejection: Duration::ZERO,
            after_error: Duration::ZERO,
            between_units: Duration::ZERO,
            between_batches: Duration::ZERO,
        }
    }
}

/// Why a single-unit translation was thrown away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Unchanged,
    TokensLost { expected: usize, actual: usize },
    Refusal,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("translation appears identical to source"),
            Self::TokensLost { expected, actual } => {
                write!(f, "boundary tokens lost: expected {expected}, got {actual}")
            }
            Self::Refusal => f.write_str("translation contains refusal language"),
        }
    }
}

/// Checks a single-unit translation.
///
/// Extra boundary tokens are accepted: the reconstructor folds them away.
pub fn validate_translation(
    original: &str,
    translated: &str,
    has_boundary_tokens: bool,
) -> Result<(), Rejection> {
    if original == translated && original.chars().count() > MIN_LENGTH_FOR_UNCHANGED_CHECK {
        return Err(Rejection::Unchanged);
    }

    if has_boundary_tokens {
        match check_boundary_tokens(original, translated) {
            TokenCheck::Preserved => {}
            TokenCheck::Extra(extra) => {
                warn!(extra, "translation added boundary tokens; they will be merged on write");
            }
            TokenCheck::Lost(_) => {
                return Err(Rejection::TokensLost {
                    expected: count_boundary_tokens(original),
                    actual: count_boundary_tokens(translated),
                });
            }
        }
    }

    if REFUSAL_PHRASES.iter().any(|phrase| translated.contains(phrase)) {
        return Err(Rejection::Refusal);
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    translations: Vec<BatchEntry>,
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    id: Option<serde_json::Value>,
    text: Option<String>,
}

impl BatchEntry {
    /// Models sometimes answer numeric ids as JSON numbers.
    fn id(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(id) => Some(id.clone()),
            serde_json::Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

/// Matches a batch response back to the requests of the batch.
///
/// Units absent from the response or whose boundary token count changed
/// become failed outcomes. Errors only when the response is not the
/// expected JSON at all.
pub fn parse_batch_response(
    response: &str,
    batch: &[GatewayRequest],
) -> Result<Vec<TranslationOutcome>> {
    let parsed: BatchResponse = serde_json::from_str(strip_code_fence(response))
        .context("Invalid JSON in batch response")?;

    let mut translations: HashMap<String, String> = HashMap::new();
    for entry in parsed.translations {
        if let (Some(id), Some(text)) = (entry.id(), entry.text) {
            translations.entry(id).or_insert(text);
        }
    }

    let outcomes = batch
        .iter()
        .map(|request| {
            let Some(translated) = translations.remove(&request.id) else {
                return TranslationOutcome::failed(&request.id, &request.text, MISSING_FROM_BATCH);
            };

            let expected = count_boundary_tokens(&request.text);
            let actual = count_boundary_tokens(&translated);
            if expected > 0 && expected != actual {
                return TranslationOutcome::failed(
                    &request.id,
                    &request.text,
                    format!("boundary token mismatch: {expected} -> {actual}"),
                );
            }

            TranslationOutcome::succeeded(&request.id, translated)
        })
        .collect();

    Ok(outcomes)
}

pub struct OpenAiGateway<B = ChatClient> {
    backend: B,
    mode: GatewayMode,
    batch_size: usize,
    pacing: Pacing,
}

impl<B: ChatBackend> OpenAiGateway<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mode: GatewayMode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            pacing: Pacing::default(),
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: GatewayMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub const fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Translates one unit with up to [`MAX_RETRIES`] retries.
    pub async fn translate_unit(
        &self,
        request: &GatewayRequest,
        params: &GatewayParams,
    ) -> TranslationOutcome {
        if request.text.trim().is_empty() {
            return TranslationOutcome::succeeded(&request.id, &request.text);
        }

        let chat = ChatRequest {
            system: UNIT_SYSTEM_PROMPT.to_string(),
            user: build_unit_prompt(request, params),
            json: false,
        };

        let mut last_error = String::new();
        for attempt in 0..=MAX_RETRIES {
            let pause = match self.backend.complete(&chat).await {
                Ok(translated) => {
                    match validate_translation(&request.text, &translated, request.has_boundary_tokens) {
                        Ok(()) => {
                            return TranslationOutcome::succeeded(&request.id, translated)
                                .with_retries(attempt);
                        }
                        Err(rejection) => {
                            last_error = format!("Validation failed: {rejection}");
                            self.pacing.after_rejection
                        }
                    }
                }
                Err(e) => {
                    last_error = format!("{e:#}");
                    self.pacing.after_error
                }
            };

            if attempt < MAX_RETRIES {
                warn!(
                    unit_id = %request.id,
                    retry = attempt + 1,
                    max = MAX_RETRIES,
                    error = %last_error,
                    "retrying unit"
                );
                tokio::time::sleep(pause).await;
            }
        }

        TranslationOutcome::failed(
            &request.id,
            &request.text,
            format!("Translation failed after {MAX_RETRIES} retries: {last_error}"),
        )
        .with_retries(MAX_RETRIES)
    }

    async fn translate_sequential(
        &self,
        requests: &[GatewayRequest],
        params: &GatewayParams,
    ) -> Vec<TranslationOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());

        for (i, request) in requests.iter().enumerate() {
            debug!(unit_id = %request.id, "translating unit {}/{}", i + 1, requests.len());
            outcomes.push(self.translate_unit(request, params).await);

            if i + 1 < requests.len() {
                tokio::time::sleep(self.pacing.between_units).await;
            }
        }

        outcomes
    }

    async fn translate_batch(
        &self,
        batch: &[GatewayRequest],
        params: &GatewayParams,
    ) -> Result<Vec<TranslationOutcome>> {
        let chat = ChatRequest {
            system: BATCH_SYSTEM_PROMPT.to_string(),
            user: build_batch_prompt(batch, params),
            json: true,
        };

        let response = self.backend.complete(&chat).await?;
        parse_batch_response(&response, batch)
    }

    async fn translate_batched(
        &self,
        requests: &[GatewayRequest],
        params: &GatewayParams,
    ) -> Vec<TranslationOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        let total = requests.len().div_ceil(self.batch_size);

        for (index, batch) in requests.chunks(self.batch_size).enumerate() {
            debug!("batch {}/{total} ({} units)", index + 1, batch.len());

            match self.translate_batch(batch, params).await {
                Ok(batch_outcomes) => outcomes.extend(batch_outcomes),
                Err(e) => {
                    warn!(
                        batch = index + 1,
                        error = %format!("{e:#}"),
                        "batch failed; falling back to sequential translation"
                    );
                    outcomes.extend(self.translate_sequential(batch, params).await);
                }
            }

            if index + 1 < total {
                tokio::time::sleep(self.pacing.between_batches).await;
            }
        }

        outcomes
    }
}

impl<B: ChatBackend> Gateway for OpenAiGateway<B> {
    async fn translate(
        &self,
        requests: &[GatewayRequest],
        params: &GatewayParams,
    ) -> Vec<TranslationOutcome> {
        if requests.is_empty() {
            return Vec::new();
        }

        match self.mode {
            GatewayMode::Batch if self.batch_size > 1 => {
                self.translate_batched(requests, params).await
            }
            _ => self.translate_sequential(requests, params).await,
        }
    }
}
