//! Contract between the XLIFF core and whatever performs the translation.
//!
//! The core hands out [`GatewayRequest`]s and gets [`TranslationOutcome`]s
//! back, keyed by unit id. Order, batching and retries are the gateway's
//! business; [`OutcomeSet::resolve`] turns whatever came back into exactly
//! one outcome per unit.

use std::collections::HashMap;

use crate::xliff::{Extraction, TranslationUnit};

/// One unit's text as sent for translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    pub id: String,
    pub text: String,
    pub has_boundary_tokens: bool,
}

impl GatewayRequest {
    pub fn from_unit(unit: &TranslationUnit) -> Self {
        Self {
            id: unit.id.clone(),
            text: unit.merged_text.clone(),
            has_boundary_tokens: unit.has_boundary_tokens(),
        }
    }

    /// Requests for every translatable unit, in document order.
    pub fn from_extraction(extraction: &Extraction) -> Vec<Self> {
        extraction.translatable().map(Self::from_unit).collect()
    }
}

/// Parameters shared by every request of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayParams {
    pub target_language: String,
    /// Language of the source text, when the document declares one.
    pub source_language: Option<String>,
    /// Terms that must be left untranslated (brand names and the like).
    pub preserve_terms: Vec<String>,
    /// Free-form context appended to the prompt.
    pub extra_context: Option<String>,
}

/// Result of translating one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub id: String,
    /// The translation, or the original text when `success` is false.
    pub translated_text: String,
    pub success: bool,
    pub error_reason: Option<String>,
    pub retry_count: u32,
}

impl TranslationOutcome {
    pub fn succeeded(id: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            translated_text: translated_text.into(),
            success: true,
            error_reason: None,
            retry_count: 0,
        }
    }

    /// A failed outcome that carries the original text as its fallback.
    pub fn failed(
        id: impl Into<String>,
        original_text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            translated_text: original_text.into(),
            success: false,
            error_reason: Some(reason.into()),
            retry_count: 0,
        }
    }

    /// Outcome for a unit that was never sent: its text is kept unchanged.
    pub fn skipped(unit: &TranslationUnit) -> Self {
        Self::succeeded(&unit.id, &unit.merged_text)
    }

    #[must_use]
    pub const fn with_retries(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

/// Something that translates a list of requests.
///
/// Implementations must not fail as a whole: a unit that could not be
/// translated is reported as a failed outcome, and ids may be missing from
/// the result if the work was interrupted.
#[allow(async_fn_in_trait)]
pub trait Gateway {
    async fn translate(
        &self,
        requests: &[GatewayRequest],
        params: &GatewayParams,
    ) -> Vec<TranslationOutcome>;
}

/// Exactly one outcome per extracted unit.
#[derive(Debug, Clone, Default)]
pub struct OutcomeSet {
    outcomes: HashMap<String, TranslationOutcome>,
}

/// Reason recorded for units the gateway never answered for.
pub const MISSING_OUTCOME: &str = "Missing from translation response";

impl OutcomeSet {
    /// Matches gateway outcomes to units.
    ///
    /// Units that were not translatable get a synthesized success with their
    /// text unchanged; translatable units with no outcome are marked failed.
    /// The first outcome per id wins and outcomes for unknown ids are ignored.
    pub fn resolve(units: &[TranslationUnit], outcomes: Vec<TranslationOutcome>) -> Self {
        let mut received: HashMap<String, TranslationOutcome> = HashMap::new();
        for outcome in outcomes {
            received.entry(outcome.id.clone()).or_insert(outcome);
        }

        let outcomes = units
            .iter()
            .map(|unit| {
                let outcome = if unit.is_translatable() {
                    received.remove(&unit.id).unwrap_or_else(|| {
                        TranslationOutcome::failed(&unit.id, &unit.merged_text, MISSING_OUTCOME)
                    })
                } else {
                    TranslationOutcome::skipped(unit)
                };
                (unit.id.clone(), outcome)
            })
            .collect();

        Self { outcomes }
    }

    pub fn get(&self, id: &str) -> Option<&TranslationOutcome> {
        self.outcomes.get(id)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslationOutcome> {
        self.outcomes.values()
    }

    /// Failed outcomes sorted by unit id.
    pub fn failures(&self) -> Vec<&TranslationOutcome> {
        let mut failed: Vec<_> = self.outcomes.values().filter(|o| !o.success).collect();
        failed.sort_by(|a, b| a.id.cmp(&b.id));
        failed
    }
}

/// Counters over a run's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GatewayStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub retries: u32,
}

impl GatewayStats {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a TranslationOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut stats, outcome| {
                stats.total += 1;
                if outcome.success {
                    stats.successful += 1;
                } else {
                    stats.failed += 1;
                }
                stats.retries += outcome.retry_count;
                stats
            })
    }

    /// Percentage of successful outcomes, rounded to two decimals.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.successful as f64 / self.total as f64 * 10_000.0).round() / 100.0
    }
}
