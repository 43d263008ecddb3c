//! End-to-end flow: extract, translate, review, write back, sweep, validate.
//!
//! Each stage is exposed on its own so interactive callers can stop between
//! translation and writing; [`Pipeline::run`] chains them all.

use anyhow::Result;
use tracing::debug;

use crate::translation::{Gateway, GatewayParams, GatewayRequest, GatewayStats, OutcomeSet};
use crate::xliff::{
    Advisory, Extraction, FinalizedOutput, ReconstructionReport, ReviewIssue, ValidationReport,
    extract_units, finalize, reconstruct, review_outcomes, validate_document,
};
use crate::xml::Document;

/// Gateway results matched to units, with review findings.
#[derive(Debug, Clone)]
pub struct Translation {
    pub outcomes: OutcomeSet,
    /// Counted over translatable units only.
    pub stats: GatewayStats,
    pub review: Vec<ReviewIssue>,
}

impl Translation {
    pub fn has_critical_issues(&self) -> bool {
        self.review.iter().any(ReviewIssue::is_critical)
    }
}

/// The serialized document plus what the sweep and validation found.
#[derive(Debug, Clone)]
pub struct Finished {
    pub output: FinalizedOutput,
    pub validation: ValidationReport,
}

impl Finished {
    pub fn xml(&self) -> &str {
        &self.output.xml
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub advisories: Vec<Advisory>,
    pub translation: Translation,
    pub reconstruction: ReconstructionReport,
    pub finished: Finished,
}

pub struct Pipeline<G> {
    gateway: G,
    params: GatewayParams,
}

impl<G: Gateway> Pipeline<G> {
    pub const fn new(gateway: G, params: GatewayParams) -> Self {
        Self { gateway, params }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub const fn params(&self) -> &GatewayParams {
        &self.params
    }

    pub fn prepare(doc: &Document) -> Extraction {
        extract_units(doc)
    }

    pub fn requests(extraction: &Extraction) -> Vec<GatewayRequest> {
        GatewayRequest::from_extraction(extraction)
    }

    /// Sends every translatable unit through the gateway and reviews the
    /// results. Nothing is written to the document.
    pub async fn translate(&self, extraction: &Extraction) -> Translation {
        let requests = Self::requests(extraction);
        debug!(units = requests.len(), "sending units for translation");

        let received = self.gateway.translate(&requests, &self.params).await;
        let outcomes = OutcomeSet::resolve(&extraction.units, received);

        let stats = GatewayStats::from_outcomes(
            requests.iter().filter_map(|request| outcomes.get(&request.id)),
        );
        let review = review_outcomes(&extraction.units, &outcomes);

        Translation {
            outcomes,
            stats,
            review,
        }
    }

    /// Writes targets for every unit, whatever the translation produced.
    pub fn apply(
        doc: &mut Document,
        extraction: &Extraction,
        translation: &Translation,
    ) -> ReconstructionReport {
        reconstruct(doc, &extraction.units, &translation.outcomes)
    }

    /// Serializes, sweeps and validates the written document.
    pub fn finalize(doc: &Document) -> Result<Finished> {
        let output = finalize(doc)?;
        let validation = validate_document(&output.document);
        Ok(Finished { output, validation })
    }

    pub async fn run(&self, doc: &mut Document) -> Result<RunReport> {
        let extraction = Self::prepare(doc);
        let translation = self.translate(&extraction).await;
        let reconstruction = Self::apply(doc, &extraction, &translation);
        let finished = Self::finalize(doc)?;

        Ok(RunReport {
            advisories: extraction.advisories,
            translation,
            reconstruction,
            finished,
        })
    }
}
