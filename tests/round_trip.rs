#![allow(clippy::unwrap_used)]
//! End-to-end runs of the pipeline over the sample course with a scripted
//! gateway standing in for the translation service.

use std::collections::HashMap;

use xlf_translate::pipeline::Pipeline;
use xlf_translate::translation::{Gateway, GatewayParams, GatewayRequest, TranslationOutcome};
use xlf_translate::xliff::{BOUNDARY_TOKEN, extract_units, validate_document};
use xlf_translate::xml::Document;

const SAMPLE: &str = include_str!("fixtures/sample.xlf");

/// Answers from a fixed phrase book; units it does not know fail.
struct PhraseBook(HashMap<&'static str, &'static str>);

impl PhraseBook {
    fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self(entries.iter().copied().collect())
    }
}

impl Gateway for PhraseBook {
    async fn translate(
        &self,
        requests: &[GatewayRequest],
        _params: &GatewayParams,
    ) -> Vec<TranslationOutcome> {
        requests
            .iter()
            .map(|request| match self.0.get(request.id.as_str()) {
                Some(text) => TranslationOutcome::succeeded(&request.id, *text),
                None => TranslationOutcome::failed(&request.id, &request.text, "no entry"),
            })
            .collect()
    }
}

fn params() -> GatewayParams {
    GatewayParams {
        target_language: "es".to_string(),
        source_language: Some("en-GB".to_string()),
        preserve_terms: vec!["Pixel".to_string()],
        extra_context: None,
    }
}

fn spanish() -> PhraseBook {
    PhraseBook::new(&[
        ("course.title", "Conceptos básicos de seguridad"),
        (
            "slide1.intro",
            "Bienvenido a __SEG__ Pixel __SEG__ formación.",
        ),
        ("slide1.body", "Use siempre guantes en el laboratorio."),
        ("slide2.button", "Siguiente"),
    ])
}

#[tokio::test]
async fn test_translates_sample_course() {
    let mut doc = Document::parse(SAMPLE).unwrap();
    let report = Pipeline::new(spanish(), params())
        .run(&mut doc)
        .await
        .unwrap();
    let xml = report.finished.xml();

    assert_eq!(report.translation.stats.total, 4);
    assert_eq!(report.translation.stats.failed, 0);
    assert_eq!(report.reconstruction.written, 5);
    assert!(report.reconstruction.fallbacks.is_empty());
    assert!(report.finished.output.sweep.is_empty());
    assert!(report.finished.validation.is_valid());
    assert_eq!(report.finished.validation.total_issues(), 0);

    assert!(xml.contains("<target>Conceptos básicos de seguridad</target>"));
    assert!(xml.contains(
        r#"<g id="2" ctype="x-text">Bienvenido a </g><g id="3" ctype="x-text" style="bold">Pixel</g><g id="4" ctype="x-text"> formación.</g>"#
    ));
    assert!(!xml.contains(BOUNDARY_TOKEN));
}

#[tokio::test]
async fn test_output_reopens_with_targets_after_sources() {
    let mut doc = Document::parse(SAMPLE).unwrap();
    let report = Pipeline::new(spanish(), params())
        .run(&mut doc)
        .await
        .unwrap();

    let reopened = Document::parse(report.finished.xml()).unwrap();
    let validation = validate_document(&reopened);
    assert!(validation.missing_targets.is_empty());
    assert!(validation.surviving_tokens.is_empty());

    // The extracted source side is unchanged by the write.
    let before = extract_units(&Document::parse(SAMPLE).unwrap());
    let after = extract_units(&reopened);
    let texts = |e: &xlf_translate::xliff::Extraction| -> Vec<String> {
        e.units.iter().map(|u| u.merged_text.clone()).collect()
    };
    assert_eq!(texts(&before), texts(&after));

    let xml = report.finished.xml();
    let source = xml.find("<source>Next</source>").unwrap();
    let target = xml.find("<target>Siguiente</target>").unwrap();
    assert!(source < target);
}

#[tokio::test]
async fn test_stray_tokens_never_reach_the_output() {
    let mut doc = Document::parse(SAMPLE).unwrap();
    let gateway = PhraseBook::new(&[
        ("course.title", "Conceptos básicos"),
        (
            "slide1.intro",
            "Bienvenido a __SEG__ Pixel __SEG__ __SEG__ formación.",
        ),
        ("slide1.body", "Use guantes __SEG__ siempre."),
        ("slide2.button", "Siguiente"),
    ]);

    let report = Pipeline::new(gateway, params()).run(&mut doc).await.unwrap();

    assert!(!report.finished.xml().contains(BOUNDARY_TOKEN));
    assert!(!report.finished.validation.has_correctness_violation());
    assert!(report.translation.has_critical_issues());
}

#[tokio::test]
async fn test_lost_tokens_keep_the_span_structure() {
    let mut doc = Document::parse(SAMPLE).unwrap();
    let gateway = PhraseBook::new(&[("slide1.intro", "Bienvenido a la formación de Pixel.")]);

    let report = Pipeline::new(gateway, params()).run(&mut doc).await.unwrap();
    let xml = report.finished.xml();

    assert_eq!(report.reconstruction.advisories.len(), 1);
    assert!(xml.contains(r#"<g id="2" ctype="x-text">Bienvenido a la formación de Pixel. </g>"#));
    assert!(xml.contains(r#"style="bold""#));
    assert!(report.finished.validation.fragment_mismatches.is_empty());
}

#[tokio::test]
async fn test_failed_units_fall_back_to_source() {
    let mut doc = Document::parse(SAMPLE).unwrap();
    let report = Pipeline::new(PhraseBook::new(&[]), params())
        .run(&mut doc)
        .await
        .unwrap();
    let xml = report.finished.xml();

    assert_eq!(report.translation.stats.failed, 4);
    assert_eq!(report.reconstruction.fallbacks.len(), 4);
    assert_eq!(report.reconstruction.written, 5);
    assert!(xml.contains("<target>Safety Basics</target>"));
    assert!(xml.contains(r#"<g id="4" ctype="x-text"> training.</g>"#));
    assert!(!xml.contains(BOUNDARY_TOKEN));
}
