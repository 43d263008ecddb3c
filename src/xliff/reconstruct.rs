//! Writes translations back into the document as `<target>` elements.

use tracing::debug;

use super::extract::text_spans;
use super::segment::{reconcile, restore_whitespace, split_fragments};
use super::unit::{Advisory, AdvisoryReason, TranslationUnit, UnitKind, XML_SPACE};
use crate::translation::{MISSING_OUTCOME, OutcomeSet};
use crate::xml::{Document, Element, NodeId, NodeKind};

/// A unit written with its source text because translation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub unit_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructionReport {
    /// Number of `<target>` elements written.
    pub written: usize,
    pub fallbacks: Vec<Fallback>,
    pub advisories: Vec<Advisory>,
}

/// Materializes a `<target>` for every unit.
///
/// Successful outcomes contribute their translation; failed or missing ones
/// fall back to the unit's source text so the output is always complete.
pub fn reconstruct(
    doc: &mut Document,
    units: &[TranslationUnit],
    outcomes: &OutcomeSet,
) -> ReconstructionReport {
    let mut report = ReconstructionReport::default();

    for unit in units {
        let text = match outcomes.get(&unit.id) {
            Some(outcome) if outcome.success => outcome.translated_text.as_str(),
            failed => {
                let reason = failed
                    .and_then(|outcome| outcome.error_reason.clone())
                    .unwrap_or_else(|| MISSING_OUTCOME.to_string());
                report.fallbacks.push(Fallback {
                    unit_id: unit.id.clone(),
                    reason,
                });
                unit.merged_text.as_str()
            }
        };

        let target = prepare_target(doc, unit);
        match unit.kind {
            UnitKind::Plain => doc.set_text(target, text),
            UnitKind::Styled => {
                if let Some(advisory) = write_styled(doc, unit, target, text) {
                    debug!(unit_id = %advisory.unit_id, reason = %advisory.reason, "reconstruction advisory");
                    report.advisories.push(advisory);
                }
            }
        }
        report.written += 1;
    }

    report
}

/// Finds the unit's `<target>` and clears it, or creates one right after
/// `<source>`.
fn prepare_target(doc: &mut Document, unit: &TranslationUnit) -> NodeId {
    let target = if let Some(existing) = doc.find_child(unit.container, "target") {
        doc.clear(existing);
        existing
    } else {
        create_target(doc, unit)
    };

    if unit.preserve_whitespace {
        doc.set_attr(target, XML_SPACE, "preserve");
    }

    target
}

fn create_target(doc: &mut Document, unit: &TranslationUnit) -> NodeId {
    let name = doc
        .element(unit.source)
        .and_then(Element::prefix)
        .map_or_else(|| "target".to_string(), |prefix| format!("{prefix}:target"));
    let target = doc.create_element(&name);

    let Some(source_index) = doc.index_in_parent(unit.source) else {
        doc.append_child(unit.container, target);
        return target;
    };
    doc.insert_child(unit.container, source_index + 1, target);

    // Reuse the indentation in front of <source> so the output stays readable.
    let indent = source_index
        .checked_sub(1)
        .map(|i| doc.children(unit.container)[i])
        .and_then(|prev| match doc.kind(prev) {
            NodeKind::Text(text) if text.trim().is_empty() => Some(text.clone()),
            _ => None,
        });
    if let Some(indent) = indent {
        let node = doc.create_text(&indent);
        doc.insert_child(unit.container, source_index + 1, node);
    }

    target
}

/// Copies the source structure into `target` and distributes the
/// translated fragments over its text spans.
fn write_styled(
    doc: &mut Document,
    unit: &TranslationUnit,
    target: NodeId,
    text: &str,
) -> Option<Advisory> {
    for child in doc.children(unit.source).to_vec() {
        let copy = doc.deep_copy(child);
        doc.append_child(target, copy);
    }

    if unit.fragment_count == 0 {
        return None;
    }

    let pieces = split_fragments(text);
    let advisory = (pieces.len() != unit.fragment_count).then(|| {
        Advisory::new(
            &unit.id,
            AdvisoryReason::FragmentCountMismatch {
                expected: unit.fragment_count,
                actual: pieces.len(),
            },
        )
    });

    let fragments = reconcile(pieces, unit.fragment_count);
    let spans = text_spans(doc, target);

    for ((span, fragment), original) in spans
        .into_iter()
        .zip(&fragments)
        .zip(&unit.fragment_originals)
    {
        doc.set_text(span, &restore_whitespace(original, fragment));
    }

    advisory
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::translation::TranslationOutcome;
    use crate::xliff::extract_units;

    const STYLED: &str = r#"<xliff>
  <trans-unit id="s" datatype="x-DocumentState" xml:space="preserve">
    <source><g id="1" ctype="x-block" style="b"><g id="2" ctype="x-text">Walk </g><g id="3" ctype="x-text">into</g><g id="4" ctype="x-text"> the shop</g></g></source>
  </trans-unit>
</xliff>"#;

    fn run(xml: &str, outcomes: Vec<TranslationOutcome>) -> (Document, ReconstructionReport) {
        let mut doc = Document::parse(xml).unwrap();
        let units = extract_units(&doc).units;
        let set = OutcomeSet::resolve(&units, outcomes);
        let report = reconstruct(&mut doc, &units, &set);
        (doc, report)
    }

    fn target_spans(doc: &Document, unit_id: &str) -> Vec<String> {
        let root = doc.root_element().unwrap();
        let unit = doc
            .descendant_elements(root, "trans-unit")
            .into_iter()
            .find(|&u| doc.attr(u, "id") == Some(unit_id))
            .unwrap();
        let target = doc.find_child(unit, "target").unwrap();
        text_spans(doc, target)
            .into_iter()
            .map(|span| doc.text(span))
            .collect()
    }

    #[test]
    fn test_plain_target_is_created_after_source() {
        let (doc, report) = run(
            "<xliff>\n  <trans-unit id=\"p\">\n    <source>Hello</source>\n  </trans-unit>\n</xliff>",
            vec![TranslationOutcome::succeeded("p", "Hola")],
        );

        assert_eq!(report.written, 1);
        assert!(report.fallbacks.is_empty());
        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains("<source>Hello</source>\n    <target>Hola</target>\n  </trans-unit>"));
    }

    #[test]
    fn test_existing_target_is_reused() {
        let (doc, _) = run(
            r#"<xliff><trans-unit id="p"><source>Hello</source><target state="new">Old</target></trans-unit></xliff>"#,
            vec![TranslationOutcome::succeeded("p", "Hola")],
        );

        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains("<source>Hello</source><target>Hola</target>"));
        assert_eq!(xml.matches("<target").count(), 1);
    }

    #[test]
    fn test_styled_structure_is_cloned() {
        let (doc, report) = run(
            STYLED,
            vec![TranslationOutcome::succeeded("s", "Entra __SEG__ en __SEG__ la tienda")],
        );

        assert!(report.advisories.is_empty());
        assert_eq!(target_spans(&doc, "s"), vec!["Entra ", "en", " la tienda"]);

        let xml = doc.to_xml_string().unwrap();
        assert!(xml.contains(r#"<target xml:space="preserve"><g id="1" ctype="x-block" style="b">"#));
        // Source is untouched.
        assert!(xml.contains(r#"<g id="3" ctype="x-text">into</g>"#));
    }

    #[test]
    fn test_styled_whitespace_restitution() {
        let (doc, _) = run(
            STYLED,
            vec![TranslationOutcome::succeeded("s", "Entra__SEG__en__SEG__la tienda")],
        );

        assert_eq!(target_spans(&doc, "s"), vec!["Entra ", "en", " la tienda"]);
    }

    #[test]
    fn test_styled_too_few_pieces_are_padded() {
        let (doc, report) = run(STYLED, vec![TranslationOutcome::succeeded("s", "Entra en la tienda")]);

        assert_eq!(target_spans(&doc, "s"), vec!["Entra en la tienda ", "", " "]);
        assert_eq!(
            report.advisories,
            vec![Advisory::new(
                "s",
                AdvisoryReason::FragmentCountMismatch {
                    expected: 3,
                    actual: 1
                }
            )]
        );
    }

    #[test]
    fn test_styled_too_many_pieces_are_merged_into_last() {
        let (doc, report) = run(
            STYLED,
            vec![TranslationOutcome::succeeded("s", "A __SEG__ B __SEG__ C __SEG__ D")],
        );

        assert_eq!(target_spans(&doc, "s"), vec!["A ", "B", " C D"]);
        assert_eq!(report.advisories.len(), 1);
    }

    #[test]
    fn test_failed_outcome_falls_back_to_source_text() {
        let (doc, report) = run(
            STYLED,
            vec![TranslationOutcome::failed(
                "s",
                "Walk  __SEG__ into __SEG__  the shop",
                "API error",
            )],
        );

        assert_eq!(target_spans(&doc, "s"), vec!["Walk ", "into", " the shop"]);
        assert_eq!(
            report.fallbacks,
            vec![Fallback {
                unit_id: "s".to_string(),
                reason: "API error".to_string()
            }]
        );
    }

    #[test]
    fn test_failed_plain_outcome_keeps_source_text() {
        let (doc, report) = run(
            r#"<xliff><trans-unit id="p"><source> Hello </source></trans-unit></xliff>"#,
            vec![TranslationOutcome::failed("p", "Hello", "timeout")],
        );

        assert_eq!(report.fallbacks.len(), 1);
        assert!(doc.to_xml_string().unwrap().contains("<target>Hello</target>"));
    }

    #[test]
    fn test_missing_outcome_falls_back() {
        let (doc, report) = run(STYLED, vec![]);

        assert_eq!(report.fallbacks[0].reason, MISSING_OUTCOME);
        assert_eq!(target_spans(&doc, "s"), vec!["Walk ", "into", " the shop"]);
    }

    #[test]
    fn test_prefixed_target_name() {
        let (doc, _) = run(
            r#"<x:xliff xmlns:x="urn:oasis:names:tc:xliff:document:1.2"><x:trans-unit id="p"><x:source>Hi</x:source></x:trans-unit></x:xliff>"#,
            vec![TranslationOutcome::succeeded("p", "Hola")],
        );

        assert!(doc.to_xml_string().unwrap().contains("<x:target>Hola</x:target>"));
    }

    #[test]
    fn test_empty_plain_unit_gets_empty_target() {
        let (doc, report) = run(
            r#"<xliff><trans-unit id="e"><source>  </source></trans-unit></xliff>"#,
            vec![],
        );

        assert!(report.fallbacks.is_empty());
        assert!(doc.to_xml_string().unwrap().contains("<target/>"));
    }
}
