//! Final safety net: strips any boundary token left in a written document.

use anyhow::{Context, Result};
use tracing::debug;

use super::extract::{text_spans, trans_units};
use super::segment::strip_boundary_tokens;
use crate::xml::Document;

/// One text span that still carried boundary tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepRecord {
    pub unit_id: String,
    /// `id` attribute of the `<g>` span, if it has one.
    pub span_id: Option<String>,
    pub before: String,
    pub after: String,
    pub removed: usize,
}

/// Removes boundary tokens from every text span of every `<target>`.
///
/// Running it a second time finds nothing to do.
pub fn sweep_boundary_tokens(doc: &mut Document) -> Vec<SweepRecord> {
    let mut records = Vec::new();

    for unit in trans_units(doc) {
        let Some(target) = doc.find_child(unit, "target") else {
            continue;
        };
        let unit_id = doc.attr(unit, "id").unwrap_or_default().to_string();

        for span in text_spans(doc, target) {
            let before = doc.text(span);
            let (after, removed) = strip_boundary_tokens(&before);
            if removed == 0 {
                continue;
            }

            doc.set_text(span, &after);
            let record = SweepRecord {
                unit_id: unit_id.clone(),
                span_id: doc.attr(span, "id").map(str::to_string),
                before,
                after,
                removed,
            };
            debug!(unit_id = %record.unit_id, removed = record.removed, "swept boundary tokens");
            records.push(record);
        }
    }

    records
}

/// Serialized output after the sweep.
#[derive(Debug, Clone)]
pub struct FinalizedOutput {
    pub xml: String,
    /// The re-opened document the sweep ran on.
    pub document: Document,
    pub sweep: Vec<SweepRecord>,
}

/// Serializes `doc`, re-opens the result and sweeps it, re-serializing only
/// when the sweep changed something.
pub fn finalize(doc: &Document) -> Result<FinalizedOutput> {
    let xml = doc.to_xml_string()?;
    let mut document =
        Document::parse(&xml).context("Failed to re-open the serialized document")?;

    let sweep = sweep_boundary_tokens(&mut document);
    let xml = if sweep.is_empty() {
        xml
    } else {
        document.to_xml_string()?
    };

    Ok(FinalizedOutput {
        xml,
        document,
        sweep,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::xliff::validate_document;

    const DIRTY: &str = r#"<xliff>
<trans-unit id="u1" datatype="x-DocumentState">
<source><g id="1" ctype="x-text">a __SEG__ b</g></source>
<target><g id="1" ctype="x-text">uno __SEG__ dos</g><g id="2" ctype="x-text">tres__SEG__ </g><g id="3" ctype="x-style">x __SEG__ y</g></target>
</trans-unit>
<trans-unit id="u2"><source>clean</source><target>limpio</target></trans-unit>
</xliff>"#;

    #[test]
    fn test_sweep_removes_tokens_from_target_spans_only() {
        let mut doc = Document::parse(DIRTY).unwrap();
        let records = sweep_boundary_tokens(&mut doc);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].unit_id, "u1");
        assert_eq!(records[0].span_id.as_deref(), Some("1"));
        assert_eq!(records[0].after, "uno dos");
        assert_eq!(records[1].after, "tres ");

        let xml = doc.to_xml_string().unwrap();
        // Source spans and non-text spans are not touched.
        assert!(xml.contains(r#"<g id="1" ctype="x-text">a __SEG__ b</g>"#));
        assert!(xml.contains(r#"<g id="3" ctype="x-style">x __SEG__ y</g>"#));
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let spliced = r#"<xliff><trans-unit id="s" datatype="x-DocumentState">
<source><g id="1" ctype="x-text">x y</g></source>
<target><g id="1" ctype="x-text">x__SE__SEG__G__y</g></target>
</trans-unit></xliff>"#;

        for xml in [DIRTY, spliced] {
            let mut doc = Document::parse(xml).unwrap();
            assert!(!sweep_boundary_tokens(&mut doc).is_empty());
            let once = doc.to_xml_string().unwrap();

            let second = sweep_boundary_tokens(&mut doc);
            assert!(second.is_empty(), "second sweep found {second:?}");
            assert_eq!(doc.to_xml_string().unwrap(), once);
        }
    }

    #[test]
    fn test_spliced_token_is_fully_removed() {
        let doc = Document::parse(
            r#"<xliff><trans-unit id="s"><source>x</source><target><g id="1" ctype="x-text">x__SE__SEG__G__y</g></target></trans-unit></xliff>"#,
        )
        .unwrap();
        let output = finalize(&doc).unwrap();

        assert_eq!(output.sweep.len(), 1);
        assert_eq!(output.sweep[0].after, "xy");
        assert_eq!(output.sweep[0].removed, 2);
        assert!(!output.xml.contains("__SEG__"));
        assert!(validate_document(&output.document).surviving_tokens.is_empty());
    }

    #[test]
    fn test_finalize_reserializes_only_when_needed() {
        let clean = Document::parse(r#"<xliff><trans-unit id="a"><source>x</source><target>y</target></trans-unit></xliff>"#).unwrap();
        let output = finalize(&clean).unwrap();
        assert!(output.sweep.is_empty());
        assert_eq!(output.xml, clean.to_xml_string().unwrap());

        let dirty = Document::parse(DIRTY).unwrap();
        let output = finalize(&dirty).unwrap();
        assert_eq!(output.sweep.len(), 2);
        assert!(output.xml.contains("uno dos"));
    }
}
