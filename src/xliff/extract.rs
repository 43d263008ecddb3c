//! Unit extraction: turns a parsed XLIFF 1.2 document into a flat list of
//! [`TranslationUnit`]s without touching the document.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::segment::{merge_fragments, normalize_fragment};
use super::unit::{
    Advisory, AdvisoryReason, TEXT_SPAN_CTYPE, TranslationUnit, UnitKind, XML_SPACE,
};
use crate::xml::{Document, NodeId};

/// Result of walking a document: units in document order plus every
/// advisory raised along the way.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub units: Vec<TranslationUnit>,
    pub advisories: Vec<Advisory>,
}

impl Extraction {
    /// Units that should be sent for translation.
    pub fn translatable(&self) -> impl Iterator<Item = &TranslationUnit> {
        self.units.iter().filter(|unit| unit.is_translatable())
    }

    /// Advisories about malformed `<bpt>`/`<ept>` pairing.
    pub fn tag_pairing_advisories(&self) -> impl Iterator<Item = &Advisory> {
        self.advisories
            .iter()
            .filter(|a| matches!(a.reason, AdvisoryReason::UnpairedTags { .. }))
    }
}

/// Summary of a document's translatable content.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatistics {
    pub total_units: usize,
    pub plain_units: usize,
    pub styled_units: usize,
    pub total_characters: usize,
    pub average_characters: f64,
    pub source_language: String,
    pub target_language: Option<String>,
}

impl FileStatistics {
    pub fn collect(doc: &Document, extraction: &Extraction) -> Self {
        let units = &extraction.units;
        let total_characters: usize = units.iter().map(|u| u.merged_text.chars().count()).sum();
        let average_characters = if units.is_empty() {
            0.0
        } else {
            (total_characters as f64 / units.len() as f64 * 100.0).round() / 100.0
        };

        Self {
            total_units: units.len(),
            plain_units: units.iter().filter(|u| u.kind == UnitKind::Plain).count(),
            styled_units: units.iter().filter(|u| u.kind == UnitKind::Styled).count(),
            total_characters,
            average_characters,
            source_language: source_language(doc).unwrap_or_else(|| "unknown".to_string()),
            target_language: target_language(doc),
        }
    }
}

fn file_element(doc: &Document) -> Option<NodeId> {
    let root = doc.root_element()?;
    if doc.is_element(root, "file") {
        return Some(root);
    }
    doc.descendant_elements(root, "file").into_iter().next()
}

/// `source-language` of the first `<file>` element.
pub fn source_language(doc: &Document) -> Option<String> {
    file_element(doc).and_then(|file| doc.attr(file, "source-language").map(str::to_string))
}

/// `target-language` of the first `<file>` element.
pub fn target_language(doc: &Document) -> Option<String> {
    file_element(doc).and_then(|file| doc.attr(file, "target-language").map(str::to_string))
}

/// Every `<trans-unit>` element in document order.
pub fn trans_units(doc: &Document) -> Vec<NodeId> {
    doc.root_element()
        .map(|root| doc.descendant_elements(root, "trans-unit"))
        .unwrap_or_default()
}

/// Inline `<g ctype="x-text">` spans below `node`, in document order.
pub fn text_spans(doc: &Document, node: NodeId) -> Vec<NodeId> {
    doc.descendant_elements(node, "g")
        .into_iter()
        .filter(|&g| doc.attr(g, "ctype") == Some(TEXT_SPAN_CTYPE))
        .collect()
}

pub fn preserves_whitespace(doc: &Document, node: NodeId) -> bool {
    doc.attr(node, XML_SPACE) == Some("preserve")
}

/// Extracts all units. Never fails on a well-formed tree: anything odd
/// becomes an advisory.
pub fn extract_units(doc: &Document) -> Extraction {
    let mut extraction = Extraction::default();
    let mut seen_ids = HashSet::new();

    for (index, container) in trans_units(doc).into_iter().enumerate() {
        let Some(mut unit) = extract_unit(doc, container, index, &mut extraction.advisories)
        else {
            continue;
        };

        // Outcomes are matched by id, so every unit needs its own.
        if seen_ids.contains(&unit.id) {
            let mut renamed = format!("{}#{}", unit.id, index + 1);
            while seen_ids.contains(&renamed) {
                renamed.push('#');
            }
            extraction.advisories.push(Advisory::new(
                &unit.id,
                AdvisoryReason::DuplicateId {
                    renamed: renamed.clone(),
                },
            ));
            unit.id = renamed;
        }
        seen_ids.insert(unit.id.clone());
        extraction.units.push(unit);
    }

    for advisory in &extraction.advisories {
        debug!(unit_id = %advisory.unit_id, reason = %advisory.reason, "extraction advisory");
    }

    extraction
}

fn extract_unit(
    doc: &Document,
    container: NodeId,
    index: usize,
    advisories: &mut Vec<Advisory>,
) -> Option<TranslationUnit> {
    let id = if let Some(id) = doc.attr(container, "id") {
        id.to_string()
    } else {
        let id = format!("#{}", index + 1);
        advisories.push(Advisory::new(&id, AdvisoryReason::MissingId));
        id
    };

    let datatype = doc.attr(container, "datatype");
    let (kind, unknown) = UnitKind::from_datatype(datatype);
    if unknown {
        advisories.push(Advisory::new(
            &id,
            AdvisoryReason::UnknownDatatype(datatype.unwrap_or_default().to_string()),
        ));
    }

    let Some(source) = doc.find_child(container, "source") else {
        advisories.push(Advisory::new(&id, AdvisoryReason::MissingSource));
        return None;
    };

    if let Some(reason) = validate_tag_pairing(doc, source) {
        advisories.push(Advisory::new(&id, reason));
    }

    let preserve_whitespace = preserves_whitespace(doc, container);

    let unit = match kind {
        UnitKind::Plain => {
            let raw = doc.text(source);
            let merged_text = if preserve_whitespace {
                raw
            } else {
                raw.trim().to_string()
            };
            let fragment_count = usize::from(!merged_text.trim().is_empty());

            TranslationUnit {
                id,
                kind,
                container,
                source,
                merged_text,
                preserve_whitespace,
                fragment_count,
                fragment_originals: Vec::new(),
            }
        }
        UnitKind::Styled => {
            let fragment_originals: Vec<String> = text_spans(doc, source)
                .into_iter()
                .map(|span| doc.text(span))
                .collect();
            let normalized: Vec<String> = fragment_originals
                .iter()
                .map(|raw| normalize_fragment(raw, preserve_whitespace))
                .collect();

            TranslationUnit {
                id,
                kind,
                container,
                source,
                merged_text: merge_fragments(&normalized),
                preserve_whitespace,
                fragment_count: fragment_originals.len(),
                fragment_originals,
            }
        }
    };

    Some(unit)
}

/// Checks that every `<bpt>` below `source` has an `<ept>` with the same id
/// and vice versa. Returns the mismatch, if any, as one reason.
pub fn validate_tag_pairing(doc: &Document, source: NodeId) -> Option<AdvisoryReason> {
    let ids = |local_name: &str| -> BTreeSet<String> {
        doc.descendant_elements(source, local_name)
            .into_iter()
            .map(|tag| doc.attr(tag, "id").unwrap_or_default().to_string())
            .collect()
    };

    let begins = ids("bpt");
    let ends = ids("ept");

    if begins == ends {
        return None;
    }

    Some(AdvisoryReason::UnpairedTags {
        missing_end: begins.difference(&ends).cloned().collect(),
        missing_begin: ends.difference(&begins).cloned().collect(),
    })
}
