use std::fmt;

use crate::xml::NodeId;

/// `datatype` value of units holding plain strings.
pub const PLAINTEXT_DATATYPE: &str = "plaintext";

/// `datatype` value of units holding styled content with inline tags.
pub const STYLED_DATATYPE: &str = "x-DocumentState";

/// `ctype` value marking an inline `<g>` span as translatable text.
pub const TEXT_SPAN_CTYPE: &str = "x-text";

/// Qualified name of the `xml:space` attribute.
pub const XML_SPACE: &str = "xml:space";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// No inline markup; the source text is translated as is.
    Plain,
    /// Text is scattered over inline `<g ctype="x-text">` spans.
    Styled,
}

impl UnitKind {
    /// Maps a `datatype` attribute to a kind. Unknown values fall back to
    /// [`UnitKind::Plain`]; the second field reports whether that happened.
    pub fn from_datatype(datatype: Option<&str>) -> (Self, bool) {
        match datatype {
            None | Some(PLAINTEXT_DATATYPE) => (Self::Plain, false),
            Some(STYLED_DATATYPE) => (Self::Styled, false),
            Some(_) => (Self::Plain, true),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => PLAINTEXT_DATATYPE,
            Self::Styled => STYLED_DATATYPE,
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One translatable `<trans-unit>` of a document.
///
/// Node handles point into the [`Document`](crate::xml::Document) the unit
/// was extracted from and are only meaningful for that document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub id: String,
    pub kind: UnitKind,
    /// The `<trans-unit>` element.
    pub container: NodeId,
    /// Its `<source>` child.
    pub source: NodeId,
    /// Text sent for translation. Styled fragments are joined with the
    /// padded boundary token.
    pub merged_text: String,
    pub preserve_whitespace: bool,
    pub fragment_count: usize,
    /// Raw text of each fragment in document order, kept for whitespace
    /// restitution.
    pub fragment_originals: Vec<String>,
}

impl TranslationUnit {
    /// Whether the unit has anything worth sending for translation.
    pub fn is_translatable(&self) -> bool {
        self.fragment_count > 0
            && !super::segment::strip_boundary_tokens(&self.merged_text)
                .0
                .trim()
                .is_empty()
    }

    pub fn has_boundary_tokens(&self) -> bool {
        self.kind == UnitKind::Styled && self.fragment_count > 1
    }
}

/// Why a unit was flagged during extraction or reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryReason {
    /// `<bpt>`/`<ept>` ids that have no counterpart.
    UnpairedTags {
        missing_end: Vec<String>,
        missing_begin: Vec<String>,
    },
    UnknownDatatype(String),
    MissingSource,
    MissingId,
    /// Another unit already uses this id; this one is tracked under
    /// `renamed` instead. The document keeps the original id.
    DuplicateId { renamed: String },
    /// The translation split into a different number of fragments than the
    /// source had; repaired by padding or merging.
    FragmentCountMismatch {
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for AdvisoryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnpairedTags {
                missing_end,
                missing_begin,
            } => {
                let mut parts = Vec::new();
                if !missing_end.is_empty() {
                    parts.push(format!("Missing <ept> for: {}", missing_end.join(", ")));
                }
                if !missing_begin.is_empty() {
                    parts.push(format!("Missing <bpt> for: {}", missing_begin.join(", ")));
                }
                f.write_str(&parts.join("; "))
            }
            Self::UnknownDatatype(datatype) => {
                write!(f, "Unknown datatype '{datatype}', treated as plaintext")
            }
            Self::MissingSource => f.write_str("No <source> element, skipped"),
            Self::MissingId => f.write_str("No id attribute, using its position"),
            Self::DuplicateId { renamed } => {
                write!(f, "Duplicate id, translated separately as '{renamed}'")
            }
            Self::FragmentCountMismatch { expected, actual } => {
                let repair = if actual < expected {
                    "padded with empty fragments"
                } else {
                    "extra fragments merged into the last one"
                };
                write!(f, "Segment count mismatch: expected {expected}, got {actual} ({repair})")
            }
        }
    }
}

/// A non-fatal finding attributable to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub unit_id: String,
    pub reason: AdvisoryReason,
}

impl Advisory {
    pub fn new(unit_id: impl Into<String>, reason: AdvisoryReason) -> Self {
        Self {
            unit_id: unit_id.into(),
            reason,
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unit {}: {}", self.unit_id, self.reason)
    }
}
