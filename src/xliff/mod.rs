mod extract;
mod reconstruct;
mod review;
mod segment;
mod sweep;
mod unit;
mod validate;

pub use extract::{
    Extraction, FileStatistics, extract_units, preserves_whitespace, source_language,
    target_language, text_spans, trans_units, validate_tag_pairing,
};
pub use reconstruct::{Fallback, ReconstructionReport, reconstruct};
pub use review::{ReviewIssue, Severity, review_outcomes};
pub use segment::{
    BOUNDARY_TOKEN, PADDED_BOUNDARY, TokenCheck, check_boundary_tokens, count_boundary_tokens,
    merge_fragments, normalize_fragment, reconcile, restore_whitespace, split_fragments,
    strip_boundary_tokens,
};
pub use sweep::{FinalizedOutput, SweepRecord, finalize, sweep_boundary_tokens};
pub use unit::{
    Advisory, AdvisoryReason, PLAINTEXT_DATATYPE, STYLED_DATATYPE, TEXT_SPAN_CTYPE,
    TranslationUnit, UnitKind, XML_SPACE,
};
pub use validate::{
    FragmentMismatch, MAX_TOLERATED_MISMATCHES, TokenSurvivor, ValidationReport,
    validate_document,
};
