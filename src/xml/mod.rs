//! Minimal XML document model used by the XLIFF reader and writer.

mod document;

pub use document::{Document, Element, NodeId, NodeKind};
