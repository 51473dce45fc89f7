//! Services backing the HTTP handlers.

pub mod document_convert;
pub mod triage_registry;

pub use document_convert::PandocConverter;
pub use triage_registry::TriageRegistry;
