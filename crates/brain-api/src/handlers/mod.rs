//! HTTP handlers, one module per resource.

pub mod cards;
pub mod dashboard;
pub mod import;
pub mod onboarding;
pub mod settings;
pub mod topics;
