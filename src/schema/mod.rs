//! Ingestion of author-facing mechanism JSON and the link dataset.

pub mod issue;
pub mod overrides;
pub mod registry;
pub mod sanitize;
