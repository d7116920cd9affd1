//! Typed loading of project payloads (JSON) and external tables (CSV).
//!
//! Records whose enum-like fields carry values the engine does not know are
//! skipped and reported as `Warning::UnrecognizedValue`; structurally broken
//! files are errors.

pub mod ledger;
pub mod payload;
pub mod project_dir;

pub use project_dir::{ExternalSources, load_project};
