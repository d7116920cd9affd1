pub mod config;
pub mod production;
pub mod rating;
pub mod spans;

use crate::cli::parser::InputArgs;
use crate::core::logic::ProjectInput;
use crate::errors::AppResult;
use crate::ingest::{ExternalSources, load_project};
use crate::utils::path::expand_tilde;
use std::path::Path;

/// Load every project directory named on the command line.
pub(crate) fn load_inputs(input: &InputArgs) -> AppResult<Vec<ProjectInput>> {
    let sources = input.sources();
    input
        .projects
        .iter()
        .map(|dir| load_one(dir, &sources))
        .collect()
}

pub(crate) fn load_one(dir: &Path, sources: &ExternalSources) -> AppResult<ProjectInput> {
    load_project(&expand_tilde(dir), sources)
}
