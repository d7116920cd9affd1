use crate::cli::commands::load_one;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::logic::Core;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::ingest::ExternalSources;
use crate::ui::messages::{diagnostics_summary, info};
use crate::utils::hours;
use crate::utils::path::expand_tilde;

/// Handle the `spans` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Spans { project, output } = cmd {
        let input = load_one(project, &ExternalSources::default())?;
        let report = Core::analyze_project(&input, cfg);

        ExportLogic::export_spans(
            &report,
            &expand_tilde(&output.output),
            output.format,
            output.force,
        )?;

        let closed = report.spans.spans().count();
        let total: f64 = report.spans.spans().map(|s| s.duration_hours).sum();
        info(format!(
            "project {}: {} spans ({}), {} open",
            report.project_id,
            closed,
            hours(total),
            report.spans.open_span_count()
        ));
        diagnostics_summary(&report.project_id, &report.diagnostics);
    }

    Ok(())
}
