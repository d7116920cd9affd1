use crate::cli::commands::load_inputs;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::logic::Core;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::ui::messages::{diagnostics_summary, header};
use crate::utils::path::{expand_tilde, project_output_dir};
use crate::utils::table::Table;
use crate::utils::hours;

/// Handle the `production` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Production {
        input,
        engine,
        output,
    } = cmd
    {
        let cfg = engine.apply(cfg)?;
        let inputs = load_inputs(input)?;
        let reports = Core::analyze_projects(&inputs, &cfg);

        let base = expand_tilde(&output.output);
        let multi = reports.len() > 1;
        let mut table = Table::with_headers(&[
            "project",
            "days",
            "produced_tasks",
            "monitored",
            "members",
            "warnings",
        ]);

        for report in &reports {
            let dir = project_output_dir(&base, &report.project_id, multi);
            ExportLogic::export_project(report, &dir, output.format, output.force)?;

            table.add_row(vec![
                report.project_id.clone(),
                report.daily.len().to_string(),
                report
                    .tasks
                    .iter()
                    .filter(|t| t.is_produced())
                    .count()
                    .to_string(),
                hours(report.whole.work.monitored_worktime_hour),
                report.members.len().to_string(),
                report.diagnostics.len().to_string(),
            ]);
        }

        header("Production");
        print!("{}", table.render());
        for report in &reports {
            diagnostics_summary(&report.project_id, &report.diagnostics);
        }
    }

    Ok(())
}
