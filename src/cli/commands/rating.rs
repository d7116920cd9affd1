use crate::cli::commands::load_inputs;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::logic::Core;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::ui::messages::{diagnostics_summary, header, warning};
use crate::utils::optional_number;
use crate::utils::path::expand_tilde;
use crate::utils::table::Table;

/// Handle the `rating` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Rating {
        input,
        engine,
        output,
        min_worktime_hour,
    } = cmd
    {
        let mut cfg = engine.apply(cfg)?;
        if let Some(hours) = min_worktime_hour {
            cfg.rating.min_worktime_hour = *hours;
            cfg.validate()?;
        }

        let inputs = load_inputs(input)?;
        let reports = Core::analyze_projects(&inputs, &cfg);
        if reports.len() < inputs.len() {
            warning(format!(
                "{} of {} projects could not be analyzed",
                inputs.len() - reports.len(),
                inputs.len()
            ));
        }

        let rating = Core::rate_projects(&reports, &cfg);
        ExportLogic::export_rating(
            &rating,
            &expand_tilde(&output.output),
            output.format,
            output.force,
        )?;

        let mut table = Table::with_headers(&[
            "metric",
            "population",
            "mean",
            "stddev",
            "q1",
            "q2",
            "q3",
        ]);
        for s in &rating.summary {
            table.add_row(vec![
                s.metric_name.clone(),
                s.population.to_string(),
                optional_number(s.mean, 4),
                optional_number(s.stddev, 4),
                optional_number(s.q1, 4),
                optional_number(s.q2, 4),
                optional_number(s.q3, 4),
            ]);
        }

        header("Rating");
        print!("{}", table.render());
        for report in &reports {
            diagnostics_summary(&report.project_id, &report.diagnostics);
        }
    }

    Ok(())
}
