use crate::config::Config;
use crate::core::attribution::{AttributionPolicy, CompletionCriteria};
use crate::errors::AppResult;
use crate::export::ExportFormat;
use crate::ingest::ExternalSources;
use crate::utils::path::expand_tilde;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for annoprod
/// Production and quality analytics over annotation task event logs
#[derive(Parser)]
#[command(
    name = "annoprod",
    version = env!("CARGO_PKG_VERSION"),
    about = "Production and quality analytics over annotation task event logs",
    long_about = None
)]
pub struct Cli {
    /// Configuration file (default: ~/.annoprod/annoprod.yaml)
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(global = true, short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Project directories and the CSV tables shared by them.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Project directories (task.json, task_history_event.json, ...)
    #[arg(required = true, value_name = "PROJECT_DIR")]
    pub projects: Vec<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Actual worktime ledger (CSV)")]
    pub labor: Option<PathBuf>,

    #[arg(
        long = "annotation-count",
        value_name = "FILE",
        help = "Per-task annotation count overrides (CSV)"
    )]
    pub annotation_count: Option<PathBuf>,

    #[arg(
        long = "input-data-count",
        value_name = "FILE",
        help = "Per-task input data count overrides (CSV)"
    )]
    pub input_data_count: Option<PathBuf>,

    #[arg(
        long = "custom-volume",
        value_name = "FILE",
        help = "Per-task custom production volumes (CSV)"
    )]
    pub custom_volume: Option<PathBuf>,
}

impl InputArgs {
    pub fn sources(&self) -> ExternalSources {
        let resolve = |p: &Option<PathBuf>| p.as_deref().map(expand_tilde);
        ExternalSources {
            labor: resolve(&self.labor),
            annotation_count: resolve(&self.annotation_count),
            input_data_count: resolve(&self.input_data_count),
            custom_volume: resolve(&self.custom_volume),
        }
    }
}

/// Engine settings that override the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    #[arg(long, value_enum, help = "When a task counts as produced")]
    pub criteria: Option<CompletionCriteria>,

    #[arg(long, value_enum, help = "How phase production is split between members")]
    pub policy: Option<AttributionPolicy>,

    #[arg(long, value_name = "N", help = "Worker threads for multiple projects")]
    pub parallelism: Option<usize>,

    #[arg(long = "moving-average-days", value_name = "DAYS")]
    pub moving_average_days: Option<u32>,

    #[arg(
        long = "label",
        value_name = "LABEL",
        help = "Count only these annotation labels (repeatable)"
    )]
    pub labels: Vec<String>,
}

impl EngineArgs {
    /// Copy of `cfg` with every given flag applied.
    pub fn apply(&self, cfg: &Config) -> AppResult<Config> {
        let mut cfg = cfg.clone();
        if let Some(criteria) = self.criteria {
            cfg.task_completion_criteria = criteria;
        }
        if let Some(policy) = self.policy {
            cfg.attribution_policy = policy;
        }
        if let Some(n) = self.parallelism {
            cfg.parallelism = n;
        }
        if let Some(days) = self.moving_average_days {
            cfg.moving_average_days = days;
        }
        if !self.labels.is_empty() {
            cfg.annotation_labels = self.labels.clone();
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, short = 'o', value_name = "DIR", help = "Output directory")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormat,

    #[arg(long, short = 'f', help = "Overwrite existing output files")]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Daily, member and whole-project production tables
    Production {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        engine: EngineArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rate members of one or more projects against each other
    Rating {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        engine: EngineArgs,

        #[command(flatten)]
        output: OutputArgs,

        #[arg(
            long = "min-worktime-hour",
            value_name = "HOURS",
            help = "Leave out members with less monitored worktime"
        )]
        min_worktime_hour: Option<f64>,
    },

    /// Reconstructed working spans of a single project
    Spans {
        #[arg(value_name = "PROJECT_DIR")]
        project: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show or create the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(long = "init", help = "Write a configuration file with default values")]
        init: bool,

        #[arg(long, short = 'f', help = "Overwrite an existing file with --init")]
        force: bool,
    },
}
