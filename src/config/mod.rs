use crate::core::attribution::{AttributionPolicy, CompletionCriteria};
use crate::core::filter::TaskFilter;
use crate::core::rating::RatingConfig;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub task_completion_criteria: CompletionCriteria,
    #[serde(default)]
    pub attribution_policy: AttributionPolicy,
    /// Upper bound on worker threads when several projects are analyzed.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    #[serde(default = "default_moving_average_days")]
    pub moving_average_days: u32,
    /// Labels counted as annotations (empty = all labels).
    #[serde(default)]
    pub annotation_labels: Vec<String>,
    #[serde(default)]
    pub task_filter: TaskFilter,
    #[serde(default)]
    pub rating: RatingConfig,
}

fn default_parallelism() -> usize {
    4
}

fn default_moving_average_days() -> u32 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            task_completion_criteria: CompletionCriteria::default(),
            attribution_policy: AttributionPolicy::default(),
            parallelism: default_parallelism(),
            moving_average_days: default_moving_average_days(),
            annotation_labels: Vec::new(),
            task_filter: TaskFilter::default(),
            rating: RatingConfig::default(),
        }
    }
}

impl Config {
    /// Standard configuration directory (`~/.annoprod`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".annoprod")
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("annoprod.yaml")
    }

    /// Load `path` (or the standard file). A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_file);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(cfg)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.moving_average_days == 0 {
            return Err(AppError::Config(
                "moving_average_days must be at least 1".to_string(),
            ));
        }
        if self.rating.deviation.scale <= 0.0 {
            return Err(AppError::Config(
                "rating.deviation.scale must be positive".to_string(),
            ));
        }
        if self.rating.min_worktime_hour < 0.0 {
            return Err(AppError::Config(
                "rating.min_worktime_hour must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the default configuration to `path`, creating parent folders.
    /// An existing file is kept unless `force` is set.
    pub fn write_default(path: &Path, force: bool) -> AppResult<()> {
        if path.exists() && !force {
            return Err(AppError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default().to_yaml()?)?;
        Ok(())
    }
}
