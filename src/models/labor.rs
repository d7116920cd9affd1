use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Actual worktime declared by one user for one day, from an external ledger.
/// Rows without a project id apply to every project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborEntry {
    pub date: NaiveDate,
    pub account_id: String,
    pub actual_worktime_hour: f64,
    #[serde(default)]
    pub project_id: String,
}
