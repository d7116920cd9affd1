//! Non-fatal conditions raised by the analytics engine.
//!
//! Every stage returns its table together with the warnings it raised; the
//! caller decides how to surface them.

use crate::models::Phase;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    UnknownTask,
    NonMonotonicTimestamp,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    #[error("task {task_id}: event {task_history_id} is malformed ({reason:?}); touching spans excluded")]
    MalformedEvent {
        task_id: String,
        task_history_id: String,
        reason: MalformedReason,
    },

    #[error("task {task_id}: working event {task_history_id} has no terminating event")]
    OpenSpan {
        task_id: String,
        task_history_id: String,
        account_id: Option<String>,
    },

    #[error("task {task_id}: span starting at {task_history_id} had a negative duration, clamped to 0")]
    NegativeSpanClamped {
        task_id: String,
        task_history_id: String,
    },

    #[error("task {task_id}: {phase:?} phase has spans but zero worktime; no member credit")]
    ZeroWorktimePhase { task_id: String, phase: Phase },

    #[error("task {task_id}: {phase:?} phase has worktime without an account; no member credit")]
    AttributionGap { task_id: String, phase: Phase },

    #[error("labor entry {date} / {account_id:?} has no monitored worktime")]
    ExternalJoinMismatch {
        date: NaiveDate,
        account_id: Option<String>,
    },

    #[error("{date} / {account_id:?}: monitored {monitored_worktime_hour}h exceeds actual {actual_worktime_hour}h, unmonitored clamped to 0")]
    UnmonitoredClamped {
        date: NaiveDate,
        account_id: Option<String>,
        actual_worktime_hour: f64,
        monitored_worktime_hour: f64,
    },

    #[error("{record}: unrecognized {field} value '{value}', record skipped")]
    UnrecognizedValue {
        record: String,
        field: String,
        value: String,
    },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::MalformedEvent { .. } => "malformed_event",
            Warning::OpenSpan { .. } => "open_span",
            Warning::NegativeSpanClamped { .. } => "negative_span_clamped",
            Warning::ZeroWorktimePhase { .. } => "zero_worktime_phase",
            Warning::AttributionGap { .. } => "attribution_gap",
            Warning::ExternalJoinMismatch { .. } => "external_join_mismatch",
            Warning::UnmonitoredClamped { .. } => "unmonitored_clamped",
            Warning::UnrecognizedValue { .. } => "unrecognized_value",
        }
    }
}

/// Warnings accumulated over a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(kind = warning.kind(), "{warning}");
        self.warnings.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for w in warnings {
            self.push(w);
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn count(&self, kind: &str) -> usize {
        self.warnings.iter().filter(|w| w.kind() == kind).count()
    }

    /// Warning counts per kind, sorted by kind.
    pub fn by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut out = BTreeMap::new();
        for w in &self.warnings {
            *out.entry(w.kind()).or_insert(0) += 1;
        }
        out
    }

    pub fn open_span_count(&self) -> usize {
        self.count("open_span")
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }
}
