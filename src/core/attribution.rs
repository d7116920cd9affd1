//! Decides, per task, on which date it counts as produced and which members
//! receive credit for each phase.

use crate::core::calculator::spans::{SpanReport, TaskTimeline, WorktimeSpan};
use crate::core::volume::ProductionOverrides;
use crate::core::warnings::Warning;
use crate::models::{
    InspectionComment, Phase, PhaseMap, ProductionVolume, QualityFigures, Task, TaskStatus,
};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// When a task counts as produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum CompletionCriteria {
    /// First time the task is completed in the acceptance phase.
    #[default]
    AcceptanceCompleted,
    /// First time the task enters the acceptance phase.
    AcceptanceReached,
}

impl CompletionCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionCriteria::AcceptanceCompleted => "acceptance_completed",
            CompletionCriteria::AcceptanceReached => "acceptance_reached",
        }
    }
}

/// How a phase's production is split between the members who worked it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum AttributionPolicy {
    /// Everything goes to the first member who started working the phase.
    FirstActor,
    /// Split by each member's share of the phase's worktime.
    #[default]
    Proportional,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseShare {
    pub account_id: String,
    pub worktime_hour: f64,
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseAttribution {
    pub worktime_hour: f64,
    pub post_rejection_worktime_hour: f64,
    pub first_actor: Option<String>,
    /// Empty when the phase cannot be credited (no worktime, or an attribution gap).
    pub shares: Vec<PhaseShare>,
    pub span_count: usize,
}

/// Everything the aggregators need to know about one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAttribution {
    pub task_id: String,
    pub phase: Phase,
    pub status: TaskStatus,
    pub criteria: CompletionCriteria,
    pub production_date: Option<NaiveDate>,
    pub phases: PhaseMap<PhaseAttribution>,
    pub volume: ProductionVolume,
    pub rejected_count: u32,
    pub pointed_out_inspection_comment_count: u32,
    pub open_span_count: usize,
}

impl TaskAttribution {
    pub fn is_produced(&self) -> bool {
        self.production_date.is_some()
    }

    /// Phase worktime that counts toward production. Acceptance is not
    /// production work when the task is produced on reaching acceptance.
    pub fn production_worktime_hour(&self, phase: Phase) -> f64 {
        if self.excludes_from_production(phase) {
            return 0.0;
        }
        self.phases.get(phase).worktime_hour
    }

    fn excludes_from_production(&self, phase: Phase) -> bool {
        self.criteria == CompletionCriteria::AcceptanceReached && phase == Phase::Acceptance
    }

    /// `(account_id, weight)` pairs receiving this task's production in `phase`.
    /// Weights sum to 1 when the phase can be credited, otherwise the list is empty.
    pub fn credits(&self, phase: Phase, policy: AttributionPolicy) -> Vec<(String, f64)> {
        if self.excludes_from_production(phase) {
            return Vec::new();
        }

        let attribution = self.phases.get(phase);
        match policy {
            AttributionPolicy::FirstActor => attribution
                .first_actor
                .iter()
                .map(|account| (account.clone(), 1.0))
                .collect(),
            AttributionPolicy::Proportional => attribution
                .shares
                .iter()
                .map(|s| (s.account_id.clone(), s.share))
                .collect(),
        }
    }

    pub fn quality(&self) -> QualityFigures {
        QualityFigures {
            task_count: self.volume.task_count,
            annotation_count: self.volume.annotation_count,
            pointed_out_inspection_comment_count: f64::from(
                self.pointed_out_inspection_comment_count,
            ),
            rejected_count: f64::from(self.rejected_count),
        }
    }
}

/// Date on which `task` counts as produced under `criteria`. The event log
/// wins; the task's own timestamps are the fallback.
pub fn production_date(
    task: &Task,
    timeline: Option<&TaskTimeline>,
    criteria: CompletionCriteria,
) -> Option<NaiveDate> {
    let events = timeline.map(|t| t.events.as_slice()).unwrap_or_default();

    match criteria {
        CompletionCriteria::AcceptanceCompleted => events
            .iter()
            .find(|e| e.phase == Phase::Acceptance && e.status == TaskStatus::Complete)
            .map(|e| e.date())
            .or_else(|| {
                task.first_acceptance_completed_datetime
                    .map(|dt| dt.date_naive())
            }),
        CompletionCriteria::AcceptanceReached => events
            .iter()
            .find(|e| e.phase == Phase::Acceptance)
            .map(|e| e.date())
            .or_else(|| {
                task.first_acceptance_reached_datetime
                    .map(|dt| dt.date_naive())
            }),
    }
}

/// Account of the first `working` event of `phase`, falling back to the
/// task's per-phase history summary.
pub fn first_actor(task: &Task, timeline: Option<&TaskTimeline>, phase: Phase) -> Option<String> {
    timeline
        .and_then(|t| {
            t.events
                .iter()
                .find(|e| e.phase == phase && e.status.is_working())
        })
        .and_then(|e| e.account_id.clone())
        .or_else(|| task.first_worker(phase).map(str::to_string))
}

/// Split a phase's worktime between the accounts that logged spans in it.
pub fn phase_shares<'a>(
    task_id: &str,
    phase: Phase,
    spans: impl Iterator<Item = &'a WorktimeSpan>,
) -> (Vec<PhaseShare>, Option<Warning>) {
    let mut per_account: BTreeMap<String, f64> = BTreeMap::new();
    let mut total = 0.0;
    let mut span_count = 0;
    let mut unattributed = false;

    for span in spans {
        span_count += 1;
        total += span.duration_hours;
        match &span.account_id {
            Some(account) => *per_account.entry(account.clone()).or_insert(0.0) += span.duration_hours,
            None if span.duration_hours > 0.0 => unattributed = true,
            None => {}
        }
    }

    if span_count == 0 {
        return (Vec::new(), None);
    }
    if unattributed {
        let gap = Warning::AttributionGap {
            task_id: task_id.to_string(),
            phase,
        };
        return (Vec::new(), Some(gap));
    }
    if total <= 0.0 {
        let zero = Warning::ZeroWorktimePhase {
            task_id: task_id.to_string(),
            phase,
        };
        return (Vec::new(), Some(zero));
    }

    let shares = per_account
        .into_iter()
        .filter(|(_, hours)| *hours > 0.0)
        .map(|(account_id, hours)| PhaseShare {
            account_id,
            worktime_hour: hours,
            share: hours / total,
        })
        .collect();

    (shares, None)
}

/// Attribution of a single task.
pub fn attribute_task(
    task: &Task,
    timeline: Option<&TaskTimeline>,
    pointed_out_comments: u32,
    overrides: &ProductionOverrides,
    criteria: CompletionCriteria,
) -> (TaskAttribution, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut phases: PhaseMap<PhaseAttribution> = PhaseMap::default();

    for phase in Phase::ALL {
        let spans: Vec<&WorktimeSpan> = timeline
            .map(|t| t.phase_spans(phase).collect())
            .unwrap_or_default();

        let (shares, warning) = phase_shares(&task.task_id, phase, spans.iter().copied());
        warnings.extend(warning);

        *phases.get_mut(phase) = PhaseAttribution {
            worktime_hour: spans.iter().map(|s| s.duration_hours).sum(),
            post_rejection_worktime_hour: spans
                .iter()
                .filter(|s| s.post_rejection)
                .map(|s| s.duration_hours)
                .sum(),
            first_actor: first_actor(task, timeline, phase),
            shares,
            span_count: spans.len(),
        };
    }

    let attribution = TaskAttribution {
        task_id: task.task_id.clone(),
        phase: task.phase,
        status: task.status,
        criteria,
        production_date: production_date(task, timeline, criteria),
        phases,
        volume: overrides.volume_for(task),
        rejected_count: timeline.map(|t| t.rejection_count).unwrap_or(0),
        pointed_out_inspection_comment_count: pointed_out_comments,
        open_span_count: timeline.map(|t| t.open_spans.len()).unwrap_or(0),
    };

    (attribution, warnings)
}

/// Attribution of every task, in task order.
pub fn attribute_tasks(
    tasks: &[Task],
    spans: &SpanReport,
    comments: &[InspectionComment],
    overrides: &ProductionOverrides,
    criteria: CompletionCriteria,
) -> (Vec<TaskAttribution>, Vec<Warning>) {
    let mut pointed_out: HashMap<&str, u32> = HashMap::new();
    for c in comments.iter().filter(|c| c.is_pointed_out()) {
        *pointed_out.entry(c.task_id.as_str()).or_insert(0) += 1;
    }

    let mut out = Vec::with_capacity(tasks.len());
    let mut warnings = Vec::new();

    for task in tasks {
        let (attribution, task_warnings) = attribute_task(
            task,
            spans.timelines.get(&task.task_id),
            pointed_out.get(task.task_id.as_str()).copied().unwrap_or(0),
            overrides,
            criteria,
        );
        out.push(attribution);
        warnings.extend(task_warnings);
    }

    tracing::debug!(
        tasks = out.len(),
        produced = out.iter().filter(|a| a.is_produced()).count(),
        criteria = criteria.as_str(),
        "task attribution finished"
    );

    (out, warnings)
}
