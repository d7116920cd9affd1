//! Rebuilds continuous working intervals from task status-change events.

use crate::core::warnings::{MalformedReason, Warning};
use crate::models::{Phase, TaskHistoryEvent, TaskStatus};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// A closed working interval: a `working` event and the event that ended it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorktimeSpan {
    pub task_id: String,
    pub phase: Phase,
    pub phase_stage: u32,
    pub account_id: Option<String>,
    pub start_event: TaskHistoryEvent,
    pub end_event: TaskHistoryEvent,
    pub duration_hours: f64,
    /// Started after the task was sent back to an earlier phase.
    pub post_rejection: bool,
    /// Duration was negative and has been clamped to 0.
    pub clamped: bool,
}

impl WorktimeSpan {
    /// Worktime is credited to the date the span started.
    pub fn date(&self) -> NaiveDate {
        self.start_event.date()
    }
}

/// A `working` event never followed by a terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenSpan {
    pub task_id: String,
    pub phase: Phase,
    pub phase_stage: u32,
    pub account_id: Option<String>,
    pub start_event: TaskHistoryEvent,
}

/// Ordered events and reconstructed spans of a single task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskTimeline {
    pub task_id: String,
    pub events: Vec<TaskHistoryEvent>,
    pub spans: Vec<WorktimeSpan>,
    pub open_spans: Vec<OpenSpan>,
    /// Number of transitions back to an earlier phase.
    pub rejection_count: u32,
    /// Spans dropped because they touched a malformed event.
    pub excluded_span_count: usize,
}

impl TaskTimeline {
    pub fn total_hours(&self) -> f64 {
        self.spans.iter().map(|s| s.duration_hours).sum()
    }

    pub fn phase_spans(&self, phase: Phase) -> impl Iterator<Item = &WorktimeSpan> {
        self.spans.iter().filter(move |s| s.phase == phase)
    }
}

/// Timelines of every task plus the warnings raised while building them.
#[derive(Debug, Clone, Default)]
pub struct SpanReport {
    pub timelines: BTreeMap<String, TaskTimeline>,
    pub warnings: Vec<Warning>,
}

impl SpanReport {
    pub fn open_span_count(&self) -> usize {
        self.timelines.values().map(|t| t.open_spans.len()).sum()
    }

    pub fn spans(&self) -> impl Iterator<Item = &WorktimeSpan> {
        self.timelines.values().flat_map(|t| t.spans.iter())
    }
}

/// Sort by `(created_datetime, received_index)`. The sort is stable, so
/// events sharing both keys keep the order they were given in.
pub fn order_events(events: &[TaskHistoryEvent]) -> Vec<TaskHistoryEvent> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| e.order_key());
    sorted
}

/// Events (in received order) whose timestamp is earlier than an event
/// received before them for the same task.
pub fn non_monotonic_events(received: &[TaskHistoryEvent]) -> Vec<&TaskHistoryEvent> {
    let mut latest: HashMap<&str, DateTime<FixedOffset>> = HashMap::new();
    let mut out = Vec::new();

    for ev in received {
        match latest.get(ev.task_id.as_str()) {
            Some(prev) if ev.created_datetime < *prev => out.push(ev),
            _ => {
                latest.insert(ev.task_id.as_str(), ev.created_datetime);
            }
        }
    }

    out
}

fn span_duration_hours(start: &TaskHistoryEvent, end: &TaskHistoryEvent) -> f64 {
    (end.created_datetime - start.created_datetime).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Pair `working` events with their terminators, in the order given, on the
/// stream of one task. Events whose id is in `malformed` invalidate the spans
/// they touch.
///
/// `build_task_timeline` sorts the stream first, so its spans never run
/// backwards. A stream paired in received order can; such spans are kept with
/// a zero duration, marked `clamped` and warned.
pub fn pair_events(
    task_id: &str,
    ordered: &[TaskHistoryEvent],
    malformed: &HashSet<String>,
) -> (TaskTimeline, Vec<Warning>) {
    let mut timeline = TaskTimeline {
        task_id: task_id.to_string(),
        events: ordered.to_vec(),
        ..TaskTimeline::default()
    };
    let mut warnings = Vec::new();

    let mut open: Option<(&TaskHistoryEvent, bool)> = None;
    let mut prev_phase: Option<Phase> = None;
    let mut rejected = false;

    for ev in ordered {
        // -----------------------------
        // Rejection tracking
        // -----------------------------
        if let Some(prev) = prev_phase
            && ev.phase < prev
        {
            timeline.rejection_count += 1;
            rejected = true;
        }
        prev_phase = Some(ev.phase);

        match ev.status {
            TaskStatus::Working => match open {
                // Consecutive working events of the same phase fold into one span
                Some((start, _)) if start.phase == ev.phase => {}
                // Phase changed without a terminator: the old span never closed
                Some((start, _)) => {
                    push_open(&mut timeline, &mut warnings, start, malformed);
                    open = Some((ev, rejected));
                }
                None => open = Some((ev, rejected)),
            },
            status if status.is_terminator() => {
                if let Some((start, post_rejection)) = open.take() {
                    close_span(
                        &mut timeline,
                        &mut warnings,
                        start,
                        ev,
                        post_rejection,
                        malformed,
                    );
                }
            }
            _ => {}
        }
    }

    if let Some((start, _)) = open {
        push_open(&mut timeline, &mut warnings, start, malformed);
    }

    (timeline, warnings)
}

fn close_span(
    timeline: &mut TaskTimeline,
    warnings: &mut Vec<Warning>,
    start: &TaskHistoryEvent,
    end: &TaskHistoryEvent,
    post_rejection: bool,
    malformed: &HashSet<String>,
) {
    if malformed.contains(&start.task_history_id) || malformed.contains(&end.task_history_id) {
        timeline.excluded_span_count += 1;
        return;
    }

    let raw = span_duration_hours(start, end);
    let clamped = raw < 0.0;
    if clamped {
        warnings.push(Warning::NegativeSpanClamped {
            task_id: timeline.task_id.clone(),
            task_history_id: start.task_history_id.clone(),
        });
    }

    timeline.spans.push(WorktimeSpan {
        task_id: timeline.task_id.clone(),
        phase: start.phase,
        phase_stage: start.phase_stage,
        account_id: start.account_id.clone(),
        start_event: start.clone(),
        end_event: end.clone(),
        duration_hours: raw.max(0.0),
        post_rejection,
        clamped,
    });
}

fn push_open(
    timeline: &mut TaskTimeline,
    warnings: &mut Vec<Warning>,
    start: &TaskHistoryEvent,
    malformed: &HashSet<String>,
) {
    if malformed.contains(&start.task_history_id) {
        timeline.excluded_span_count += 1;
        return;
    }

    warnings.push(Warning::OpenSpan {
        task_id: timeline.task_id.clone(),
        task_history_id: start.task_history_id.clone(),
        account_id: start.account_id.clone(),
    });
    timeline.open_spans.push(OpenSpan {
        task_id: timeline.task_id.clone(),
        phase: start.phase,
        phase_stage: start.phase_stage,
        account_id: start.account_id.clone(),
        start_event: start.clone(),
    });
}

/// Timeline of one task from its events in received order.
pub fn build_task_timeline(
    task_id: &str,
    received: &[TaskHistoryEvent],
) -> (TaskTimeline, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut malformed = HashSet::new();

    for ev in non_monotonic_events(received) {
        malformed.insert(ev.task_history_id.clone());
        warnings.push(Warning::MalformedEvent {
            task_id: task_id.to_string(),
            task_history_id: ev.task_history_id.clone(),
            reason: MalformedReason::NonMonotonicTimestamp,
        });
    }

    let ordered = order_events(received);
    let (timeline, pair_warnings) = pair_events(task_id, &ordered, &malformed);
    warnings.extend(pair_warnings);

    (timeline, warnings)
}

/// Group events by task and rebuild every task's timeline.
///
/// When `known_tasks` is given, events of any other task are dropped with a
/// single warning per task.
pub fn build_spans(
    events: &[TaskHistoryEvent],
    known_tasks: Option<&HashSet<String>>,
) -> SpanReport {
    let mut grouped: BTreeMap<&str, Vec<TaskHistoryEvent>> = BTreeMap::new();
    for ev in events {
        grouped
            .entry(ev.task_id.as_str())
            .or_default()
            .push(ev.clone());
    }

    let mut report = SpanReport::default();

    for (task_id, received) in grouped {
        if let Some(known) = known_tasks
            && !known.contains(task_id)
        {
            report.warnings.push(Warning::MalformedEvent {
                task_id: task_id.to_string(),
                task_history_id: received[0].task_history_id.clone(),
                reason: MalformedReason::UnknownTask,
            });
            continue;
        }

        let (timeline, warnings) = build_task_timeline(task_id, &received);
        report.warnings.extend(warnings);
        report.timelines.insert(task_id.to_string(), timeline);
    }

    tracing::debug!(
        tasks = report.timelines.len(),
        open_spans = report.open_span_count(),
        "span reconstruction finished"
    );

    report
}
