//! End-to-end pipeline: one project, or many projects on a worker pool
//! followed by a pooled rating.

use crate::config::Config;
use crate::core::aggregator;
use crate::core::attribution::{TaskAttribution, attribute_tasks};
use crate::core::calculator::spans::{SpanReport, build_spans};
use crate::core::labor;
use crate::core::quality;
use crate::core::rating::{ProjectMembers, RatingReport, rate};
use crate::core::volume::{ProductionOverrides, apply_annotation_counts};
use crate::core::warnings::{Diagnostics, Warning};
use crate::models::{
    AnnotationCount, ColumnLayout, InspectionComment, LaborEntry, Member, MemberRow,
    ProductionRow, Task, TaskHistoryEvent, WholeRow,
};
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Already-fetched payloads of one project.
#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub project_id: String,
    pub tasks: Vec<Task>,
    pub events: Vec<TaskHistoryEvent>,
    pub comments: Vec<InspectionComment>,
    pub annotation_counts: Vec<AnnotationCount>,
    pub members: Vec<Member>,
    pub labor: Vec<LaborEntry>,
    pub overrides: ProductionOverrides,
    /// Records quarantined while the payloads were decoded.
    pub ingest_warnings: Vec<Warning>,
}

/// Every table produced for one project.
#[derive(Debug, Clone, Default)]
pub struct ProjectReport {
    pub project_id: String,
    pub layout: ColumnLayout,
    pub spans: SpanReport,
    pub tasks: Vec<TaskAttribution>,
    pub daily: Vec<ProductionRow>,
    pub member_daily: Vec<MemberRow>,
    pub members: Vec<MemberRow>,
    pub whole: WholeRow,
    pub diagnostics: Diagnostics,
}

pub struct Core;

impl Core {
    pub fn analyze_project(input: &ProjectInput, cfg: &Config) -> ProjectReport {
        let mut diagnostics = Diagnostics::new();
        diagnostics.extend(input.ingest_warnings.iter().cloned());

        // -----------------------------
        // Task selection
        // -----------------------------
        let known: HashSet<String> = input.tasks.iter().map(|t| t.task_id.clone()).collect();
        let selected = if cfg.task_filter.is_empty() {
            input.tasks.clone()
        } else {
            let kept = cfg.task_filter.apply(&input.tasks);
            tracing::debug!(
                project = %input.project_id,
                kept = kept.len(),
                dropped = input.tasks.len() - kept.len(),
                "task filter applied"
            );
            kept
        };
        let selected = if input.annotation_counts.is_empty() {
            selected
        } else {
            apply_annotation_counts(&selected, &input.annotation_counts, &cfg.annotation_labels)
        };
        let selected_ids: HashSet<&str> = selected.iter().map(|t| t.task_id.as_str()).collect();

        // Unknown tasks stay in so they get reported; filtered-out tasks go.
        let events: Vec<TaskHistoryEvent> = input
            .events
            .iter()
            .filter(|e| selected_ids.contains(e.task_id.as_str()) || !known.contains(&e.task_id))
            .cloned()
            .collect();

        // -----------------------------
        // Spans and attribution
        // -----------------------------
        let spans = build_spans(&events, Some(&known));
        diagnostics.extend(spans.warnings.iter().cloned());

        let (tasks, attribution_warnings) = attribute_tasks(
            &selected,
            &spans,
            &input.comments,
            &input.overrides,
            cfg.task_completion_criteria,
        );
        diagnostics.extend(attribution_warnings);

        // -----------------------------
        // Aggregation and quality
        // -----------------------------
        let daily = aggregator::daily_rows(&spans, &tasks);
        let daily = quality::attach_to_daily(&daily, &quality::score_by_date(&tasks));

        let member_daily = aggregator::member_daily_rows(&spans, &tasks, cfg.attribution_policy);
        let member_daily = quality::attach_to_members(
            &member_daily,
            &quality::score_by_member(&tasks, cfg.attribution_policy),
        );

        // -----------------------------
        // Labor ledger
        // -----------------------------
        let (daily, member_daily) = if input.labor.is_empty() {
            (daily, member_daily)
        } else {
            let project = Some(input.project_id.as_str());
            let (member_daily, member_warnings) =
                labor::merge_members(&member_daily, &input.labor, project);
            let (daily, daily_warnings) = labor::merge_daily(&daily, &input.labor, project);
            diagnostics.extend(member_warnings);
            diagnostics.extend(daily_warnings);
            (daily, member_daily)
        };

        let layout = input.overrides.layout();
        let daily = aggregator::fill_date_gaps(&daily);
        let daily = aggregator::with_moving_averages(&daily, &layout, cfg.moving_average_days);
        let member_daily = aggregator::label_members(&member_daily, &input.members);
        let members = aggregator::roll_up_members(&member_daily);
        let whole = aggregator::whole_row(&daily);

        tracing::info!(
            project = %input.project_id,
            tasks = tasks.len(),
            days = daily.len(),
            members = members.len(),
            warnings = diagnostics.len(),
            "project analyzed"
        );

        ProjectReport {
            project_id: input.project_id.clone(),
            layout,
            spans,
            tasks,
            daily,
            member_daily,
            members,
            whole,
            diagnostics,
        }
    }

    pub fn analyze_projects(inputs: &[ProjectInput], cfg: &Config) -> Vec<ProjectReport> {
        Self::analyze_projects_with_cancel(inputs, cfg, &AtomicBool::new(false))
    }

    /// Analyze projects on at most `cfg.parallelism` threads. Workers pull
    /// project indices from a shared cursor and keep their own results; the
    /// join is the barrier. Projects not started before `cancel` is set, and
    /// projects whose analysis panicked, are missing from the result.
    pub fn analyze_projects_with_cancel(
        inputs: &[ProjectInput],
        cfg: &Config,
        cancel: &AtomicBool,
    ) -> Vec<ProjectReport> {
        let workers = cfg.parallelism.max(1).min(inputs.len());
        let cursor = &AtomicUsize::new(0);
        let mut collected: Vec<(usize, ProjectReport)> = Vec::new();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        while !cancel.load(Ordering::SeqCst) {
                            let index = cursor.fetch_add(1, Ordering::SeqCst);
                            let Some(input) = inputs.get(index) else {
                                break;
                            };
                            match catch_unwind(AssertUnwindSafe(|| {
                                Core::analyze_project(input, cfg)
                            })) {
                                Ok(report) => done.push((index, report)),
                                Err(_) => tracing::error!(
                                    project = %input.project_id,
                                    "project analysis panicked; output omitted"
                                ),
                            }
                        }
                        done
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(done) => collected.extend(done),
                    Err(_) => tracing::error!("project worker panicked"),
                }
            }
        });

        collected.sort_by_key(|(index, _)| *index);
        collected.into_iter().map(|(_, report)| report).collect()
    }

    /// Rate the members of all reports as a single population.
    pub fn rate_projects(reports: &[ProjectReport], cfg: &Config) -> RatingReport {
        let projects: Vec<ProjectMembers> = reports
            .iter()
            .map(|r| ProjectMembers {
                project_id: r.project_id.clone(),
                layout: r.layout.clone(),
                rows: r.members.clone(),
            })
            .collect();

        rate(&projects, &cfg.rating)
    }
}
