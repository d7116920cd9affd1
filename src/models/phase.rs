use serde::{Deserialize, Serialize};

/// Workflow stage a task passes through. Ordering follows the workflow, so a
/// transition to a smaller phase is a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Annotation,
    Inspection,
    Acceptance,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Annotation, Phase::Inspection, Phase::Acceptance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Annotation => "annotation",
            Phase::Inspection => "inspection",
            Phase::Acceptance => "acceptance",
        }
    }

    /// Convert payload string → enum
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "annotation" => Some(Phase::Annotation),
            "inspection" => Some(Phase::Inspection),
            "acceptance" => Some(Phase::Acceptance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    Working,
    Break,
    OnHold,
    Complete,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::Working => "working",
            TaskStatus::Break => "break",
            TaskStatus::OnHold => "on_hold",
            TaskStatus::Complete => "complete",
        }
    }

    /// Convert payload string → enum
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(TaskStatus::NotStarted),
            "working" => Some(TaskStatus::Working),
            "break" => Some(TaskStatus::Break),
            "on_hold" => Some(TaskStatus::OnHold),
            "complete" => Some(TaskStatus::Complete),
            _ => None,
        }
    }

    pub fn is_working(&self) -> bool {
        matches!(self, TaskStatus::Working)
    }

    /// Statuses that close an open working span.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            TaskStatus::Break | TaskStatus::OnHold | TaskStatus::Complete
        )
    }
}

/// One value per phase. Used for per-phase worktime and production figures
/// so the column order always follows `Phase::ALL`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseMap<T> {
    pub annotation: T,
    pub inspection: T,
    pub acceptance: T,
}

impl<T> PhaseMap<T> {
    pub fn get(&self, phase: Phase) -> &T {
        match phase {
            Phase::Annotation => &self.annotation,
            Phase::Inspection => &self.inspection,
            Phase::Acceptance => &self.acceptance,
        }
    }

    pub fn get_mut(&mut self, phase: Phase) -> &mut T {
        match phase {
            Phase::Annotation => &mut self.annotation,
            Phase::Inspection => &mut self.inspection,
            Phase::Acceptance => &mut self.acceptance,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, &T)> {
        Phase::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

impl PhaseMap<f64> {
    pub fn add(&mut self, other: &PhaseMap<f64>) {
        for phase in Phase::ALL {
            *self.get_mut(phase) += other.get(phase);
        }
    }
}
