use super::phase::Phase;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentType {
    Inspection,
    Onhold,
}

impl CommentType {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "inspection" => Some(CommentType::Inspection),
            "onhold" => Some(CommentType::Onhold),
            _ => None,
        }
    }
}

/// Lifecycle of an inspection comment. `Resolved` means the annotator
/// addressed it; `Closed` means it was dismissed as not needing a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Open,
    #[serde(alias = "addressed")]
    Resolved,
    Closed,
}

impl CommentStatus {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(CommentStatus::Open),
            "resolved" | "addressed" => Some(CommentStatus::Resolved),
            "closed" => Some(CommentStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionComment {
    #[serde(default)]
    pub project_id: String,
    pub task_id: String,
    pub comment_id: String,
    pub phase: Phase,
    #[serde(default = "default_stage")]
    pub phase_stage: u32,
    #[serde(default)]
    pub account_id: Option<String>,
    pub comment_type: CommentType,
    pub status: CommentStatus,
    #[serde(default = "default_root")]
    pub is_root: bool,
    #[serde(default)]
    pub created_datetime: Option<DateTime<FixedOffset>>,
}

fn default_stage() -> u32 {
    1
}

fn default_root() -> bool {
    true
}

impl InspectionComment {
    /// A comment that pointed out a defect the annotator then fixed.
    pub fn is_pointed_out(&self) -> bool {
        self.is_root
            && self.comment_type == CommentType::Inspection
            && self.status == CommentStatus::Resolved
    }
}
