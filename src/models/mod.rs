pub mod annotation;
pub mod cell;
pub mod comment;
pub mod history;
pub mod labor;
pub mod member;
pub mod phase;
pub mod production;
pub mod rating;
pub mod task;

pub use annotation::AnnotationCount;
pub use cell::{Cell, ColumnLayout, Columns};
pub use comment::{CommentStatus, CommentType, InspectionComment};
pub use history::TaskHistoryEvent;
pub use labor::LaborEntry;
pub use member::Member;
pub use phase::{Phase, PhaseMap, TaskStatus};
pub use production::{
    MemberRow, PhaseProduction, ProductionRow, ProductionVolume, QualityFigures, WholeRow,
    WorkFigures,
};
pub use rating::{MetricSummary, Rank, RatingRow};
pub use task::{MetadataValue, PhaseHistory, Task, TaskMetadata};
