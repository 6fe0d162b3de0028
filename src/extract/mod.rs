pub mod fields;
pub mod references;
pub mod story_points;

pub use fields::{
    assignee_of, cycle_time_days_of, is_done, issue_type_of, status_category_of, story_points_of,
    UNASSIGNED, UNKNOWN,
};
pub use references::{Reference, ReferenceKind};
pub use story_points::{DetectionReason, FieldDetection, FieldMeta};
