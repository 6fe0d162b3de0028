pub mod markdown;
pub mod summary;
pub mod table;

pub use summary::{assignee_rows, issue_types, SprintSummary};
pub use table::{escape_cell, ReportTable};
