//! Sprint performance metrics from an issue tracker.
//!
//! A sprint's issues are fetched through an ordered chain of transport paths
//! ([`jira`]), folded into per-assignee statistics ([`analyze`]) and turned into
//! a CSV export plus a display summary ([`report`]). [`pipeline::generate`]
//! runs the whole thing for one [`Configuration`].

pub mod analyze;
pub mod extract;
pub mod jira;
pub mod model;
pub mod pipeline;
pub mod report;

pub use model::{Configuration, Error, RawIssue, Result, TransportPath};
pub use pipeline::{fetch_sprint, generate, FetchedSprint, SprintReport};
