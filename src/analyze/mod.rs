pub mod analyzer;
mod model;

pub use analyzer::{aggregate, roll_up};
pub use model::{
    AssigneeMetrics, AssigneeStats, IssueFacts, MetricsMap, SprintTotals, WorkloadDistribution,
};
