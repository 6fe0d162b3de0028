mod multi_progress;
mod progress_style;

pub use multi_progress::{fetch_progress, MultiProgressNew};
pub use progress_style::ProgressStyleTemplate;
