mod config;
mod error;
mod issue;
mod transport_path;

pub use config::Configuration;
pub use error::{Error, Result};
pub use issue::RawIssue;
pub use transport_path::{Envelope, RequestShape, TransportPath};
