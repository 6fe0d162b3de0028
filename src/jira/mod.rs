pub mod resolver;
pub mod transport;

pub use resolver::{board_id_from, FetchProgress, ProgressCallback, SprintFetcher, PAGE_SIZE};
pub use transport::{HttpGet, NetworkError, RawResponse, ReqwestClient, ShapedRequest, Shaping};
