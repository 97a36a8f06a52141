pub mod error;
pub mod types;

pub use error::{MetricsError, MetricsResult, SourceError};
pub use types::{FetchLimit, DEFAULT_PROJECT_MAX_RESULTS, DEFAULT_QUERY_LABEL};
