use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label used for query results stored without an explicit one. Repeated
/// unlabeled queries overwrite each other under this key.
pub const DEFAULT_QUERY_LABEL: &str = "JQL";

/// Project population is capped by default; query population is not.
pub const DEFAULT_PROJECT_MAX_RESULTS: FetchLimit = FetchLimit::Bounded(10);

/// How many tickets a single search may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchLimit {
    Bounded(u32),
    #[default]
    Unbounded,
}

impl FetchLimit {
    /// The cap as a count, or `None` when unbounded.
    pub fn max_results(self) -> Option<usize> {
        match self {
            Self::Bounded(n) => Some(n as usize),
            Self::Unbounded => None,
        }
    }

    /// Truncate `items` to this limit.
    pub fn apply<T>(self, mut items: Vec<T>) -> Vec<T> {
        if let Some(max) = self.max_results() {
            items.truncate(max);
        }
        items
    }
}

impl fmt::Display for FetchLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Parses `"unbounded"`, `"0"` or an empty string as [`FetchLimit::Unbounded`]
/// and any other non-negative integer as a bound.
impl FromStr for FetchLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        match s.parse::<u32>() {
            Ok(0) => Ok(Self::Unbounded),
            Ok(n) => Ok(Self::Bounded(n)),
            Err(e) => Err(format!("invalid fetch limit {s:?}: {e}")),
        }
    }
}
