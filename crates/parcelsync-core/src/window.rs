//! Replication window computation.
//!
//! Each page request carries a time window: `updated_at_min` derived from the
//! run's starting bookmark (or the configured `start_date`), `updated_at_max`
//! re-read from the wall clock at every call.

use crate::config::ConnectorConfig;
use crate::domain::UtcDateTime;
use crate::error::ConfigError;

/// Fixed page size used for every request.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// Time-bounded query parameters for one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowBounds {
    pub updated_at_min: Option<String>,
    pub updated_at_max: String,
    pub limit: u32,
}

impl WindowBounds {
    /// Query pairs in the order the API documents them.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            (String::from("limit"), self.limit.to_string()),
            (
                String::from("updated_at_max"),
                self.updated_at_max.clone(),
            ),
        ];
        if let Some(min) = &self.updated_at_min {
            pairs.push((String::from("updated_at_min"), min.clone()));
        }
        pairs
    }
}

/// Computes the replication window from the last persisted bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationWindow {
    page_size: u32,
}

impl Default for ReplicationWindow {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ReplicationWindow {
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    /// Window for one page request issued at `now`.
    ///
    /// The lower bound is the persisted bookmark plus one second (the
    /// boundary record was already emitted), else the configured
    /// `start_date` verbatim. When neither exists no lower bound is sent
    /// and the API's own default window policy applies — callers opting
    /// into that must accept an unspecified lower bound.
    ///
    /// A bookmark that does not parse as an ISO-8601 datetime with offset
    /// is a fatal configuration error, never a silently skipped bound.
    pub fn bounds(
        &self,
        config: &ConnectorConfig,
        bookmark: Option<&str>,
        now: UtcDateTime,
    ) -> Result<WindowBounds, ConfigError> {
        let updated_at_min = match bookmark {
            Some(value) => {
                let parsed =
                    UtcDateTime::parse(value).map_err(|_| ConfigError::InvalidBookmark {
                        value: value.to_owned(),
                    })?;
                Some(parsed.plus_seconds(1).format_query())
            }
            None => config.start_date().map(str::to_owned),
        };

        Ok(WindowBounds {
            updated_at_min,
            updated_at_max: now.format_query(),
            limit: self.page_size,
        })
    }
}
