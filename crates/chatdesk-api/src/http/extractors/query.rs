//! Query parameter extractors for list endpoints.

use serde::Deserialize;

/// Query parameters for `GET /admin/conversations`.
#[derive(Debug, Deserialize, Default)]
pub struct RecentQuery {
    /// Maximum results; missing or non-positive means the default.
    pub limit: Option<i64>,
}
