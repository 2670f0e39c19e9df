//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Offset/limit paging for list and overview queries.
///
/// Applied to the grouped result set in aggregate queries, so a product is
/// never split across pages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: default_limit(),
        }
    }
}

impl PageParams {
    /// Clamp to sane bounds: non-negative offset, limit in 1..=500.
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset.max(0),
            limit: self.limit.clamp(1, 500),
        }
    }
}

/// Quantity held at one named location, one entry of a per-product breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuantity {
    pub location: String,
    pub quantity: i64,
}
