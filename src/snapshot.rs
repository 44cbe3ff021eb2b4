use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

/// Exchange rates for one calendar date, all expressed against `base`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RateSnapshot {
    /// Provider-reported unix time of the rate observation.
    pub timestamp: i64,
    /// Local unix time in milliseconds when the snapshot was written.
    pub updated_at: i64,
    pub base: String,
    pub rates: HashMap<String, f64>,
}
