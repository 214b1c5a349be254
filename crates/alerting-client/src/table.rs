//! Result-shaping parameters

use serde::{Deserialize, Serialize};

/// Pagination, sorting, and search parameters for an alert query
///
/// Passed through to the backend unmodified; this layer attaches no meaning
/// to the individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// "asc" or "desc"
    pub sort_order: String,
    /// Field to sort on
    pub sort_string: String,
    /// Page size
    pub size: usize,
    /// Offset of the first returned record
    pub start_index: usize,
    /// Free-text search across alert fields
    pub search_string: Option<String>,
    /// Placement of records missing the sort field
    pub missing: Option<String>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            sort_order: "desc".to_string(),
            sort_string: "start_time".to_string(),
            size: 20,
            start_index: 0,
            search_string: None,
            missing: None,
        }
    }
}

impl Table {
    /// Page covering every record, for internal pre-fetches
    pub fn unpaged() -> Self {
        Self {
            size: usize::MAX,
            ..Self::default()
        }
    }
}
