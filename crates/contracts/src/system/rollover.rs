use serde::{Deserialize, Serialize};

/// Result of one rollover check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum RolloverOutcome {
    /// First-ever run: the status record was created, nothing archived
    Initialized,
    /// The stored month already matches the reference date, nothing to do
    AlreadyCurrent,
    /// A rollover transaction committed
    Completed {
        #[serde(rename = "sitesArchived")]
        sites_archived: usize,
        /// Month that was archived, `YYYY-MM`
        #[serde(rename = "archivedMonth")]
        archived_month: String,
    },
}
