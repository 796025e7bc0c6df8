use crate::domain::a001_site::aggregate::Site;
use crate::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of a monthly history record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthlyHistoryId(pub Uuid);

impl MonthlyHistoryId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for MonthlyHistoryId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(MonthlyHistoryId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Archived month-end KPIs for one site
///
/// Written exactly once per (site, year, month) by the monthly rollover and
/// immutable afterwards. The site name is denormalized so history survives
/// site renames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyHistoryRecord {
    pub id: MonthlyHistoryId,
    #[serde(rename = "siteId")]
    pub site_id: Uuid,
    #[serde(rename = "siteName")]
    pub site_name: String,
    pub year: i32,
    /// Calendar month number, 1-12
    pub month: u32,
    /// Final revenue-to-date captured at rollover time
    pub revenue: f64,
    #[serde(rename = "retentionRate")]
    pub retention_rate: f64,
    #[serde(rename = "npsScore")]
    pub nps_score: f64,
    /// Goal that was in force for the archived month
    #[serde(rename = "monthlyGoal")]
    pub monthly_goal: f64,
    pub metadata: EntityMetadata,
}

impl MonthlyHistoryRecord {
    /// Snapshot the running counters of a site for the given archived month
    pub fn archive_from_site(site: &Site, year: i32, month: u32) -> Self {
        Self {
            id: MonthlyHistoryId::new_v4(),
            site_id: site.id.value(),
            site_name: site.name.clone(),
            year,
            month,
            revenue: site.revenue_to_date,
            retention_rate: site.retention_rate,
            nps_score: site.nps_score,
            monthly_goal: site.monthly_goal,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    /// Month key in `YYYY-MM` form
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}
