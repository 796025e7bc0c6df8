use crate::domain::common::{AggregateId, EntityMetadata};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of a daily report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyReportId(pub Uuid);

impl DailyReportId {
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

impl AggregateId for DailyReportId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(DailyReportId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Daily performance report submitted by a site leader
///
/// Append-only: one report per (site, date). The revenue delta is applied to
/// the owning site's revenue-to-date inside the same database transaction as
/// the insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub id: DailyReportId,
    #[serde(rename = "siteId")]
    pub site_id: Uuid,
    /// Submitting site leader
    #[serde(rename = "leaderName")]
    pub leader_name: String,
    /// Calendar date the report covers
    #[serde(rename = "reportDate")]
    pub report_date: NaiveDate,
    /// Revenue recorded for that date
    pub revenue: f64,
    #[serde(rename = "newMembers")]
    pub new_members: i32,
    #[serde(rename = "lostMembers")]
    pub lost_members: i32,
    /// Retention the leader reports for the site as of this date, percent
    #[serde(rename = "retentionRate")]
    pub retention_rate: f64,
    /// Member satisfaction for the day, 0-10
    #[serde(rename = "satisfactionScore")]
    pub satisfaction_score: f64,
    /// Free-text reflections from the leader
    pub reflections: Option<String>,
    pub metadata: EntityMetadata,
}

impl DailyReport {
    pub fn new_for_insert(dto: DailyReportDto, site_id: Uuid) -> Self {
        Self {
            id: DailyReportId::new_v4(),
            site_id,
            leader_name: dto.leader_name,
            report_date: dto.report_date,
            revenue: dto.revenue,
            new_members: dto.new_members,
            lost_members: dto.lost_members,
            retention_rate: dto.retention_rate,
            satisfaction_score: dto.satisfaction_score,
            reflections: dto.reflections,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.leader_name.trim().is_empty() {
            return Err("Leader name must not be empty".into());
        }
        if self.revenue < 0.0 {
            return Err("Revenue must not be negative".into());
        }
        if self.new_members < 0 || self.lost_members < 0 {
            return Err("Member counts must not be negative".into());
        }
        if self.retention_rate < 0.0 {
            return Err("Retention rate must not be negative".into());
        }
        if !(0.0..=10.0).contains(&self.satisfaction_score) {
            return Err("Satisfaction score must be between 0 and 10".into());
        }
        Ok(())
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for daily report submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReportDto {
    #[serde(rename = "siteId")]
    pub site_id: String,
    #[serde(rename = "leaderName")]
    pub leader_name: String,
    #[serde(rename = "reportDate")]
    pub report_date: NaiveDate,
    pub revenue: f64,
    #[serde(rename = "newMembers", default)]
    pub new_members: i32,
    #[serde(rename = "lostMembers", default)]
    pub lost_members: i32,
    #[serde(rename = "retentionRate", default)]
    pub retention_rate: f64,
    #[serde(rename = "satisfactionScore", default)]
    pub satisfaction_score: f64,
    pub reflections: Option<String>,
}
