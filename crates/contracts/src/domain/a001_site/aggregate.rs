use crate::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of a gym site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteId(pub Uuid);

impl SiteId {
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

impl AggregateId for SiteId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SiteId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Gym site (one per physical location)
///
/// Running KPI counters accumulate through the calendar month and are reset
/// to zero by the monthly rollover. The goal survives the rollover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    /// Business code ("VIB-001"), also the NPS spreadsheet lookup key
    pub code: String,
    /// Display name shown on the dashboard
    pub name: String,
    /// Cumulative revenue recorded within the current calendar month
    #[serde(rename = "revenueToDate")]
    pub revenue_to_date: f64,
    /// CEO-set monthly revenue target
    #[serde(rename = "monthlyGoal")]
    pub monthly_goal: f64,
    /// Membership retention, percent
    #[serde(rename = "retentionRate")]
    pub retention_rate: f64,
    /// Externally sourced NPS for the current month
    #[serde(rename = "npsScore")]
    pub nps_score: f64,
    /// Average ticket value
    #[serde(rename = "averageTicket")]
    pub average_ticket: f64,
    pub metadata: EntityMetadata,
}

impl Site {
    /// Create a new site for insertion. Counters start at zero.
    pub fn new_for_insert(code: String, name: String, monthly_goal: f64) -> Self {
        Self {
            id: SiteId::new_v4(),
            code,
            name,
            revenue_to_date: 0.0,
            monthly_goal,
            retention_rate: 0.0,
            nps_score: 0.0,
            average_ticket: 0.0,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    /// Apply a CEO edit from the DTO
    pub fn update(&mut self, dto: &SiteDto) {
        self.code = dto.code.clone().unwrap_or_else(|| self.code.clone());
        self.name = dto.name.clone();
        self.monthly_goal = dto.monthly_goal;
        if let Some(v) = dto.retention_rate {
            self.retention_rate = v;
        }
        if let Some(v) = dto.average_ticket {
            self.average_ticket = v;
        }
    }

    /// Validation: monetary and percentage fields never go negative
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Site name must not be empty".into());
        }
        if self.code.trim().is_empty() {
            return Err("Site code must not be empty".into());
        }
        if self.revenue_to_date < 0.0 {
            return Err("Revenue to date must not be negative".into());
        }
        if self.monthly_goal < 0.0 {
            return Err("Monthly goal must not be negative".into());
        }
        if self.retention_rate < 0.0 || self.nps_score < 0.0 || self.average_ticket < 0.0 {
            return Err("KPI fields must not be negative".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.metadata.touch();
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for site creation and CEO edits
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiteDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,

    #[serde(rename = "monthlyGoal")]
    pub monthly_goal: f64,

    #[serde(rename = "retentionRate")]
    pub retention_rate: Option<f64>,

    #[serde(rename = "averageTicket")]
    pub average_ticket: Option<f64>,
}
