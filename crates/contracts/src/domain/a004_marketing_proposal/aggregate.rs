use crate::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Unique identifier of a marketing proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketingProposalId(pub Uuid);

impl MarketingProposalId {
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

impl AggregateId for MarketingProposalId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(MarketingProposalId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProposalStatus::Pending),
            "approved" => Some(ProposalStatus::Approved),
            "rejected" => Some(ProposalStatus::Rejected),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Marketing proposal submitted by a site leader, decided by the CEO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingProposal {
    pub id: MarketingProposalId,
    #[serde(rename = "siteId")]
    pub site_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "requestedBudget")]
    pub requested_budget: f64,
    pub status: ProposalStatus,
    #[serde(rename = "decidedBy")]
    pub decided_by: Option<String>,
    #[serde(rename = "decidedAt")]
    pub decided_at: Option<chrono::DateTime<chrono::Utc>>,
    pub metadata: EntityMetadata,
}

impl MarketingProposal {
    pub fn new_for_insert(dto: MarketingProposalDto, site_id: Uuid) -> Self {
        Self {
            id: MarketingProposalId::new_v4(),
            site_id,
            title: dto.title,
            description: dto.description,
            requested_budget: dto.requested_budget,
            status: ProposalStatus::Pending,
            decided_by: None,
            decided_at: None,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title must not be empty".into());
        }
        if self.requested_budget < 0.0 {
            return Err("Requested budget must not be negative".into());
        }
        Ok(())
    }

    /// Record a CEO decision. Pending proposals only.
    pub fn decide(&mut self, approved: bool, decided_by: String) -> Result<(), String> {
        if self.status != ProposalStatus::Pending {
            return Err("Proposal has already been decided".into());
        }
        self.status = if approved {
            ProposalStatus::Approved
        } else {
            ProposalStatus::Rejected
        };
        self.decided_by = Some(decided_by);
        self.decided_at = Some(chrono::Utc::now());
        self.metadata.touch();
        Ok(())
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO for proposal creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingProposalDto {
    #[serde(rename = "siteId")]
    pub site_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "requestedBudget")]
    pub requested_budget: f64,
}

/// DTO for a CEO decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalDecisionDto {
    pub approved: bool,
    #[serde(rename = "decidedBy")]
    pub decided_by: String,
}
