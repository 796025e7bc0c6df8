use super::repository;
use crate::domain::a001_site;
use crate::shared::data::db::get_connection;
use contracts::domain::a004_marketing_proposal::aggregate::{
    MarketingProposal, MarketingProposalDto, ProposalDecisionDto,
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

pub async fn create(dto: MarketingProposalDto) -> anyhow::Result<Uuid> {
    create_with_conn(get_connection(), dto).await
}

pub async fn create_with_conn(
    db: &DatabaseConnection,
    dto: MarketingProposalDto,
) -> anyhow::Result<Uuid> {
    let site_id = Uuid::parse_str(&dto.site_id)
        .map_err(|_| anyhow::anyhow!("Invalid site ID: {}", dto.site_id))?;

    a001_site::repository::get_by_id(db, site_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Site not found"))?;

    let aggregate = MarketingProposal::new_for_insert(dto, site_id);
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    repository::insert(db, &aggregate).await?;

    tracing::info!(
        "Marketing proposal {} created for site {} ({})",
        aggregate.to_string_id(),
        site_id,
        aggregate.title
    );

    Ok(aggregate.id.value())
}

pub async fn list_all() -> anyhow::Result<Vec<MarketingProposal>> {
    Ok(repository::list_all(get_connection()).await?)
}

pub async fn list_pending() -> anyhow::Result<Vec<MarketingProposal>> {
    Ok(repository::list_pending(get_connection()).await?)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<MarketingProposal>> {
    Ok(repository::get_by_id(get_connection(), id).await?)
}

/// Apply a CEO decision to a pending proposal
pub async fn decide(id: Uuid, dto: ProposalDecisionDto) -> anyhow::Result<MarketingProposal> {
    decide_with_conn(get_connection(), id, dto).await
}

pub async fn decide_with_conn(
    db: &DatabaseConnection,
    id: Uuid,
    dto: ProposalDecisionDto,
) -> anyhow::Result<MarketingProposal> {
    let mut proposal = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Proposal not found"))?;

    proposal
        .decide(dto.approved, dto.decided_by)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    repository::update(db, &proposal).await?;

    tracing::info!(
        "Marketing proposal {} {}",
        proposal.to_string_id(),
        proposal.status.as_str()
    );

    Ok(proposal)
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    Ok(repository::soft_delete(get_connection(), id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::bootstrap_schema;
    use contracts::domain::a001_site::aggregate::Site;
    use sea_orm::Database;

    async fn test_db() -> DatabaseConnection {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_schema(&conn).await.unwrap();
        conn
    }

    async fn seed_site(db: &DatabaseConnection) -> Uuid {
        let site = Site::new_for_insert("VIB-001".into(), "Vibra Moema".into(), 100_000.0);
        a001_site::repository::insert(db, &site).await.unwrap();
        site.id.value()
    }

    fn dto(site_id: Uuid) -> MarketingProposalDto {
        MarketingProposalDto {
            site_id: site_id.to_string(),
            title: "Instagram campaign".into(),
            description: "Boost lead generation for the winter promo".into(),
            requested_budget: 5000.0,
        }
    }

    #[tokio::test]
    async fn test_create_and_approve() {
        let db = test_db().await;
        let site_id = seed_site(&db).await;

        let id = create_with_conn(&db, dto(site_id)).await.unwrap();
        let decision = ProposalDecisionDto {
            approved: true,
            decided_by: "Carla".into(),
        };
        let decided = decide_with_conn(&db, id, decision).await.unwrap();

        assert_eq!(decided.status.as_str(), "approved");
        assert_eq!(decided.decided_by.as_deref(), Some("Carla"));
        assert!(decided.decided_at.is_some());
    }

    #[tokio::test]
    async fn test_double_decision_is_rejected() {
        let db = test_db().await;
        let site_id = seed_site(&db).await;
        let id = create_with_conn(&db, dto(site_id)).await.unwrap();

        let approve = ProposalDecisionDto {
            approved: true,
            decided_by: "Carla".into(),
        };
        decide_with_conn(&db, id, approve).await.unwrap();

        let reject = ProposalDecisionDto {
            approved: false,
            decided_by: "Carla".into(),
        };
        let second = decide_with_conn(&db, id, reject).await;
        assert!(second.is_err());

        // The first decision must survive.
        let stored = repository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(stored.status.as_str(), "approved");
    }

    #[tokio::test]
    async fn test_create_requires_existing_site() {
        let db = test_db().await;
        let result = create_with_conn(&db, dto(Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_pending_list_shrinks_after_decision() {
        let db = test_db().await;
        let site_id = seed_site(&db).await;
        let id = create_with_conn(&db, dto(site_id)).await.unwrap();
        create_with_conn(&db, dto(site_id)).await.unwrap();

        assert_eq!(repository::list_pending(&db).await.unwrap().len(), 2);

        let decision = ProposalDecisionDto {
            approved: false,
            decided_by: "Carla".into(),
        };
        decide_with_conn(&db, id, decision).await.unwrap();

        assert_eq!(repository::list_pending(&db).await.unwrap().len(), 1);
        assert_eq!(repository::list_all(&db).await.unwrap().len(), 2);
    }
}
