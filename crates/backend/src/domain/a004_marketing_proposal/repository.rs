use chrono::Utc;
use contracts::domain::a004_marketing_proposal::aggregate::{
    MarketingProposal, MarketingProposalId, ProposalStatus,
};
use contracts::domain::common::EntityMetadata;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

mod marketing_proposal {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a004_marketing_proposal")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub site_id: String,
        pub title: String,
        pub description: String,
        pub requested_budget: f64,
        pub status: String,
        pub decided_by: Option<String>,
        pub decided_at: Option<chrono::DateTime<chrono::Utc>>,
        pub is_deleted: bool,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<marketing_proposal::Model> for MarketingProposal {
    fn from(m: marketing_proposal::Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let site_uuid = Uuid::parse_str(&m.site_id).unwrap_or_else(|_| Uuid::new_v4());
        let status = ProposalStatus::from_str(&m.status).unwrap_or(ProposalStatus::Pending);

        MarketingProposal {
            id: MarketingProposalId::new(uuid),
            site_id: site_uuid,
            title: m.title,
            description: m.description,
            requested_budget: m.requested_budget,
            status,
            decided_by: m.decided_by,
            decided_at: m.decided_at,
            metadata,
        }
    }
}

// ============================================================================
// Repository functions
// ============================================================================

pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<MarketingProposal>, DbErr> {
    let models = marketing_proposal::Entity::find()
        .filter(marketing_proposal::Column::IsDeleted.eq(false))
        .order_by_desc(marketing_proposal::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(|m| m.into()).collect())
}

pub async fn list_pending<C: ConnectionTrait>(conn: &C) -> Result<Vec<MarketingProposal>, DbErr> {
    let models = marketing_proposal::Entity::find()
        .filter(marketing_proposal::Column::IsDeleted.eq(false))
        .filter(marketing_proposal::Column::Status.eq(ProposalStatus::Pending.as_str()))
        .order_by_desc(marketing_proposal::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(|m| m.into()).collect())
}

pub async fn get_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<MarketingProposal>, DbErr> {
    let model = marketing_proposal::Entity::find_by_id(id.to_string())
        .one(conn)
        .await?;
    Ok(model.filter(|m| !m.is_deleted).map(|m| m.into()))
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    aggregate: &MarketingProposal,
) -> Result<(), DbErr> {
    let now = Utc::now();

    let active_model = marketing_proposal::ActiveModel {
        id: Set(aggregate.to_string_id()),
        site_id: Set(aggregate.site_id.to_string()),
        title: Set(aggregate.title.clone()),
        description: Set(aggregate.description.clone()),
        requested_budget: Set(aggregate.requested_budget),
        status: Set(aggregate.status.as_str().to_string()),
        decided_by: Set(aggregate.decided_by.clone()),
        decided_at: Set(aggregate.decided_at),
        is_deleted: Set(false),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        version: Set(1),
    };

    active_model.insert(conn).await?;
    Ok(())
}

pub async fn update<C: ConnectionTrait>(
    conn: &C,
    aggregate: &MarketingProposal,
) -> Result<(), DbErr> {
    let active_model = marketing_proposal::ActiveModel {
        id: Set(aggregate.to_string_id()),
        site_id: Set(aggregate.site_id.to_string()),
        title: Set(aggregate.title.clone()),
        description: Set(aggregate.description.clone()),
        requested_budget: Set(aggregate.requested_budget),
        status: Set(aggregate.status.as_str().to_string()),
        decided_by: Set(aggregate.decided_by.clone()),
        decided_at: Set(aggregate.decided_at),
        is_deleted: Set(aggregate.metadata.is_deleted),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(Utc::now())),
        version: Set(aggregate.metadata.version + 1),
    };

    marketing_proposal::Entity::update(active_model)
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn soft_delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = marketing_proposal::Entity::update_many()
        .col_expr(marketing_proposal::Column::IsDeleted, Expr::value(true))
        .col_expr(marketing_proposal::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(marketing_proposal::Column::Id.eq(id.to_string()))
        .filter(marketing_proposal::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}
