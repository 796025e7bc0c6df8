use chrono::Utc;
use contracts::domain::a001_site::aggregate::{Site, SiteId};
use contracts::domain::common::EntityMetadata;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::prelude::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

pub(crate) mod site {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a001_site")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub code: String,
        pub name: String,
        pub revenue_to_date: f64,
        pub monthly_goal: f64,
        pub retention_rate: f64,
        pub nps_score: f64,
        pub average_ticket: f64,
        pub is_deleted: bool,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<site::Model> for Site {
    fn from(m: site::Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Site {
            id: SiteId::new(uuid),
            code: m.code,
            name: m.name,
            revenue_to_date: m.revenue_to_date,
            monthly_goal: m.monthly_goal,
            retention_rate: m.retention_rate,
            nps_score: m.nps_score,
            average_ticket: m.average_ticket,
            metadata,
        }
    }
}

// ============================================================================
// Repository functions
// ============================================================================

/// All live sites, ordered by business code
pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Site>, DbErr> {
    let models = site::Entity::find()
        .filter(site::Column::IsDeleted.eq(false))
        .order_by_asc(site::Column::Code)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(|m| m.into()).collect())
}

pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<Site>, DbErr> {
    let model = site::Entity::find_by_id(id.to_string()).one(conn).await?;
    Ok(model.filter(|m| !m.is_deleted).map(|m| m.into()))
}

pub async fn insert<C: ConnectionTrait>(conn: &C, aggregate: &Site) -> Result<(), DbErr> {
    let now = Utc::now();

    let active_model = site::ActiveModel {
        id: Set(aggregate.to_string_id()),
        code: Set(aggregate.code.clone()),
        name: Set(aggregate.name.clone()),
        revenue_to_date: Set(aggregate.revenue_to_date),
        monthly_goal: Set(aggregate.monthly_goal),
        retention_rate: Set(aggregate.retention_rate),
        nps_score: Set(aggregate.nps_score),
        average_ticket: Set(aggregate.average_ticket),
        is_deleted: Set(false),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        version: Set(1),
    };

    active_model.insert(conn).await?;
    Ok(())
}

pub async fn update<C: ConnectionTrait>(conn: &C, aggregate: &Site) -> Result<(), DbErr> {
    let active_model = site::ActiveModel {
        id: Set(aggregate.to_string_id()),
        code: Set(aggregate.code.clone()),
        name: Set(aggregate.name.clone()),
        revenue_to_date: Set(aggregate.revenue_to_date),
        monthly_goal: Set(aggregate.monthly_goal),
        retention_rate: Set(aggregate.retention_rate),
        nps_score: Set(aggregate.nps_score),
        average_ticket: Set(aggregate.average_ticket),
        is_deleted: Set(aggregate.metadata.is_deleted),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(Utc::now())),
        version: Set(aggregate.metadata.version + 1),
    };

    site::Entity::update(active_model).exec(conn).await?;
    Ok(())
}

pub async fn soft_delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<bool, DbErr> {
    let result = site::Entity::update_many()
        .col_expr(site::Column::IsDeleted, Expr::value(true))
        .col_expr(site::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(site::Column::Id.eq(id.to_string()))
        .filter(site::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Apply a daily report to the owning site.
///
/// The revenue accumulation is an atomic read-modify-write expressed in SQL,
/// so two racing submissions can never produce a lost update. Runs inside the
/// same transaction as the report insert.
pub async fn apply_daily_report<C: ConnectionTrait>(
    conn: &C,
    site_id: Uuid,
    revenue_delta: f64,
    retention_rate: f64,
) -> Result<bool, DbErr> {
    let result = site::Entity::update_many()
        .col_expr(
            site::Column::RevenueToDate,
            Expr::col(site::Column::RevenueToDate).add(revenue_delta),
        )
        .col_expr(site::Column::RetentionRate, Expr::value(retention_rate))
        .col_expr(site::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(site::Column::Id.eq(site_id.to_string()))
        .filter(site::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Month rollover step 2: zero the running counters of every live site.
/// The monthly goal is retained.
pub async fn reset_month_counters<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let result = site::Entity::update_many()
        .col_expr(site::Column::RevenueToDate, Expr::value(0.0))
        .col_expr(site::Column::RetentionRate, Expr::value(0.0))
        .col_expr(site::Column::NpsScore, Expr::value(0.0))
        .col_expr(site::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(site::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Write an externally sourced NPS value, matched by business code
pub async fn set_nps_by_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    nps_score: f64,
) -> Result<bool, DbErr> {
    let result = site::Entity::update_many()
        .col_expr(site::Column::NpsScore, Expr::value(nps_score))
        .col_expr(site::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(site::Column::Code.eq(code))
        .filter(site::Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}
