use chrono::Utc;
use contracts::domain::a003_monthly_history::aggregate::{MonthlyHistoryId, MonthlyHistoryRecord};
use contracts::domain::common::EntityMetadata;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

mod monthly_history {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a003_monthly_history")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub site_id: String,
        pub site_name: String,
        pub year: i32,
        pub month: i32,
        pub revenue: f64,
        pub retention_rate: f64,
        pub nps_score: f64,
        pub monthly_goal: f64,
        pub is_deleted: bool,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<monthly_history::Model> for MonthlyHistoryRecord {
    fn from(m: monthly_history::Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let site_uuid = Uuid::parse_str(&m.site_id).unwrap_or_else(|_| Uuid::new_v4());

        MonthlyHistoryRecord {
            id: MonthlyHistoryId::new(uuid),
            site_id: site_uuid,
            site_name: m.site_name,
            year: m.year,
            month: m.month as u32,
            revenue: m.revenue,
            retention_rate: m.retention_rate,
            nps_score: m.nps_score,
            monthly_goal: m.monthly_goal,
            metadata,
        }
    }
}

// ============================================================================
// Repository functions
// ============================================================================

/// Insert one archived record. The UNIQUE (site_id, year, month) index turns
/// a double archival into a constraint violation that aborts the enclosing
/// rollover transaction.
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    record: &MonthlyHistoryRecord,
) -> Result<(), DbErr> {
    let now = Utc::now();

    let active_model = monthly_history::ActiveModel {
        id: Set(record.to_string_id()),
        site_id: Set(record.site_id.to_string()),
        site_name: Set(record.site_name.clone()),
        year: Set(record.year),
        month: Set(record.month as i32),
        revenue: Set(record.revenue),
        retention_rate: Set(record.retention_rate),
        nps_score: Set(record.nps_score),
        monthly_goal: Set(record.monthly_goal),
        is_deleted: Set(false),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        version: Set(1),
    };

    active_model.insert(conn).await?;
    Ok(())
}

/// History of one site, newest month first
pub async fn list_by_site<C: ConnectionTrait>(
    conn: &C,
    site_id: Uuid,
) -> Result<Vec<MonthlyHistoryRecord>, DbErr> {
    let models = monthly_history::Entity::find()
        .filter(monthly_history::Column::IsDeleted.eq(false))
        .filter(monthly_history::Column::SiteId.eq(site_id.to_string()))
        .order_by_desc(monthly_history::Column::Year)
        .order_by_desc(monthly_history::Column::Month)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(|m| m.into()).collect())
}

/// All sites for one archived month
pub async fn list_by_month<C: ConnectionTrait>(
    conn: &C,
    year: i32,
    month: u32,
) -> Result<Vec<MonthlyHistoryRecord>, DbErr> {
    let models = monthly_history::Entity::find()
        .filter(monthly_history::Column::IsDeleted.eq(false))
        .filter(monthly_history::Column::Year.eq(year))
        .filter(monthly_history::Column::Month.eq(month as i32))
        .order_by_asc(monthly_history::Column::SiteName)
        .all(conn)
        .await?;

    Ok(models.into_iter().map(|m| m.into()).collect())
}

pub async fn count_for_month<C: ConnectionTrait>(
    conn: &C,
    year: i32,
    month: u32,
) -> Result<u64, DbErr> {
    monthly_history::Entity::find()
        .filter(monthly_history::Column::Year.eq(year))
        .filter(monthly_history::Column::Month.eq(month as i32))
        .count(conn)
        .await
}
