use chrono::{NaiveDate, Utc};
use contracts::domain::a002_daily_report::aggregate::{DailyReport, DailyReportId};
use contracts::domain::common::EntityMetadata;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

mod daily_report {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "a002_daily_report")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub site_id: String,
        pub leader_name: String,
        /// ISO date "YYYY-MM-DD"; lexical order equals chronological order
        pub report_date: String,
        pub revenue: f64,
        pub new_members: i32,
        pub lost_members: i32,
        pub retention_rate: f64,
        pub satisfaction_score: f64,
        pub reflections: Option<String>,
        pub is_deleted: bool,
        pub created_at: Option<chrono::DateTime<chrono::Utc>>,
        pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl From<daily_report::Model> for DailyReport {
    fn from(m: daily_report::Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let site_uuid = Uuid::parse_str(&m.site_id).unwrap_or_else(|_| Uuid::new_v4());
        let report_date = NaiveDate::parse_from_str(&m.report_date, "%Y-%m-%d")
            .unwrap_or_else(|_| Utc::now().date_naive());

        DailyReport {
            id: DailyReportId::new(uuid),
            site_id: site_uuid,
            leader_name: m.leader_name,
            report_date,
            revenue: m.revenue,
            new_members: m.new_members,
            lost_members: m.lost_members,
            retention_rate: m.retention_rate,
            satisfaction_score: m.satisfaction_score,
            reflections: m.reflections,
            metadata,
        }
    }
}

// ============================================================================
// Repository functions
// ============================================================================

/// Insert a report row. The UNIQUE (site_id, report_date) index makes a
/// duplicate submission fail here instead of double-counting revenue.
pub async fn insert<C: ConnectionTrait>(conn: &C, aggregate: &DailyReport) -> Result<(), DbErr> {
    let now = Utc::now();

    let active_model = daily_report::ActiveModel {
        id: Set(aggregate.to_string_id()),
        site_id: Set(aggregate.site_id.to_string()),
        leader_name: Set(aggregate.leader_name.clone()),
        report_date: Set(aggregate.report_date.format("%Y-%m-%d").to_string()),
        revenue: Set(aggregate.revenue),
        new_members: Set(aggregate.new_members),
        lost_members: Set(aggregate.lost_members),
        retention_rate: Set(aggregate.retention_rate),
        satisfaction_score: Set(aggregate.satisfaction_score),
        reflections: Set(aggregate.reflections.clone()),
        is_deleted: Set(false),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        version: Set(1),
    };

    active_model.insert(conn).await?;
    Ok(())
}

/// Reports for one site, newest first
pub async fn list_by_site<C: ConnectionTrait>(
    conn: &C,
    site_id: Uuid,
    limit: Option<u64>,
) -> Result<Vec<DailyReport>, DbErr> {
    let mut query = daily_report::Entity::find()
        .filter(daily_report::Column::IsDeleted.eq(false))
        .filter(daily_report::Column::SiteId.eq(site_id.to_string()))
        .order_by_desc(daily_report::Column::ReportDate);
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    let models = query.all(conn).await?;
    Ok(models.into_iter().map(|m| m.into()).collect())
}

/// Last `limit` daily revenue values for a site, most recent first.
/// Feeds the forecast provider.
pub async fn recent_revenues<C: ConnectionTrait>(
    conn: &C,
    site_id: Uuid,
    limit: u64,
) -> Result<Vec<f64>, DbErr> {
    let reports = list_by_site(conn, site_id, Some(limit)).await?;
    Ok(reports.into_iter().map(|r| r.revenue).collect())
}

pub async fn exists_for_date<C: ConnectionTrait>(
    conn: &C,
    site_id: Uuid,
    date: NaiveDate,
) -> Result<bool, DbErr> {
    let count = daily_report::Entity::find()
        .filter(daily_report::Column::IsDeleted.eq(false))
        .filter(daily_report::Column::SiteId.eq(site_id.to_string()))
        .filter(daily_report::Column::ReportDate.eq(date.format("%Y-%m-%d").to_string()))
        .count(conn)
        .await?;
    Ok(count > 0)
}
