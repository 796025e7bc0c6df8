use super::repository;
use crate::domain::a001_site;
use crate::shared::data::db::get_connection;
use contracts::domain::a002_daily_report::aggregate::{DailyReport, DailyReportDto};
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

/// Submit a daily report (site leader action).
///
/// The report insert and the site revenue accumulation commit in one
/// transaction: either both land or neither does.
pub async fn submit(dto: DailyReportDto) -> anyhow::Result<Uuid> {
    submit_with_conn(get_connection(), dto).await
}

pub async fn submit_with_conn(
    db: &DatabaseConnection,
    dto: DailyReportDto,
) -> anyhow::Result<Uuid> {
    let site_id = Uuid::parse_str(&dto.site_id)
        .map_err(|_| anyhow::anyhow!("Invalid site ID: {}", dto.site_id))?;

    a001_site::repository::get_by_id(db, site_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Site not found"))?;

    let aggregate = DailyReport::new_for_insert(dto, site_id);
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    if repository::exists_for_date(db, site_id, aggregate.report_date).await? {
        anyhow::bail!(
            "A report for site {} on {} has already been submitted",
            site_id,
            aggregate.report_date
        );
    }

    let txn = db.begin().await?;

    repository::insert(&txn, &aggregate).await.map_err(|e| {
        // The unique index also stops a race the exists check missed.
        anyhow::anyhow!("Failed to insert daily report: {}", e)
    })?;

    let applied = a001_site::repository::apply_daily_report(
        &txn,
        site_id,
        aggregate.revenue,
        aggregate.retention_rate,
    )
    .await?;
    if !applied {
        txn.rollback().await?;
        anyhow::bail!("Site disappeared while submitting the report");
    }

    txn.commit().await?;

    tracing::info!(
        "Daily report {} for site {} on {} accepted (revenue {:.2})",
        aggregate.to_string_id(),
        site_id,
        aggregate.report_date,
        aggregate.revenue
    );

    Ok(aggregate.id.value())
}

pub async fn list_by_site(site_id: Uuid, limit: Option<u64>) -> anyhow::Result<Vec<DailyReport>> {
    Ok(repository::list_by_site(get_connection(), site_id, limit).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::bootstrap_schema;
    use chrono::NaiveDate;
    use contracts::domain::a001_site::aggregate::Site;
    use sea_orm::Database;

    async fn test_db() -> DatabaseConnection {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_schema(&conn).await.unwrap();
        conn
    }

    async fn seed_site(db: &DatabaseConnection, goal: f64) -> Uuid {
        let site = Site::new_for_insert("VIB-001".into(), "Vibra Moema".into(), goal);
        a001_site::repository::insert(db, &site).await.unwrap();
        site.id.value()
    }

    fn dto(site_id: Uuid, date: NaiveDate, revenue: f64) -> DailyReportDto {
        DailyReportDto {
            site_id: site_id.to_string(),
            leader_name: "Ana".into(),
            report_date: date,
            revenue,
            new_members: 3,
            lost_members: 1,
            retention_rate: 91.5,
            satisfaction_score: 8.0,
            reflections: None,
        }
    }

    #[tokio::test]
    async fn test_submit_accumulates_revenue_atomically() {
        let db = test_db().await;
        let site_id = seed_site(&db, 100_000.0).await;
        let d1 = NaiveDate::from_ymd_opt(2025, 8, 20).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 8, 21).unwrap();

        submit_with_conn(&db, dto(site_id, d1, 1500.0)).await.unwrap();
        submit_with_conn(&db, dto(site_id, d2, 2200.0)).await.unwrap();

        let site = a001_site::repository::get_by_id(&db, site_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(site.revenue_to_date, 3700.0);
        assert_eq!(site.retention_rate, 91.5);
    }

    #[tokio::test]
    async fn test_duplicate_date_is_rejected() {
        let db = test_db().await;
        let site_id = seed_site(&db, 100_000.0).await;
        let date = NaiveDate::from_ymd_opt(2025, 8, 20).unwrap();

        submit_with_conn(&db, dto(site_id, date, 1500.0)).await.unwrap();
        let second = submit_with_conn(&db, dto(site_id, date, 999.0)).await;
        assert!(second.is_err());

        // Revenue must not be double-counted.
        let site = a001_site::repository::get_by_id(&db, site_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(site.revenue_to_date, 1500.0);
    }

    #[tokio::test]
    async fn test_unknown_site_is_rejected() {
        let db = test_db().await;
        let date = NaiveDate::from_ymd_opt(2025, 8, 20).unwrap();
        let result = submit_with_conn(&db, dto(Uuid::new_v4(), date, 100.0)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_recent_revenues_most_recent_first() {
        let db = test_db().await;
        let site_id = seed_site(&db, 100_000.0).await;
        for (day, revenue) in [(10u32, 100.0), (11, 200.0), (12, 300.0)] {
            let date = NaiveDate::from_ymd_opt(2025, 8, day).unwrap();
            submit_with_conn(&db, dto(site_id, date, revenue)).await.unwrap();
        }

        let revenues = repository::recent_revenues(&db, site_id, 7).await.unwrap();
        assert_eq!(revenues, vec![300.0, 200.0, 100.0]);
    }
}
