use super::repository;
use crate::domain::{a001_site, a003_monthly_history};
use crate::shared::data::db::get_connection;
use chrono::{Datelike, NaiveDate, Utc};
use contracts::domain::a003_monthly_history::aggregate::MonthlyHistoryRecord;
use contracts::system::rollover::RolloverOutcome;
use sea_orm::{DatabaseConnection, TransactionTrait};

/// Run the rollover check against the wall clock
pub async fn run_monthly_rollover() -> anyhow::Result<RolloverOutcome> {
    run_monthly_rollover_if_due(get_connection(), Utc::now().date_naive()).await
}

/// Archive last month's KPIs and reset the running counters, once per month.
///
/// The whole step is one transaction: per-site history inserts, the counter
/// reset and the status advance commit together or not at all. The status
/// advance is a compare-and-swap on the stored month, so a second concurrent
/// invocation rolls back instead of archiving twice; the UNIQUE
/// (site_id, year, month) index on history is the second line of defense.
pub async fn run_monthly_rollover_if_due(
    db: &DatabaseConnection,
    reference_date: NaiveDate,
) -> anyhow::Result<RolloverOutcome> {
    let current_month = format!("{:04}-{:02}", reference_date.year(), reference_date.month());

    let stored = repository::get_last_reset_month(db).await?;

    let stored_month = match stored {
        None => {
            // First run ever: adopt the current month, archive nothing.
            if repository::insert_status(db, &current_month).await? {
                tracing::info!("Rollover status initialized at {}", current_month);
                return Ok(RolloverOutcome::Initialized);
            }
            // Another instance initialized between our read and insert.
            tracing::info!("Rollover status already initialized by a concurrent run");
            return Ok(RolloverOutcome::AlreadyCurrent);
        }
        Some(m) if m == current_month => return Ok(RolloverOutcome::AlreadyCurrent),
        Some(m) => m,
    };

    // "YYYY-MM" compares chronologically as a string. A stored month ahead of
    // the reference date means clock skew, which is never due.
    if stored_month.as_str() > current_month.as_str() {
        tracing::warn!(
            "Stored rollover month {} is ahead of reference {}, skipping",
            stored_month,
            current_month
        );
        return Ok(RolloverOutcome::AlreadyCurrent);
    }

    let (archived_year, archived_month_num) = parse_month_key(&stored_month)?;

    let txn = db.begin().await?;

    let sites = a001_site::repository::list_all(&txn).await?;
    for site in &sites {
        let record = MonthlyHistoryRecord::archive_from_site(site, archived_year, archived_month_num);
        a003_monthly_history::repository::insert(&txn, &record).await?;
    }

    a001_site::repository::reset_month_counters(&txn).await?;

    let advanced = repository::advance_month(&txn, &stored_month, &current_month).await?;
    if !advanced {
        txn.rollback().await?;
        tracing::warn!(
            "Rollover for {} lost the race to a concurrent run, rolled back",
            stored_month
        );
        return Ok(RolloverOutcome::AlreadyCurrent);
    }

    txn.commit().await?;

    tracing::info!(
        "Rollover committed: archived {} site(s) for {}, counters reset for {}",
        sites.len(),
        stored_month,
        current_month
    );

    Ok(RolloverOutcome::Completed {
        sites_archived: sites.len(),
        archived_month: stored_month,
    })
}

fn parse_month_key(key: &str) -> anyhow::Result<(i32, u32)> {
    let (year_str, month_str) = key
        .split_once('-')
        .ok_or_else(|| anyhow::anyhow!("Malformed month key: {}", key))?;
    let year: i32 = year_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Malformed month key: {}", key))?;
    let month: u32 = month_str
        .parse()
        .map_err(|_| anyhow::anyhow!("Malformed month key: {}", key))?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Malformed month key: {}", key);
    }
    Ok((year, month))
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

    async fn seed_site(
        db: &DatabaseConnection,
        code: &str,
        revenue: f64,
        goal: f64,
    ) -> uuid::Uuid {
        let mut site = Site::new_for_insert(code.into(), format!("Vibra {}", code), goal);
        site.revenue_to_date = revenue;
        site.retention_rate = 90.0;
        site.nps_score = 72.0;
        a001_site::repository::insert(db, &site).await.unwrap();
        site.id.value()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_first_run_initializes_without_archiving() {
        let db = test_db().await;
        seed_site(&db, "VIB-001", 50_000.0, 100_000.0).await;

        let outcome = run_monthly_rollover_if_due(&db, date(2025, 8, 15))
            .await
            .unwrap();
        assert_eq!(outcome, RolloverOutcome::Initialized);

        let count = a003_monthly_history::repository::count_for_month(&db, 2025, 8)
            .await
            .unwrap();
        assert_eq!(count, 0);

        // Counters untouched on first run.
        let sites = a001_site::repository::list_all(&db).await.unwrap();
        assert_eq!(sites[0].revenue_to_date, 50_000.0);
    }

    #[tokio::test]
    async fn test_losing_first_run_race_is_not_an_error() {
        let db = test_db().await;

        // The winner created the row; the loser's insert must not error out.
        assert!(repository::insert_status(&db, "2025-08").await.unwrap());
        assert!(!repository::insert_status(&db, "2025-08").await.unwrap());

        let outcome = run_monthly_rollover_if_due(&db, date(2025, 8, 15))
            .await
            .unwrap();
        assert_eq!(outcome, RolloverOutcome::AlreadyCurrent);

        let stored = repository::get_last_reset_month(&db).await.unwrap();
        assert_eq!(stored.as_deref(), Some("2025-08"));
    }

    #[tokio::test]
    async fn test_same_month_is_a_noop() {
        let db = test_db().await;
        seed_site(&db, "VIB-001", 50_000.0, 100_000.0).await;

        run_monthly_rollover_if_due(&db, date(2025, 8, 1))
            .await
            .unwrap();
        let outcome = run_monthly_rollover_if_due(&db, date(2025, 8, 31))
            .await
            .unwrap();
        assert_eq!(outcome, RolloverOutcome::AlreadyCurrent);
    }

    #[tokio::test]
    async fn test_due_rollover_archives_and_resets() {
        let db = test_db().await;
        let site_id = seed_site(&db, "VIB-001", 87_500.0, 100_000.0).await;
        seed_site(&db, "VIB-002", 42_000.0, 80_000.0).await;

        run_monthly_rollover_if_due(&db, date(2025, 8, 10))
            .await
            .unwrap();
        let outcome = run_monthly_rollover_if_due(&db, date(2025, 9, 1))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            RolloverOutcome::Completed {
                sites_archived: 2,
                archived_month: "2025-08".into(),
            }
        );

        let history = a003_monthly_history::repository::list_by_site(&db, site_id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].year, 2025);
        assert_eq!(history[0].month, 8);
        assert_eq!(history[0].revenue, 87_500.0);
        assert_eq!(history[0].monthly_goal, 100_000.0);

        // Counters zeroed, goal retained.
        let sites = a001_site::repository::list_all(&db).await.unwrap();
        for site in &sites {
            assert_eq!(site.revenue_to_date, 0.0);
            assert_eq!(site.retention_rate, 0.0);
            assert_eq!(site.nps_score, 0.0);
        }
        assert_eq!(sites[0].monthly_goal, 100_000.0);
    }

    #[tokio::test]
    async fn test_rollover_is_idempotent_within_target_month() {
        let db = test_db().await;
        seed_site(&db, "VIB-001", 60_000.0, 100_000.0).await;

        run_monthly_rollover_if_due(&db, date(2025, 8, 10))
            .await
            .unwrap();
        run_monthly_rollover_if_due(&db, date(2025, 9, 1))
            .await
            .unwrap();
        let again = run_monthly_rollover_if_due(&db, date(2025, 9, 2))
            .await
            .unwrap();
        assert_eq!(again, RolloverOutcome::AlreadyCurrent);

        let count = a003_monthly_history::repository::count_for_month(&db, 2025, 8)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_rollover_with_no_sites_still_advances() {
        let db = test_db().await;

        run_monthly_rollover_if_due(&db, date(2025, 8, 10))
            .await
            .unwrap();
        let outcome = run_monthly_rollover_if_due(&db, date(2025, 9, 1))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            RolloverOutcome::Completed {
                sites_archived: 0,
                archived_month: "2025-08".into(),
            }
        );

        let stored = repository::get_last_reset_month(&db).await.unwrap();
        assert_eq!(stored.as_deref(), Some("2025-09"));
    }

    #[tokio::test]
    async fn test_backwards_clock_is_never_due() {
        let db = test_db().await;
        seed_site(&db, "VIB-001", 25_000.0, 100_000.0).await;

        run_monthly_rollover_if_due(&db, date(2025, 9, 1))
            .await
            .unwrap();
        let outcome = run_monthly_rollover_if_due(&db, date(2025, 8, 31))
            .await
            .unwrap();
        assert_eq!(outcome, RolloverOutcome::AlreadyCurrent);

        // Nothing archived, counters untouched.
        let count = a003_monthly_history::repository::count_for_month(&db, 2025, 9)
            .await
            .unwrap();
        assert_eq!(count, 0);
        let sites = a001_site::repository::list_all(&db).await.unwrap();
        assert_eq!(sites[0].revenue_to_date, 25_000.0);
    }

    #[tokio::test]
    async fn test_year_boundary_archives_december() {
        let db = test_db().await;
        seed_site(&db, "VIB-001", 30_000.0, 100_000.0).await;

        run_monthly_rollover_if_due(&db, date(2025, 12, 5))
            .await
            .unwrap();
        let outcome = run_monthly_rollover_if_due(&db, date(2026, 1, 2))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            RolloverOutcome::Completed {
                sites_archived: 1,
                archived_month: "2025-12".into(),
            }
        );

        let december = a003_monthly_history::repository::list_by_month(&db, 2025, 12)
            .await
            .unwrap();
        assert_eq!(december.len(), 1);
    }
}
