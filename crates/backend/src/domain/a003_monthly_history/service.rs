use super::repository;
use crate::shared::data::db::get_connection;
use contracts::domain::a003_monthly_history::aggregate::MonthlyHistoryRecord;
use uuid::Uuid;

pub async fn list_by_site(site_id: Uuid) -> anyhow::Result<Vec<MonthlyHistoryRecord>> {
    Ok(repository::list_by_site(get_connection(), site_id).await?)
}

pub async fn list_by_month(year: i32, month: u32) -> anyhow::Result<Vec<MonthlyHistoryRecord>> {
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month must be between 1 and 12");
    }
    Ok(repository::list_by_month(get_connection(), year, month).await?)
}
