use super::repository;
use crate::shared::data::db::get_connection;
use contracts::domain::a001_site::aggregate::{Site, SiteDto};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Create a new site (CEO action)
pub async fn create(dto: SiteDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("VIB-{}", Uuid::new_v4()));
    let mut aggregate = Site::new_for_insert(code, dto.name.clone(), dto.monthly_goal);
    if let Some(v) = dto.retention_rate {
        aggregate.retention_rate = v;
    }
    if let Some(v) = dto.average_ticket {
        aggregate.average_ticket = v;
    }

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    aggregate.before_write();

    repository::insert(get_connection(), &aggregate).await?;
    Ok(aggregate.id.value())
}

/// CEO edit of name, code, goal or manual KPI values. Returns the site id.
pub async fn update(dto: SiteDto) -> anyhow::Result<Uuid> {
    update_with_conn(get_connection(), dto).await
}

pub async fn update_with_conn(db: &DatabaseConnection, dto: SiteDto) -> anyhow::Result<Uuid> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| anyhow::anyhow!("Invalid ID"))?;

    let mut aggregate = repository::get_by_id(db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Not found"))?;

    aggregate.update(&dto);

    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    aggregate.before_write();

    repository::update(db, &aggregate).await?;
    Ok(id)
}

/// Soft delete; sites are never hard-deleted
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    Ok(repository::soft_delete(get_connection(), id).await?)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Site>> {
    Ok(repository::get_by_id(get_connection(), id).await?)
}

pub async fn list_all() -> anyhow::Result<Vec<Site>> {
    Ok(repository::list_all(get_connection()).await?)
}

/// Pull current NPS values from the published spreadsheet and write them onto
/// the matching sites. Returns how many sites were updated.
pub async fn sync_nps_from_sheet() -> anyhow::Result<usize> {
    let sheet_url = &crate::shared::config::get_config().nps.sheet_url;
    let scores = crate::shared::nps::fetch_nps_by_site_code(sheet_url).await?;

    let db = get_connection();
    let mut updated = 0;
    for (code, nps) in scores {
        if repository::set_nps_by_code(db, &code, nps).await? {
            updated += 1;
        } else {
            tracing::warn!("NPS sheet row for unknown site code {}", code);
        }
    }

    tracing::info!("NPS sync updated {} site(s)", updated);
    Ok(updated)
}

/// Seed a few demo sites
pub async fn insert_test_data() -> anyhow::Result<()> {
    let data = vec![
        ("VIB-001", "Vibra Moema", 450_000.0),
        ("VIB-002", "Vibra Pinheiros", 380_000.0),
        ("VIB-003", "Vibra Santana", 290_000.0),
    ];

    for (code, name, goal) in data {
        let mut aggregate = Site::new_for_insert(code.to_string(), name.to_string(), goal);
        aggregate.before_write();
        repository::insert(get_connection(), &aggregate).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::bootstrap_schema;
    use sea_orm::Database;

    async fn test_db() -> DatabaseConnection {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_schema(&conn).await.unwrap();
        conn
    }

    async fn seed_site(db: &DatabaseConnection, code: &str, goal: f64) -> Uuid {
        let site = Site::new_for_insert(code.into(), format!("Vibra {}", code), goal);
        repository::insert(db, &site).await.unwrap();
        site.id.value()
    }

    #[tokio::test]
    async fn test_update_returns_the_edited_site_id() {
        let db = test_db().await;
        let site_id = seed_site(&db, "VIB-001", 100_000.0).await;

        let dto = SiteDto {
            id: Some(site_id.to_string()),
            code: None,
            name: "Vibra Moema".into(),
            monthly_goal: 120_000.0,
            retention_rate: None,
            average_ticket: None,
        };
        let returned = update_with_conn(&db, dto).await.unwrap();
        assert_eq!(returned, site_id);

        let site = repository::get_by_id(&db, site_id).await.unwrap().unwrap();
        assert_eq!(site.name, "Vibra Moema");
        assert_eq!(site.monthly_goal, 120_000.0);
    }

    #[tokio::test]
    async fn test_update_unknown_site_fails() {
        let db = test_db().await;

        let dto = SiteDto {
            id: Some(Uuid::new_v4().to_string()),
            name: "Vibra Nowhere".into(),
            monthly_goal: 50_000.0,
            ..Default::default()
        };
        assert!(update_with_conn(&db, dto).await.is_err());
    }
}
