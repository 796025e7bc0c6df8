use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/vibra.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Minimal schema bootstrap: create required tables when they are missing.
///
/// Also runs against `sqlite::memory:` connections in tests.
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    if !table_exists(conn, "a001_site").await? {
        tracing::info!("Creating a001_site table");
        let create_site_table_sql = r#"
            CREATE TABLE a001_site (
                id TEXT PRIMARY KEY NOT NULL,
                code TEXT NOT NULL DEFAULT '',
                name TEXT NOT NULL,
                revenue_to_date REAL NOT NULL DEFAULT 0,
                monthly_goal REAL NOT NULL DEFAULT 0,
                retention_rate REAL NOT NULL DEFAULT 0,
                nps_score REAL NOT NULL DEFAULT 0,
                average_ticket REAL NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_site_table_sql.to_string(),
        ))
        .await?;
    }

    if !table_exists(conn, "a002_daily_report").await? {
        tracing::info!("Creating a002_daily_report table");
        // UNIQUE (site_id, report_date) rejects duplicate submissions for the
        // same day instead of double-counting revenue.
        let create_report_table_sql = r#"
            CREATE TABLE a002_daily_report (
                id TEXT PRIMARY KEY NOT NULL,
                site_id TEXT NOT NULL,
                leader_name TEXT NOT NULL,
                report_date TEXT NOT NULL,
                revenue REAL NOT NULL DEFAULT 0,
                new_members INTEGER NOT NULL DEFAULT 0,
                lost_members INTEGER NOT NULL DEFAULT 0,
                retention_rate REAL NOT NULL DEFAULT 0,
                satisfaction_score REAL NOT NULL DEFAULT 0,
                reflections TEXT,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0,
                UNIQUE (site_id, report_date)
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_report_table_sql.to_string(),
        ))
        .await?;
    }

    if !table_exists(conn, "a003_monthly_history").await? {
        tracing::info!("Creating a003_monthly_history table");
        // UNIQUE (site_id, year, month) backs the exactly-once archival
        // guarantee of the monthly rollover.
        let create_history_table_sql = r#"
            CREATE TABLE a003_monthly_history (
                id TEXT PRIMARY KEY NOT NULL,
                site_id TEXT NOT NULL,
                site_name TEXT NOT NULL,
                year INTEGER NOT NULL,
                month INTEGER NOT NULL,
                revenue REAL NOT NULL DEFAULT 0,
                retention_rate REAL NOT NULL DEFAULT 0,
                nps_score REAL NOT NULL DEFAULT 0,
                monthly_goal REAL NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0,
                UNIQUE (site_id, year, month)
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_history_table_sql.to_string(),
        ))
        .await?;
    }

    if !table_exists(conn, "a004_marketing_proposal").await? {
        tracing::info!("Creating a004_marketing_proposal table");
        let create_proposal_table_sql = r#"
            CREATE TABLE a004_marketing_proposal (
                id TEXT PRIMARY KEY NOT NULL,
                site_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                requested_budget REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'pending',
                decided_by TEXT,
                decided_at TEXT,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_proposal_table_sql.to_string(),
        ))
        .await?;
    }

    if !table_exists(conn, "sys_rollover_status").await? {
        tracing::info!("Creating sys_rollover_status table");
        // Single row keyed by a fixed id; last_reset_month is "YYYY-MM".
        let create_status_table_sql = r#"
            CREATE TABLE sys_rollover_status (
                id TEXT PRIMARY KEY NOT NULL,
                last_reset_month TEXT NOT NULL,
                updated_at TEXT
            );
        "#;
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_status_table_sql.to_string(),
        ))
        .await?;
    }

    Ok(())
}

async fn table_exists(conn: &DatabaseConnection, table: &str) -> anyhow::Result<bool> {
    let check = format!(
        "SELECT name FROM sqlite_master WHERE type='table' AND name='{}';",
        table
    );
    let rows = conn
        .query_all(Statement::from_string(DatabaseBackend::Sqlite, check))
        .await?;
    Ok(!rows.is_empty())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
