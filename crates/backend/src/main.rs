pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod shared;
pub mod system;
pub mod usecases;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use axum::{
        routing::{get, post},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::services::ServeDir;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("backend.log"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sqlx=warn,sea_orm=warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        let start = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = next.run(req).await;

        tracing::info!(
            "{} {} -> {} in {}ms",
            method,
            uri.path(),
            response.status().as_u16(),
            start.elapsed().as_millis()
        );
        response
    }

    let config = shared::config::load_config()?;

    shared::data::db::initialize_database(Some(&config.database.path)).await?;

    let provider = match &config.forecast.api_endpoint {
        Some(endpoint) => shared::forecast::openai_provider::OpenAiForecastProvider::new_with_endpoint(
            endpoint.clone(),
            config.forecast.api_key.clone(),
            config.forecast.model.clone(),
        ),
        None => shared::forecast::openai_provider::OpenAiForecastProvider::new(
            config.forecast.api_key.clone(),
            config.forecast.model.clone(),
        ),
    };
    shared::forecast::initialize(shared::forecast::cache::ForecastCache::new(
        Arc::new(provider),
        Arc::new(shared::forecast::types::InMemoryForecastStore::new()),
    ))?;

    shared::config::initialize(config)?;

    // Run the rollover check once at startup so a restart never skips a month
    // boundary, then keep checking hourly.
    match system::rollover::service::run_monthly_rollover().await {
        Ok(outcome) => tracing::info!("Startup rollover check: {:?}", outcome),
        Err(e) => tracing::error!("Startup rollover check failed: {:?}", e),
    }
    tokio::spawn(async {
        system::rollover::worker::RolloverWorker::new(3600)
            .run_loop()
            .await;
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Site handlers
        .route(
            "/api/site",
            get(handlers::a001_site::list_all).post(handlers::a001_site::upsert),
        )
        .route(
            "/api/site/:id",
            get(handlers::a001_site::get_by_id).delete(handlers::a001_site::delete),
        )
        .route("/api/site/sync-nps", post(handlers::a001_site::sync_nps))
        .route(
            "/api/site/testdata",
            post(handlers::a001_site::insert_test_data),
        )
        // A002 Daily report handlers
        .route("/api/daily_report", post(handlers::a002_daily_report::submit))
        .route(
            "/api/daily_report/site/:site_id",
            get(handlers::a002_daily_report::list_by_site),
        )
        // A003 Monthly history handlers
        .route(
            "/api/monthly_history/site/:site_id",
            get(handlers::a003_monthly_history::list_by_site),
        )
        .route(
            "/api/monthly_history/:year/:month",
            get(handlers::a003_monthly_history::list_by_month),
        )
        // A004 Marketing proposal handlers
        .route(
            "/api/marketing_proposal",
            get(handlers::a004_marketing_proposal::list_all)
                .post(handlers::a004_marketing_proposal::create),
        )
        .route(
            "/api/marketing_proposal/:id",
            get(handlers::a004_marketing_proposal::get_by_id)
                .delete(handlers::a004_marketing_proposal::delete),
        )
        .route(
            "/api/marketing_proposal/:id/decide",
            post(handlers::a004_marketing_proposal::decide),
        )
        // UseCase u100: sales forecast
        .route(
            "/api/u100/forecast/:site_id",
            get(handlers::u100_sales_forecast::get_forecast),
        )
        .route(
            "/api/u100/forecast/refresh-all",
            post(handlers::u100_sales_forecast::refresh_all),
        )
        // D400 CEO Summary Dashboard
        .route(
            "/api/d400/ceo_summary",
            get(handlers::d400_ceo_summary::get_ceo_summary),
        )
        // System rollover
        .route("/api/system/rollover/run", post(handlers::sys_rollover::run))
        .fallback_service(ServeDir::new("dist"))
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], 3000).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port 3000 is already in use. Please ensure no other process is using this port."
                );
            } else {
                tracing::error!("Failed to bind to port 3000. Error: {}", e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
