use once_cell::sync::OnceCell;
use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// Install the process-wide configuration (once, at startup)
pub fn initialize(config: Config) -> anyhow::Result<()> {
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Configuration already initialized"))
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub nps: NpsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Settings for the external forecast provider (OpenAI-compatible API)
#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_forecast_model")]
    pub model: String,
}

/// Settings for the per-site NPS spreadsheet read
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NpsConfig {
    /// URL of the published spreadsheet in CSV form
    #[serde(default)]
    pub sheet_url: String,
}

fn default_forecast_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/vibra.db"

[forecast]
api_key = ""
model = "gpt-4o-mini"

[nps]
sheet_url = ""
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}
