//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `MERCATO__*` environment variables
//! (e.g. `MERCATO__SERVER__PORT=3000`).
use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// Platform defaults seeded into the database the first time the service
/// starts. Later changes go through the admin API or `mercato_admin`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub max_debt_minor: i64,
    pub service_charge_bps: i64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            max_debt_minor: 5_000,
            service_charge_bps: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub ledger: Ledger,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("MERCATO")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}
