// --- File: crates/bookify_config/src/lib.rs ---

pub mod models;

pub use models::*;

use config::{Config, ConfigError, Environment, File};
use std::sync::Once;

static DOTENV: Once = Once::new();

/// Loads `.env` once per process. Safe to call from every crate that needs
/// configuration; later calls are no-ops.
pub fn ensure_dotenv_loaded() {
    DOTENV.call_once(|| {
        dotenv::dotenv().ok();
    });
}

/// Loads the application configuration.
///
/// Sources are layered, later ones winning:
/// 1. `config/default` (toml/yaml/json, optional)
/// 2. `config/{RUN_ENV}` (optional)
/// 3. Environment variables prefixed with `APP`, `__` as section separator
///    (e.g. `APP_SERVER__PORT=8086`, `APP_DATABASE__URL=...`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "default".to_string());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}
