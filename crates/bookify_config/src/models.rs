// --- File: crates/bookify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via APP_DATABASE__URL or DATABASE_URL
}

// --- Scheduling Config ---
// The business-hours policy is a single named value consumed by every call
// path; per-field overrides win over the named preset.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SchedulingConfig {
    /// Named business-hours preset: "office_hours" (09:00-18:00 Mon-Fri)
    /// or "extended_hours" (10:00-22:00 Mon-Sat).
    pub policy: Option<String>,
    /// Overrides the preset's opening time, "HH:MM".
    pub work_start_time: Option<String>,
    /// Overrides the preset's closing time, "HH:MM".
    pub work_end_time: Option<String>,
    /// Overrides the preset's working days ("Mon".."Sun").
    pub working_days: Option<Vec<String>>,
    /// Slot granularity in minutes.
    pub slot_step_minutes: Option<u16>,
    /// Appointment duration used when the caller does not supply one.
    pub default_duration_minutes: Option<i64>,
    /// How many days ahead to scan for alternatives after a conflict.
    pub search_window_days: Option<i64>,
    /// Cap on alternatives returned with a conflict.
    pub max_alternatives: Option<usize>,
    /// Cap on alternatives collected per scanned day.
    pub alternatives_per_day: Option<usize>,
    /// Hours-of-day that rank ahead of the rest when suggesting times.
    pub preferred_hours: Option<Vec<u32>>,
}

// --- Notification Config ---
// Holds non-secret endpoints for the mail gateway and the calendar mirror.
// Gateway credentials are loaded directly from env vars.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct NotifyConfig {
    pub mail_gateway_url: Option<String>,
    pub calendar_webhook_url: Option<String>,
    pub timeout_secs: Option<u64>,
    // Secret loaded directly from env var: NOTIFY_GATEWAY_TOKEN
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_notify: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub scheduling: Option<SchedulingConfig>,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}
