use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Defaults mirror the settings-store fallbacks so an empty config file
/// still yields a working system.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_base_price")]
    pub base_ticket_price_cents: i64,
    #[serde(default = "default_vip_days")]
    pub vip_advance_booking_days: i64,
    #[serde(default = "default_regular_days")]
    pub regular_advance_booking_days: i64,
    /// English weekday name, e.g. "Wednesday". Unset disables the
    /// weekday-based Halk Günü trigger.
    #[serde(default)]
    pub halk_gunu_day: Option<String>,
    #[serde(default = "default_hold_ttl")]
    pub hold_default_ttl_seconds: i64,
    #[serde(default = "default_heartbeat")]
    pub hold_heartbeat_extend_seconds: i64,
    #[serde(default = "default_max_extend")]
    pub hold_max_extend_minutes: i64,
    /// Minutes before start when reservations close. Unset keeps the
    /// cutoff disabled.
    #[serde(default)]
    pub reservation_cutoff_minutes: Option<i64>,
}

fn default_base_price() -> i64 {
    10_000
}
fn default_vip_days() -> i64 {
    7
}
fn default_regular_days() -> i64 {
    2
}
fn default_hold_ttl() -> i64 {
    120
}
fn default_heartbeat() -> i64 {
    120
}
fn default_max_extend() -> i64 {
    10
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            base_ticket_price_cents: default_base_price(),
            vip_advance_booking_days: default_vip_days(),
            regular_advance_booking_days: default_regular_days(),
            halk_gunu_day: None,
            hold_default_ttl_seconds: default_hold_ttl(),
            hold_heartbeat_extend_seconds: default_heartbeat(),
            hold_max_extend_minutes: default_max_extend(),
            reservation_cutoff_minutes: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // CINETIX__SERVER__PORT=8080 style overrides
            .add_source(config::Environment::with_prefix("CINETIX").separator("__"))
            .set_default("server.port", 8080)?
            .build()?;

        s.try_deserialize()
    }
}
