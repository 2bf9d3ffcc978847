use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use cinetix_core::settings::keys;
use cinetix_core::{CoreError, CoreResult, SettingsReader};

use crate::app_config::BusinessRules;

/// Settings backed by the loaded configuration file. Read-only at runtime.
pub struct ConfigSettings {
    rules: BusinessRules,
}

impl ConfigSettings {
    pub fn new(rules: BusinessRules) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl SettingsReader for ConfigSettings {
    async fn get_int(&self, key: &str) -> CoreResult<Option<i64>> {
        let value = match key {
            keys::VIP_ADVANCE_BOOKING_DAYS => Some(self.rules.vip_advance_booking_days),
            keys::REGULAR_ADVANCE_BOOKING_DAYS => Some(self.rules.regular_advance_booking_days),
            keys::HOLD_DEFAULT_TTL_SECONDS => Some(self.rules.hold_default_ttl_seconds),
            keys::HOLD_HEARTBEAT_EXTEND_SECONDS => Some(self.rules.hold_heartbeat_extend_seconds),
            keys::HOLD_MAX_EXTEND_MINUTES => Some(self.rules.hold_max_extend_minutes),
            keys::RESERVATION_CUTOFF_MINUTES => self.rules.reservation_cutoff_minutes,
            _ => None,
        };
        Ok(value)
    }

    async fn get_cents(&self, key: &str) -> CoreResult<Option<i64>> {
        Ok(match key {
            keys::BASE_TICKET_PRICE => Some(self.rules.base_ticket_price_cents),
            _ => None,
        })
    }

    async fn get_string(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(match key {
            keys::HALK_GUNU => self.rules.halk_gunu_day.clone(),
            _ => None,
        })
    }
}

/// Mutable key/value settings for tests and seeding.
#[derive(Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.into());
    }

    pub fn unset(&self, key: &str) {
        self.values.write().unwrap().remove(key);
    }
}

#[async_trait]
impl SettingsReader for MemorySettings {
    async fn get_int(&self, key: &str) -> CoreResult<Option<i64>> {
        match self.values.read().unwrap().get(key) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| CoreError::internal(format!("setting {key} is not an integer"))),
            None => Ok(None),
        }
    }

    async fn get_cents(&self, key: &str) -> CoreResult<Option<i64>> {
        self.get_int(key).await
    }

    async fn get_string(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.values.read().unwrap().get(key).cloned())
    }
}
