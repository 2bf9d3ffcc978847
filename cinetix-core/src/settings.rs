use async_trait::async_trait;

use crate::CoreResult;

/// Whitelisted settings keys the core reads. Admin-side storage and the
/// whitelisting UI live outside the core.
pub mod keys {
    pub const VIP_ADVANCE_BOOKING_DAYS: &str = "VipAdvanceBookingDays";
    pub const REGULAR_ADVANCE_BOOKING_DAYS: &str = "RegularAdvanceBookingDays";
    pub const BASE_TICKET_PRICE: &str = "BaseTicketPrice";
    pub const HALK_GUNU: &str = "HalkGunu";
    pub const HOLD_DEFAULT_TTL_SECONDS: &str = "SeatHold:DefaultTtlSeconds";
    pub const HOLD_HEARTBEAT_EXTEND_SECONDS: &str = "SeatHold:HeartbeatExtendSeconds";
    pub const HOLD_MAX_EXTEND_MINUTES: &str = "SeatHold:MaxExtendMinutes";
    pub const RESERVATION_CUTOFF_MINUTES: &str = "Reservation:CutoffMinutes";
}

/// Fallbacks applied when a key is unset.
pub mod defaults {
    pub const VIP_ADVANCE_BOOKING_DAYS: i64 = 7;
    pub const REGULAR_ADVANCE_BOOKING_DAYS: i64 = 2;
    pub const BASE_TICKET_PRICE_CENTS: i64 = 10_000;
    pub const HOLD_DEFAULT_TTL_SECONDS: i64 = 120;
    pub const HOLD_HEARTBEAT_EXTEND_SECONDS: i64 = 120;
    pub const HOLD_MAX_EXTEND_MINUTES: i64 = 10;
}

/// Typed reads over the settings store. Missing keys return `Ok(None)`;
/// callers apply the defaults above.
#[async_trait]
pub trait SettingsReader: Send + Sync {
    async fn get_int(&self, key: &str) -> CoreResult<Option<i64>>;

    /// Monetary values come back as integer cents.
    async fn get_cents(&self, key: &str) -> CoreResult<Option<i64>>;

    async fn get_string(&self, key: &str) -> CoreResult<Option<String>>;
}
