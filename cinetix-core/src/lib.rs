pub mod clock;
pub mod codes;
pub mod idempotency;
pub mod payment;
pub mod repository;
pub mod settings;
pub mod vip;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codes::TicketCodeGenerator;
pub use idempotency::{IdempotencyClaim, IdempotencyStore};
pub use payment::{GatewayResult, PaymentGateway};
pub use repository::{MemberRepository, ScreeningRepository, SeatLayoutRepository, SoldSeatLookup};
pub use settings::SettingsReader;
pub use vip::VipUsageService;

/// Error taxonomy shared by every core operation. Payment declines are a
/// result value, never one of these.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or missing input; the caller must fix the request.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Seat already sold/held/reserved, or an entity is in the wrong state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A business-policy window was violated (advance booking, cutoffs).
    #[error("Policy violation: {0}")]
    Policy(String),

    /// Caller does not own the resource it is trying to mutate.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Ticket-code uniqueness retry budget exhausted; the sale transaction
    /// must abort.
    #[error("Ticket code generation exhausted after {attempts} attempts")]
    TicketCodeExhausted { attempts: u32 },

    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        CoreError::Policy(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        CoreError::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CoreError::Internal(msg.into())
    }
}
