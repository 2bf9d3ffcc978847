pub mod app_config;
pub mod codes;
pub mod memory;
pub mod payment;
pub mod seed;
pub mod settings;

pub use app_config::{BusinessRules, Config};
pub use codes::RandomTicketCodes;
pub use memory::MemoryStore;
pub use payment::MockPaymentGateway;
pub use settings::{ConfigSettings, MemorySettings};
