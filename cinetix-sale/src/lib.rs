pub mod models;
pub mod orchestrator;
pub mod repository;

pub use models::{
    Payment, PaymentStatus, SaleItem, SellTicketsRequest, SellTicketsResponse, SoldTicket, Ticket,
};
pub use orchestrator::SaleOrchestrator;
pub use repository::{HoldRelease, SaleCommit, SaleUnitOfWork, TicketRepository};
