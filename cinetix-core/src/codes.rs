/// Produces short, human-shareable ticket codes (e.g. "AB12-34CD").
/// Uniqueness is not guaranteed by the generator; the sale transaction
/// checks persisted tickets and retries.
pub trait TicketCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}
