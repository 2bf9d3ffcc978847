use rand::Rng;

use cinetix_core::TicketCodeGenerator;

const LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Codes shaped like "AB12-34CD". Ambiguous letters (I, O) are skipped.
#[derive(Default)]
pub struct RandomTicketCodes;

impl RandomTicketCodes {
    pub fn new() -> Self {
        Self
    }
}

impl TicketCodeGenerator for RandomTicketCodes {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        let mut pick = |alphabet: &[u8]| alphabet[rng.gen_range(0..alphabet.len())] as char;
        format!(
            "{}{}{}{}-{}{}{}{}",
            pick(LETTERS),
            pick(LETTERS),
            pick(DIGITS),
            pick(DIGITS),
            pick(DIGITS),
            pick(DIGITS),
            pick(LETTERS),
            pick(LETTERS),
        )
    }
}
