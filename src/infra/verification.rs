use crate::domain::models::payment::Payment;
use crate::domain::ports::{VerificationOutcome, VerificationPolicy};
use rand::Rng;
use std::time::Duration;

pub const REJECTION_REASON: &str = "Transaction ID could not be verified with the bank. Please re-upload a clear screenshot.";

/// Simulated backend check: approves with a fixed probability after a fixed delay.
pub struct RandomVerificationPolicy {
    success_rate: f64,
    delay: Duration,
}

impl RandomVerificationPolicy {
    pub fn new(success_rate: f64, delay: Duration) -> Self {
        Self { success_rate: success_rate.clamp(0.0, 1.0), delay }
    }
}

impl VerificationPolicy for RandomVerificationPolicy {
    fn delay(&self) -> Duration {
        self.delay
    }

    fn verify(&self, _payment: &Payment) -> VerificationOutcome {
        if rand::thread_rng().gen_bool(self.success_rate) {
            VerificationOutcome::Approved
        } else {
            VerificationOutcome::Rejected { reason: REJECTION_REASON.to_string() }
        }
    }
}
