//! # Submission Schedule
//!
//! With a mean gap of `frequency` seconds a user first waits a uniform
//! `[0, frequency)` delay, then `3600 / X` seconds before every submission
//! where `X ~ Poisson(3600 / frequency)`. A frequency of zero submits back
//! to back.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Length of generated transaction messages.
pub const MESSAGE_LENGTH: usize = 16;

/// Above this mean the normal approximation replaces Knuth's method.
const KNUTH_LIMIT: f64 = 30.0;

/// Random alphanumeric message.
pub fn random_message<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(MESSAGE_LENGTH)
        .map(char::from)
        .collect()
}

/// Per-user delay generator.
#[derive(Debug, Clone)]
pub struct ArrivalSchedule {
    frequency: u64,
    lambda: f64,
    rng: StdRng,
}

impl ArrivalSchedule {
    pub fn new(frequency: u64, seed: u64) -> Self {
        let lambda = if frequency == 0 {
            0.0
        } else {
            3600.0 / frequency as f64
        };
        Self {
            frequency,
            lambda,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Delay before the first submission.
    pub fn initial_delay(&mut self) -> Duration {
        if self.frequency == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..self.frequency * 1000))
    }

    /// Delay before each submission.
    pub fn next_delay(&mut self) -> Duration {
        if self.frequency == 0 {
            return Duration::ZERO;
        }
        let arrivals = self.sample_poisson();
        Duration::from_millis((3600.0 / arrivals as f64 * 1000.0) as u64)
    }

    /// Poisson draw, at least 1 so the gap stays finite.
    fn sample_poisson(&mut self) -> u64 {
        let draw = if self.lambda < KNUTH_LIMIT {
            let limit = (-self.lambda).exp();
            let mut product: f64 = self.rng.gen();
            let mut count = 0u64;
            while product > limit {
                count += 1;
                product *= self.rng.gen::<f64>();
            }
            count
        } else {
            // Box-Muller
            let u1 = self.rng.gen::<f64>().clamp(f64::MIN_POSITIVE, 1.0);
            let u2: f64 = self.rng.gen();
            let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            (self.lambda + z * self.lambda.sqrt()).round().max(0.0) as u64
        };
        draw.max(1)
    }
}
