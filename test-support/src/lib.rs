// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! Shared helpers for the gammarad tests, benchmarks, and demos.

#[macro_use] extern crate slog;

use slog::Drain;

/// Create a terminal `slog` logger for use in test and demo programs.
pub fn default_log() -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .overflow_strategy(slog_async::OverflowStrategy::Block)
        .build().fuse();
    slog::Logger::root(drain, o!())
}


/// Draws random numbers uniformly or log-uniformly between two bounds.
///
/// The tests use this to pick photon energies spread over many decades.
pub struct Sampler {
    is_log: bool,
    low: f64,
    range: f64
}

impl Sampler {
    /// Create a new Sampler. The bounds may be given in either order.
    pub fn new(is_log: bool, mut low: f64, mut high: f64) -> Self {
        if low > high {
            std::mem::swap(&mut low, &mut high);
        }

        if is_log {
            low = low.ln();
            high = high.ln();
        }

        Sampler { is_log: is_log, low: low, range: high - low }
    }

    /// Sample a number from the distribution.
    pub fn get(&self) -> f64 {
        let n = self.low + rand::random::<f64>() * self.range;

        if self.is_log {
            n.exp()
        } else {
            n
        }
    }

    /// Sample `n` numbers, sorted in increasing order.
    pub fn get_sorted(&self, n: usize) -> Vec<f64> {
        let mut v: Vec<f64> = (0..n).map(|_| self.get()).collect();
        v.sort_by(|a, b| a.total_cmp(b));
        v
    }
}
