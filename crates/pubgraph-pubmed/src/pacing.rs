//! Jittered pauses before uncached requests
//!
//! Mostly short uniform pauses in `[0, 2)` seconds, with an occasional long
//! pause drawn from a normal distribution around six seconds.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Chance of a long pause instead of a short one
pub const LONG_PAUSE_PROBABILITY: f64 = 0.05;
pub const LONG_PAUSE_MEAN_SECS: f64 = 6.0;
pub const LONG_PAUSE_STD_DEV_SECS: f64 = 1.0;
/// Short pauses are uniform in `[0, SHORT_PAUSE_MAX_SECS)`
pub const SHORT_PAUSE_MAX_SECS: f64 = 2.0;

/// Draw one pause length in seconds.
///
/// The long-pause branch is unbounded below and can return a negative value.
pub fn sample_delay<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if rng.gen::<f64>() < LONG_PAUSE_PROBABILITY {
        let z: f64 = rng.sample(StandardNormal);
        LONG_PAUSE_MEAN_SECS + LONG_PAUSE_STD_DEV_SECS * z
    } else {
        rng.gen_range(0.0..SHORT_PAUSE_MAX_SECS)
    }
}

/// Negative samples sleep for zero
pub fn sleep_duration(secs: f64) -> Duration {
    Duration::from_secs_f64(secs.max(0.0))
}

pub struct Pacer {
    enabled: bool,
    rng: StdRng,
    sleep: fn(Duration),
}

impl Pacer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            rng: StdRng::from_entropy(),
            sleep: std::thread::sleep,
        }
    }

    pub fn seeded(enabled: bool, seed: u64) -> Self {
        Self {
            enabled,
            rng: StdRng::seed_from_u64(seed),
            sleep: std::thread::sleep,
        }
    }

    /// Replace the blocking sleep used by [`Pacer::pause`]
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sleep before a network call. Returns the time slept, `None` when disabled.
    pub fn pause(&mut self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        let secs = sample_delay(&mut self.rng);
        if secs < 0.0 {
            log::debug!("Sampled negative pause {secs:.3}s, not sleeping");
        } else {
            log::debug!("Sleeping {secs:.3} seconds");
        }
        let duration = sleep_duration(secs);
        (self.sleep)(duration);
        Some(duration)
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
