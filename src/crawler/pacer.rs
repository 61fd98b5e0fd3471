//! Randomized pause between navigations

use crate::config::ScrapingConfig;
use rand::Rng;
use std::time::Duration;

/// Inserts a random `min..=max` delay before every navigation but the first
#[derive(Debug, Clone)]
pub struct Pacer {
    min: Duration,
    max: Duration,
    primed: bool,
    waits: u64,
}

impl Pacer {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min: min.min(max),
            max,
            primed: false,
            waits: 0,
        }
    }

    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.delay_min_ms),
            Duration::from_millis(config.delay_max_ms),
        )
    }

    /// Picks the next delay without sleeping
    pub fn next_delay(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max > min {
            Duration::from_millis(rand::thread_rng().gen_range(min..=max))
        } else {
            self.min
        }
    }

    /// Suspends before a navigation
    pub async fn wait(&mut self) {
        if !self.primed {
            self.primed = true;
            return;
        }
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::debug!("Waiting {:.2}s before next navigation", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
        self.waits += 1;
    }

    /// Number of pauses taken so far
    pub fn waits(&self) -> u64 {
        self.waits
    }
}
