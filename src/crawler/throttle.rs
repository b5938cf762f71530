//! Politeness throttling between requests
//!
//! A fixed pause follows every fetch attempt, whatever its outcome.

use std::time::Duration;

/// Fixed inter-request delay
#[derive(Debug, Clone)]
pub struct Throttle {
    delay: Duration,
    pauses: u64,
}

impl Throttle {
    /// Creates a throttle that waits `delay` after each attempt
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pauses: 0,
        }
    }

    /// The configured delay
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleeps for the full delay
    pub async fn pause(&mut self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.pauses += 1;
    }

    /// Number of completed pauses
    pub fn pauses(&self) -> u64 {
        self.pauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_pause_waits_full_delay() {
        let mut throttle = Throttle::new(Duration::from_millis(30));
        let start = Instant::now();
        throttle.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(throttle.pauses(), 1);
    }

    #[tokio::test]
    async fn test_zero_delay_still_counts() {
        let mut throttle = Throttle::new(Duration::ZERO);
        throttle.pause().await;
        throttle.pause().await;
        assert_eq!(throttle.pauses(), 2);
    }

    #[test]
    fn test_new_throttle_has_not_paused() {
        let throttle = Throttle::new(Duration::from_millis(250));
        assert_eq!(throttle.delay(), Duration::from_millis(250));
        assert_eq!(throttle.pauses(), 0);
    }
}
