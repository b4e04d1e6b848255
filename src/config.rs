//! Configuration for the monitoring cache.

use std::time::Duration;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// How often the health monitor scans the peer registry.
    pub health_check_interval: Duration,

    /// How long a peer may go without an update before it is marked down.
    pub stale_after: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            health_check_interval: Duration::from_secs(30),
            stale_after: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health-check scan interval.
    pub fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    /// Set the staleness threshold.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_health_check_interval(Duration::from_secs(5))
            .with_stale_after(Duration::from_secs(60));

        assert_eq!(config.health_check_interval, Duration::from_secs(5));
        assert_eq!(config.stale_after, Duration::from_secs(60));
    }
}
