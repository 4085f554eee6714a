//! Admission tuning.
//!
//! Defaults can be overridden with:
//! - `PARKADE_MAX_RETRIES` - reservation attempts per admission (default 3)
//! - `PARKADE_RETRY_DELAY_MS` - pause between attempts (default 10)

use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Upper bound on `try_reserve` calls for one admission.
    pub max_retries: u32,
    /// Fixed pause after a lost race, before searching again.
    pub retry_delay: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl AdmissionConfig {
    /// Build from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let max_retries = lookup("PARKADE_MAX_RETRIES")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_RETRIES);

        let retry_delay = lookup("PARKADE_RETRY_DELAY_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RETRY_DELAY);

        Self {
            max_retries,
            retry_delay,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = AdmissionConfig::from_lookup(lookup(&[]));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(10));
    }

    #[test]
    fn overrides_are_applied() {
        let config = AdmissionConfig::from_lookup(lookup(&[
            ("PARKADE_MAX_RETRIES", "5"),
            ("PARKADE_RETRY_DELAY_MS", " 25 "),
        ]));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(25));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = AdmissionConfig::from_lookup(lookup(&[
            ("PARKADE_MAX_RETRIES", "0"),
            ("PARKADE_RETRY_DELAY_MS", "soon"),
        ]));
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.retry_delay, DEFAULT_RETRY_DELAY);
    }

    #[test]
    fn builder_clamps_retries() {
        let config = AdmissionConfig::from_lookup(lookup(&[]))
            .with_max_retries(0)
            .with_retry_delay(Duration::ZERO);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.retry_delay, Duration::ZERO);
    }
}
