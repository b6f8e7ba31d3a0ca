//! # Cycler Configuration
//!
//! Three tunables control a cycler:
//!
//! - `min_cycle_secs` / `max_cycle_secs`: bounds of the per-cycle duration,
//!   drawn uniformly and independently after every toggle
//! - `poll_interval_ms`: how often the cycler thread wakes to check the
//!   elapsed time and the shutdown flag
//!
//! The poll interval bounds timing precision: a toggle can land up to one
//! interval after its drawn duration. It also bounds how long `shutdown`
//! waits for the thread to notice the flag.
//!
//! Configs can be built in code or loaded from TOML:
//!
//! ```toml
//! min_cycle_secs = 4.0
//! max_cycle_secs = 6.0
//! poll_interval_ms = 100
//! seed = 42            # optional, for reproducible schedules
//! ```

use crate::error::{CyclerError, CyclerResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for a phase cycler.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CyclerConfig {
    /// Shortest cycle (seconds).
    pub min_cycle_secs: f64,
    /// Longest cycle (seconds).
    pub max_cycle_secs: f64,
    /// Sleep increment of the cycler loop (ms).
    pub poll_interval_ms: u64,
    /// Seed for the duration RNG. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for CyclerConfig {
    fn default() -> Self {
        Self::traffic()
    }
}

impl CyclerConfig {
    /// Street-signal timing: 4-6 second cycles, checked every 100ms.
    #[must_use]
    pub const fn traffic() -> Self {
        Self {
            min_cycle_secs: 4.0,
            max_cycle_secs: 6.0,
            poll_interval_ms: 100,
            seed: None,
        }
    }

    /// Fixed 200ms cycles checked every 50ms. Used by tests and demos.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            min_cycle_secs: 0.2,
            max_cycle_secs: 0.2,
            poll_interval_ms: 50,
            seed: None,
        }
    }

    /// Returns the config with a fixed RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses and validates a TOML document. Missing keys take the
    /// `traffic()` defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CyclerError::Config`] on malformed TOML or unknown keys,
    /// and [`CyclerError::InvalidConfig`] if the values fail validation.
    pub fn from_toml_str(source: &str) -> CyclerResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| CyclerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CyclerError::Config`] if the file cannot be read, plus the
    /// errors of [`CyclerConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> CyclerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| CyclerError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks that the values describe a usable schedule.
    ///
    /// # Errors
    ///
    /// Returns [`CyclerError::InvalidConfig`] if either bound is not a
    /// positive finite number, if `min > max`, if the poll interval is zero,
    /// or if the poll interval is longer than the shortest cycle.
    pub fn validate(&self) -> CyclerResult<()> {
        let (min, max) = (self.min_cycle_secs, self.max_cycle_secs);

        if !min.is_finite() || !max.is_finite() || min <= 0.0 || max <= 0.0 {
            return Err(CyclerError::InvalidConfig(format!(
                "cycle bounds must be positive and finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(CyclerError::InvalidConfig(format!(
                "min_cycle_secs {min} exceeds max_cycle_secs {max}"
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(CyclerError::InvalidConfig(
                "poll_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.poll_interval() > self.min_cycle() {
            return Err(CyclerError::InvalidConfig(format!(
                "poll_interval_ms {} is longer than the shortest cycle ({min}s)",
                self.poll_interval_ms
            )));
        }
        Ok(())
    }

    /// Shortest cycle as a `Duration`.
    #[must_use]
    pub fn min_cycle(&self) -> Duration {
        Duration::from_secs_f64(self.min_cycle_secs)
    }

    /// Longest cycle as a `Duration`.
    #[must_use]
    pub fn max_cycle(&self) -> Duration {
        Duration::from_secs_f64(self.max_cycle_secs)
    }

    /// Sleep increment as a `Duration`.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Builds the duration RNG: seeded if `seed` is set, else from entropy.
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Draws one cycle duration uniformly from `[min, max]`.
    ///
    /// Assumes a validated config.
    pub fn sample_cycle<R: Rng>(&self, rng: &mut R) -> Duration {
        Duration::from_secs_f64(rng.gen_range(self.min_cycle_secs..=self.max_cycle_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_traffic_timing() {
        let config = CyclerConfig::default();
        assert_eq!(config, CyclerConfig::traffic());
        assert_eq!(config.min_cycle(), Duration::from_secs(4));
        assert_eq!(config.max_cycle(), Duration::from_secs(6));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
        assert!(CyclerConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let inverted = CyclerConfig {
            min_cycle_secs: 6.0,
            max_cycle_secs: 4.0,
            ..CyclerConfig::traffic()
        };
        assert!(matches!(inverted.validate(), Err(CyclerError::InvalidConfig(_))));

        let negative = CyclerConfig {
            min_cycle_secs: -1.0,
            ..CyclerConfig::traffic()
        };
        assert!(matches!(negative.validate(), Err(CyclerError::InvalidConfig(_))));

        let nan = CyclerConfig {
            max_cycle_secs: f64::NAN,
            ..CyclerConfig::traffic()
        };
        assert!(matches!(nan.validate(), Err(CyclerError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_poll_interval() {
        let zero = CyclerConfig {
            poll_interval_ms: 0,
            ..CyclerConfig::traffic()
        };
        assert!(matches!(zero.validate(), Err(CyclerError::InvalidConfig(_))));

        let coarse = CyclerConfig {
            poll_interval_ms: 500,
            ..CyclerConfig::fast()
        };
        assert!(matches!(coarse.validate(), Err(CyclerError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_toml_full() {
        let config = CyclerConfig::from_toml_str(
            r"
            min_cycle_secs = 1.5
            max_cycle_secs = 2.5
            poll_interval_ms = 20
            seed = 7
            ",
        )
        .unwrap();

        assert_eq!(config.min_cycle_secs, 1.5);
        assert_eq!(config.max_cycle_secs, 2.5);
        assert_eq!(config.poll_interval_ms, 20);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_from_toml_partial_uses_defaults() {
        let config = CyclerConfig::from_toml_str("poll_interval_ms = 10").unwrap();
        assert_eq!(config.min_cycle_secs, 4.0);
        assert_eq!(config.max_cycle_secs, 6.0);
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_from_toml_errors() {
        assert!(matches!(
            CyclerConfig::from_toml_str("min_cycle_secs = \"fast\""),
            Err(CyclerError::Config(_))
        ));
        assert!(matches!(
            CyclerConfig::from_toml_str("cycle = 3"),
            Err(CyclerError::Config(_))
        ));
        assert!(matches!(
            CyclerConfig::from_toml_str("min_cycle_secs = 9.0"),
            Err(CyclerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_toml_file() {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("test_cycler_config_{id}.toml"));
        std::fs::write(&path, "min_cycle_secs = 0.5\nmax_cycle_secs = 0.5\npoll_interval_ms = 25\n").unwrap();

        let config = CyclerConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.min_cycle(), Duration::from_millis(500));

        std::fs::remove_file(&path).ok();
        assert!(matches!(
            CyclerConfig::from_toml_file(&path),
            Err(CyclerError::Config(_))
        ));
    }

    #[test]
    fn test_samples_stay_in_bounds() {
        let config = CyclerConfig::traffic().with_seed(1);
        let mut rng = config.rng();

        for _ in 0..10_000 {
            let d = config.sample_cycle(&mut rng);
            assert!(d >= config.min_cycle() && d <= config.max_cycle(), "{d:?} out of range");
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let config = CyclerConfig::fast();
        let mut rng = config.rng();
        assert_eq!(config.sample_cycle(&mut rng), Duration::from_millis(200));
    }

    #[test]
    fn test_seeded_schedules_repeat() {
        let config = CyclerConfig::traffic().with_seed(42);
        let mut a = config.rng();
        let mut b = config.rng();

        let first: Vec<_> = (0..16).map(|_| config.sample_cycle(&mut a)).collect();
        let second: Vec<_> = (0..16).map(|_| config.sample_cycle(&mut b)).collect();
        assert_eq!(first, second);
    }
}
