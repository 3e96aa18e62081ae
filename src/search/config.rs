//! Search strategy configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the hybrid hill-climb + annealing search.
///
/// One configurable strategy covers the whole family: a pure descent is
/// `with_phase_split(1.0)`, a pure annealing run is `with_phase_split(0.0)`,
/// and the stagnation boost turns on escalating perturbation.
///
/// # Examples
///
/// ```
/// use grid_balance::search::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_cooling_factor(0.9)
///     .with_perturbation_fraction(0.25)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchConfig {
    /// Fraction of each restart's iteration share spent on hill-climb
    /// sweeps; the remainder goes to annealing. In `[0, 1]`.
    pub phase_split: f64,

    /// Geometric cooling factor applied after every annealing iteration.
    /// In `(0, 1)`. Higher = slower cooling.
    pub cooling_factor: f64,

    /// Initial annealing temperature as a multiple of the cost after the
    /// hill-climb phase. Must be positive.
    pub initial_temperature_factor: f64,

    /// Fraction of all sites randomly reassigned between restarts
    /// (drawn with replacement). In `(0, 1]`.
    pub perturbation_fraction: f64,

    /// When enabled, the perturbation fraction doubles (capped at 1.0)
    /// whenever two consecutive restarts end within
    /// [`stagnation_threshold`](Self::stagnation_threshold) of each other,
    /// and resets once a restart makes progress again. Off by default.
    pub adaptive_perturbation: bool,

    /// Cost gap between consecutive restart endpoints below which the
    /// search counts as stagnating. Only read when
    /// [`adaptive_perturbation`](Self::adaptive_perturbation) is on.
    pub stagnation_threshold: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            phase_split: 0.5,
            cooling_factor: 0.95,
            initial_temperature_factor: 0.5,
            perturbation_fraction: 1.0 / 3.0,
            adaptive_perturbation: false,
            stagnation_threshold: 1e-3,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_phase_split(mut self, split: f64) -> Self {
        self.phase_split = split;
        self
    }

    pub fn with_cooling_factor(mut self, factor: f64) -> Self {
        self.cooling_factor = factor;
        self
    }

    pub fn with_initial_temperature_factor(mut self, factor: f64) -> Self {
        self.initial_temperature_factor = factor;
        self
    }

    pub fn with_perturbation_fraction(mut self, fraction: f64) -> Self {
        self.perturbation_fraction = fraction;
        self
    }

    pub fn with_adaptive_perturbation(mut self, threshold: f64) -> Self {
        self.adaptive_perturbation = true;
        self.stagnation_threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.phase_split) {
            return Err(format!(
                "phase_split must be in [0, 1], got {}",
                self.phase_split
            ));
        }
        if self.cooling_factor <= 0.0 || self.cooling_factor >= 1.0 {
            return Err(format!(
                "cooling_factor must be in (0, 1), got {}",
                self.cooling_factor
            ));
        }
        if !self.initial_temperature_factor.is_finite() || self.initial_temperature_factor <= 0.0 {
            return Err(format!(
                "initial_temperature_factor must be positive, got {}",
                self.initial_temperature_factor
            ));
        }
        if self.perturbation_fraction <= 0.0 || self.perturbation_fraction > 1.0 {
            return Err(format!(
                "perturbation_fraction must be in (0, 1], got {}",
                self.perturbation_fraction
            ));
        }
        if !self.stagnation_threshold.is_finite() || self.stagnation_threshold < 0.0 {
            return Err(format!(
                "stagnation_threshold must be non-negative, got {}",
                self.stagnation_threshold
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SearchConfig::default()
            .with_phase_split(1.0)
            .with_cooling_factor(0.9)
            .with_perturbation_fraction(0.2)
            .with_adaptive_perturbation(0.01)
            .with_seed(7);
        assert_eq!(config.phase_split, 1.0);
        assert_eq!(config.cooling_factor, 0.9);
        assert!(config.adaptive_perturbation);
        assert_eq!(config.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_phase_split() {
        assert!(SearchConfig::default().with_phase_split(1.5).validate().is_err());
    }

    #[test]
    fn test_validate_bad_cooling() {
        assert!(SearchConfig::default().with_cooling_factor(1.0).validate().is_err());
        assert!(SearchConfig::default().with_cooling_factor(0.0).validate().is_err());
    }

    #[test]
    fn test_validate_bad_perturbation_fraction() {
        assert!(
            SearchConfig::default()
                .with_perturbation_fraction(0.0)
                .validate()
                .is_err()
        );
        assert!(
            SearchConfig::default()
                .with_perturbation_fraction(1.1)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_validate_bad_temperature_factor() {
        assert!(
            SearchConfig::default()
                .with_initial_temperature_factor(0.0)
                .validate()
                .is_err()
        );
    }
}
