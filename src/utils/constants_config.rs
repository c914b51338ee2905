// src/utils/constants_config.rs
use crate::utils::{
    DEFAULT_BARNES_HUT_CONFIG,
    errors::PhysicsError
};

/// Tunables shared by the tree, the parallel driver and the accuracy tester.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarnesHutConfig {
    /// Scales every pairwise interaction. Folded to 1 by default.
    pub gravitational_constant: f64,
    /// Opening angle (tau). 0 forces exact pairwise summation.
    pub opening_angle: f64,
    /// Masses with a smaller magnitude are treated as absent.
    pub mass_epsilon: f64,
    /// Separations below this are raised to it before the inverse-square law is applied.
    pub min_separation: f64,
    /// Outward padding of the root region built from a particle system.
    pub leeway: f64,
    /// Worker count for the parallel driver. 0 evaluates sequentially.
    pub workers: usize,
}

impl Default for BarnesHutConfig {
    fn default() -> Self {
        DEFAULT_BARNES_HUT_CONFIG
    }
}

impl BarnesHutConfig {
    pub fn new(
        gravitational_constant: Option<f64>,
        opening_angle: Option<f64>,
        mass_epsilon: Option<f64>,
        min_separation: Option<f64>,
        leeway: Option<f64>,
        workers: Option<usize>,
    ) -> Self {
        let default = DEFAULT_BARNES_HUT_CONFIG;
        Self {
            gravitational_constant: gravitational_constant.unwrap_or(default.gravitational_constant),
            opening_angle: opening_angle.unwrap_or(default.opening_angle),
            mass_epsilon: mass_epsilon.unwrap_or(default.mass_epsilon),
            min_separation: min_separation.unwrap_or(default.min_separation),
            leeway: leeway.unwrap_or(default.leeway),
            workers: workers.unwrap_or(default.workers),
        }
    }

    /// Returns a copy with a different opening angle.
    pub fn with_opening_angle(mut self, tau: f64) -> Self {
        self.opening_angle = tau;
        self
    }

    /// Returns a copy with a different worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Checks that every value is finite and non-negative where required.
    ///
    /// # Errors
    ///
    /// Returns `PhysicsError::ConfigurationError` naming the first offending field.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_barnes_hut::utils::BarnesHutConfig;
    ///
    /// assert!(BarnesHutConfig::default().validate().is_ok());
    /// assert!(BarnesHutConfig::default().with_opening_angle(-1.0).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.gravitational_constant.is_finite() {
            return Err(PhysicsError::ConfigurationError("gravitational constant must be finite".to_string()));
        }
        let non_negative = [
            ("opening angle", self.opening_angle),
            ("mass epsilon", self.mass_epsilon),
            ("minimum separation", self.min_separation),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(PhysicsError::ConfigurationError(format!(
                    "{} must be finite and non-negative, got {}", name, value
                )));
            }
        }
        // Particles on the upper extremes would fall outside a root with no padding.
        if !self.leeway.is_finite() || self.leeway <= 0.0 {
            return Err(PhysicsError::ConfigurationError(format!(
                "leeway must be finite and positive, got {}", self.leeway
            )));
        }
        Ok(())
    }
}
