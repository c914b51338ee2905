//! Accuracy regression for the opening angle.
//!
//! An [`ErrorTester`] evaluates a particle system once with tau = 0 (exact pairwise
//! summation) and then sweeps tau over `[min_tau, max_tau]`, recording the root mean
//! square force error of each step against that reference. The error is expected to
//! grow with tau; steps where it shrinks are reported, not treated as failures.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::particles::{evaluate_parallel, ParticleSystem, Quadtree};
use crate::utils::{rms_difference, BarnesHutConfig, PhysicsError};

/// Per-axis root mean square force error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rmse {
    pub fx: f64,
    pub fy: f64,
}

impl Rmse {
    /// Both axes combined, `sqrt(fx^2 + fy^2)`.
    pub fn combined(&self) -> f64 {
        self.fx.hypot(self.fy)
    }
}

/// Error measured at one opening angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmseSample {
    pub tau: f64,
    pub rmse: Rmse,
}

#[derive(Debug, Clone)]
pub struct ErrorTester {
    pub min_tau: f64,
    pub max_tau: f64,
    pub tau_delta: f64,
    /// Remaining tree and driver settings. Its opening angle is overwritten per step.
    pub config: BarnesHutConfig,
}

impl Default for ErrorTester {
    fn default() -> Self {
        ErrorTester {
            min_tau: 0.0,
            max_tau: 0.5,
            tau_delta: 0.0001,
            config: BarnesHutConfig::default(),
        }
    }
}

impl ErrorTester {
    /// Creates a tester sweeping tau from 0 to `max_tau` in the default steps.
    pub fn new(max_tau: f64) -> Self {
        ErrorTester { max_tau, ..Self::default() }
    }

    /// Number of tau values the sweep visits.
    ///
    /// # Errors
    ///
    /// Returns `PhysicsError::ConfigurationError` if the bounds allow no steps.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_barnes_hut::particles::ErrorTester;
    ///
    /// let mut tester = ErrorTester::new(0.5);
    /// tester.tau_delta = 0.1;
    /// assert_eq!(tester.steps().expect("valid bounds"), 6);
    /// ```
    pub fn steps(&self) -> Result<usize, PhysicsError> {
        if !(self.max_tau >= self.min_tau) || self.min_tau < 0.0 {
            return Err(PhysicsError::ConfigurationError(format!(
                "tau bounds [{}, {}] do not allow for any steps", self.min_tau, self.max_tau
            )));
        }
        if !(self.tau_delta > 0.0) {
            return Err(PhysicsError::ConfigurationError(format!(
                "tau delta must be positive, got {}", self.tau_delta
            )));
        }
        // Nudge before flooring so an exact multiple of delta is not lost to rounding.
        let span = (self.max_tau - self.min_tau) / self.tau_delta;
        Ok((span + 1e-9).floor() as usize + 1)
    }

    /// The tau value visited at `step`.
    pub fn tau_at(&self, step: usize) -> f64 {
        self.min_tau + step as f64 * self.tau_delta
    }

    /// Runs the sweep against `system` and returns one sample per tau value.
    ///
    /// Every step whose combined error is smaller than the previous step's is logged
    /// as a warning.
    ///
    /// # Errors
    ///
    /// `EmptyInput` for an empty system, `ConfigurationError` for unusable tau bounds,
    /// and any driver error.
    pub fn run(&self, system: &ParticleSystem) -> Result<Vec<RmseSample>, PhysicsError> {
        let steps = self.steps()?;
        let reference = self.generate_brute_force(system)?;
        log::info!(
            "Sweeping tau over [{}, {}] by {} ({} steps)",
            self.min_tau, self.max_tau, self.tau_delta, steps
        );

        let mut approximate = system.clone();
        let mut tree = Quadtree::from_system(&approximate, self.config);
        let mut samples = Vec::with_capacity(steps);
        for step in 0..steps {
            let tau = self.tau_at(step);
            tree.set_opening_angle(tau);
            approximate.zero_forces();
            evaluate_parallel(&tree, &mut approximate, self.config.workers)?;
            let rmse = calculate_rmse(&reference, &approximate)?;
            log::debug!("tau {:8.4}\trmse fx {:8.4}\trmse fy {:8.4}", tau, rmse.fx, rmse.fy);
            samples.push(RmseSample { tau, rmse });
        }

        for index in non_monotonic_steps(&samples) {
            log::warn!(
                "Error decreased from tau {} to tau {} ({} -> {})",
                samples[index - 1].tau,
                samples[index].tau,
                samples[index - 1].rmse.combined(),
                samples[index].rmse.combined()
            );
        }
        Ok(samples)
    }

    /// Copies `system` and evaluates it exactly (tau = 0).
    ///
    /// # Errors
    ///
    /// Returns `PhysicsError::EmptyInput` if `system` has no particles.
    pub fn generate_brute_force(&self, system: &ParticleSystem) -> Result<ParticleSystem, PhysicsError> {
        if system.is_empty() {
            log::error!("Brute-force calculation could not be completed: no particles");
            return Err(PhysicsError::EmptyInput);
        }
        log::info!("Beginning brute-force calculation on {} particles", system.len());
        let mut reference = system.clone();
        reference.zero_forces();
        let tree = Quadtree::from_system(&reference, self.config.with_opening_angle(0.0));
        evaluate_parallel(&tree, &mut reference, self.config.workers)?;
        log::info!("Brute-force calculation done");
        Ok(reference)
    }

    /// Writes one `tau rmse_fx rmse_fy` row per sample.
    pub fn save<P: AsRef<Path>>(samples: &[RmseSample], path: P) -> Result<(), PhysicsError> {
        let path = path.as_ref();
        log::info!("Saving RMSE values to {}", path.display());
        let file = File::create(path).map_err(|err| {
            log::error!("Could not save RMSE values to {}: {}", path.display(), err);
            PhysicsError::Io(format!("{}: {}", path.display(), err))
        })?;
        let mut writer = BufWriter::new(file);
        for sample in samples {
            writeln!(writer, "{:8.4}\t{:8.4}\t{:8.4}", sample.tau, sample.rmse.fx, sample.rmse.fy)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Default name for the RMSE table of `input`: `<input>_<min>_<max>_<delta>`.
    pub fn default_output_path<P: AsRef<Path>>(&self, input: P) -> PathBuf {
        let mut name = input.as_ref().as_os_str().to_os_string();
        name.push(format!("_{}_{}_{}", self.min_tau, self.max_tau, self.tau_delta));
        PathBuf::from(name)
    }
}

/// Root mean square difference of the forces in `approximate` versus `reference`.
///
/// # Errors
///
/// Returns `PhysicsError::SizeMismatch` if the systems differ in size.
pub fn calculate_rmse(reference: &ParticleSystem, approximate: &ParticleSystem) -> Result<Rmse, PhysicsError> {
    if reference.len() != approximate.len() {
        return Err(PhysicsError::SizeMismatch { expected: reference.len(), found: approximate.len() });
    }
    let (ref_fx, ref_fy): (Vec<f64>, Vec<f64>) = reference.particles().iter().map(|p| (p.fx, p.fy)).unzip();
    let (app_fx, app_fy): (Vec<f64>, Vec<f64>) = approximate.particles().iter().map(|p| (p.fx, p.fy)).unzip();
    Ok(Rmse {
        fx: rms_difference(&ref_fx, &app_fx),
        fy: rms_difference(&ref_fy, &app_fy),
    })
}

/// Indices of samples whose combined error is smaller than the sample before them.
pub fn non_monotonic_steps(samples: &[RmseSample]) -> Vec<usize> {
    samples
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].rmse.combined() < pair[0].rmse.combined())
        .map(|(i, _)| i + 1)
        .collect()
}
