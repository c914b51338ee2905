//! Parallel force evaluation over a built quadtree.
//!
//! The driver evaluates a half-open index range `[first, last)` of a particle
//! system against a tree. With zero workers the range is walked sequentially in
//! index order. Otherwise a Rayon pool of `workers` threads is created for the call,
//! the range is cut into contiguous chunks of `ceil(n / workers)` particles and each
//! chunk is evaluated by one task. The tree is only read and each particle is
//! written by exactly one task, so no locking is needed.
//!
//! # Example
//!
//! ```
//! use rs_barnes_hut::particles::{BarnesHut, Particle, ParticleSystem, Quadtree};
//! use rs_barnes_hut::utils::BarnesHutConfig;
//!
//! let mut system = ParticleSystem::from_particles(vec![
//!     Particle::new(0.0, 0.0, 1.0),
//!     Particle::new(1.0, 0.0, 1.0),
//!     Particle::new(2.0, 0.0, 1.0),
//! ]);
//! let tree = Quadtree::from_system(&system, BarnesHutConfig::default().with_opening_angle(0.0));
//!
//! let mut driver = BarnesHut::new(Some(&mut system), Some(&tree));
//! driver.set_workers(2);
//! let evaluated = driver.run().expect("Driver has a system and a tree");
//! assert_eq!(evaluated, 3);
//!
//! // The middle particle is pulled equally both ways.
//! assert!(system.get(1).expect("Particle 1 exists").fx.abs() < 1e-12);
//! ```
use rayon::prelude::*;

use crate::particles::{Particle, ParticleSystem, Quadtree};
use crate::utils::{BarnesHutConfig, PhysicsError, DEFAULT_BARNES_HUT_CONFIG};

/// Evaluates a range of a particle system against a quadtree, optionally in parallel.
pub struct BarnesHut<'a> {
    system: Option<&'a mut ParticleSystem>,
    tree: Option<&'a Quadtree>,
    workers: usize,
    first: usize,
    last: usize,
}

impl<'a> BarnesHut<'a> {
    /// Creates a driver covering every particle of `system` with the default worker count.
    pub fn new(system: Option<&'a mut ParticleSystem>, tree: Option<&'a Quadtree>) -> Self {
        let last = system.as_ref().map_or(0, |s| s.len());
        BarnesHut {
            system,
            tree,
            workers: DEFAULT_BARNES_HUT_CONFIG.workers,
            first: 0,
            last,
        }
    }

    /// Runs the evaluation and blocks until every particle in range is done.
    ///
    /// `last` is clamped to the size of the system. Returns the number of particles
    /// evaluated; an empty range is a no-op even when an input is missing.
    ///
    /// # Errors
    ///
    /// Returns `PhysicsError::ConfigurationError` when the system or the tree is missing,
    /// and `PhysicsError::ThreadPool` if the worker pool cannot be built. No particle is
    /// touched in either case.
    pub fn run(&mut self) -> Result<usize, PhysicsError> {
        if self.first >= self.last {
            return Ok(0);
        }
        let (system, tree) = match (self.system.as_deref_mut(), self.tree) {
            (Some(system), Some(tree)) => (system, tree),
            _ => {
                log::error!("Tried to run Barnes-Hut with a missing particle system or quadtree");
                return Err(PhysicsError::ConfigurationError(
                    "Barnes-Hut needs both a particle system and a quadtree".to_string(),
                ));
            }
        };
        let last = self.last.min(system.len());
        if self.first >= last {
            return Ok(0);
        }
        let range = &mut system.particles_mut()[self.first..last];
        evaluate_range(tree, range, self.first, self.workers)
    }

    pub fn particle_system(&self) -> Option<&ParticleSystem> {
        self.system.as_deref()
    }

    pub fn quadtree(&self) -> Option<&Quadtree> {
        self.tree
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn last(&self) -> usize {
        self.last
    }

    /// Replaces the particle system and resets `last` to its length.
    pub fn set_particle_system(&mut self, system: Option<&'a mut ParticleSystem>) {
        self.last = system.as_ref().map_or(0, |s| s.len());
        self.system = system;
    }

    pub fn set_quadtree(&mut self, tree: Option<&'a Quadtree>) {
        self.tree = tree;
    }

    /// Sets the worker count. 0 evaluates sequentially on the calling thread.
    pub fn set_workers(&mut self, workers: usize) {
        self.workers = workers;
    }

    pub fn set_first(&mut self, first: usize) {
        self.first = first;
    }

    pub fn set_last(&mut self, last: usize) {
        self.last = last;
    }
}

/// Evaluates `particles` against `tree`, where `particles[0]` has index `offset` in the
/// system the tree was built from.
///
/// Returns the number of particles evaluated.
pub fn evaluate_range(
    tree: &Quadtree,
    particles: &mut [Particle],
    offset: usize,
    workers: usize,
) -> Result<usize, PhysicsError> {
    let n = particles.len();
    if n == 0 {
        return Ok(0);
    }
    if workers == 0 {
        for (i, particle) in particles.iter_mut().enumerate() {
            tree.evaluate(offset + i, particle);
        }
        return Ok(n);
    }

    let chunk_size = n.div_ceil(workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.min(n))
        .build()
        .map_err(|err| PhysicsError::ThreadPool(err.to_string()))?;
    log::debug!(
        "Evaluating {} particles on {} workers in chunks of {}",
        n, workers.min(n), chunk_size
    );

    pool.install(|| {
        particles
            .par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(|(chunk, slice)| {
                let base = offset + chunk * chunk_size;
                for (i, particle) in slice.iter_mut().enumerate() {
                    tree.evaluate(base + i, particle);
                }
            });
    });
    Ok(n)
}

/// Evaluates every particle of `system` against `tree` with `workers` workers.
pub fn evaluate_parallel(tree: &Quadtree, system: &mut ParticleSystem, workers: usize) -> Result<usize, PhysicsError> {
    evaluate_range(tree, system.particles_mut(), 0, workers)
}

/// One full evaluation pass: zeroes every force, builds a tree over `system` and
/// evaluates all particles with `config.workers` workers.
///
/// Forces already present in `system` (for example from a saved result) do not
/// leak into the new values.
///
/// # Errors
///
/// Returns `PhysicsError::ConfigurationError` for an invalid `config`, and any
/// driver error.
pub fn compute_forces(system: &mut ParticleSystem, config: &BarnesHutConfig) -> Result<usize, PhysicsError> {
    config.validate()?;
    system.zero_forces();
    if system.is_empty() {
        return Ok(0);
    }
    let tree = Quadtree::from_system(system, *config);
    let mut driver = BarnesHut::new(Some(system), Some(&tree));
    driver.set_workers(config.workers);
    driver.run()
}
