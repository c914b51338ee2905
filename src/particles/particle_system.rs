//! Ordered particle storage with cached bounds, loaded from and saved to a
//! whitespace delimited text format.
//!
//! Each line holds one particle as `x y mass`, or `x y mass fx fy` when the file
//! is a previously saved result. Saving always writes all five fields.
//!
//! # Example
//!
//! ```
//! use rs_barnes_hut::particles::ParticleSystem;
//!
//! let input = "0.0 0.0 1.0\n1.0 0.0 1.0\n";
//! let system = ParticleSystem::load_from_reader(input.as_bytes(), false)
//!     .expect("Failed to parse particles");
//! assert_eq!(system.len(), 2);
//!
//! let bounds = system.bounds().expect("Non-empty system has bounds");
//! assert_eq!((bounds.left, bounds.right), (0.0, 1.0));
//! ```
use std::f64::consts::PI;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::particles::{Particle, Region};
use crate::utils::PhysicsError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    bounds: Option<Region>,
}

impl ParticleSystem {
    /// Creates a system without any particles.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        let mut system = Self::new();
        for particle in particles {
            system.push(particle);
        }
        system
    }

    /// Loads a system from `path`. See [`ParticleSystem::load`].
    pub fn from_file<P: AsRef<Path>>(path: P, has_forces: bool) -> Result<Self, PhysicsError> {
        let mut system = Self::new();
        system.load(path, has_forces)?;
        Ok(system)
    }

    /// Replaces the contents of this system with the particles in `path`.
    ///
    /// # Errors
    ///
    /// Returns `PhysicsError::Io` if the file cannot be read and
    /// `PhysicsError::MalformedInput` for the first record that does not parse.
    /// On any error the system is left empty.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, has_forces: bool) -> Result<(), PhysicsError> {
        self.clear();
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            log::error!("Could not open {}: {}", path.display(), err);
            PhysicsError::Io(format!("{}: {}", path.display(), err))
        })?;
        match Self::load_from_reader(file, has_forces) {
            Ok(loaded) => {
                *self = loaded;
                log::debug!("Loaded {} particles from {}", self.len(), path.display());
                Ok(())
            }
            Err(err) => {
                log::error!("Error loading {}: {}", path.display(), err);
                Err(err)
            }
        }
    }

    /// Parses particles from any reader. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `PhysicsError::MalformedInput` when a line has the wrong number of
    /// fields or a field is not a finite number.
    pub fn load_from_reader<R: Read>(reader: R, has_forces: bool) -> Result<Self, PhysicsError> {
        let expected = if has_forces { 5 } else { 3 };
        let mut system = Self::new();
        for (number, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line_number = number + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != expected {
                return Err(PhysicsError::MalformedInput {
                    line: line_number,
                    reason: format!("expected {} fields, found {}", expected, fields.len()),
                });
            }
            let mut values = [0.0; 5];
            for (slot, field) in values.iter_mut().zip(&fields) {
                *slot = parse_field(field, line_number)?;
            }
            system.push(Particle::with_force(values[0], values[1], values[2], values[3], values[4]));
        }
        Ok(system)
    }

    /// Writes every particle to `path`, replacing the file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PhysicsError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| {
            log::error!("Could not save to {}: {}", path.display(), err);
            PhysicsError::Io(format!("{}: {}", path.display(), err))
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes one line per particle in the save format.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), PhysicsError> {
        for particle in &self.particles {
            writeln!(writer, "{}", particle)?;
        }
        Ok(())
    }

    /// Appends a particle and widens the cached bounds.
    pub fn push(&mut self, particle: Particle) {
        self.bounds = Some(match self.bounds {
            None => Region::new(particle.x, particle.x, particle.y, particle.y),
            Some(b) => Region::new(
                b.left.min(particle.x),
                b.right.max(particle.x),
                b.bottom.min(particle.y),
                b.top.max(particle.y),
            ),
        });
        self.particles.push(particle);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.bounds = None;
    }

    /// Zeroes the force accumulators of every particle.
    pub fn zero_forces(&mut self) {
        self.particles.iter_mut().for_each(Particle::zero_force);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Mutable access to a particle. Moving it does not update the cached bounds.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Smallest rectangle containing every particle, or `None` when empty.
    pub fn bounds(&self) -> Option<Region> {
        self.bounds
    }

    /// Logs the extents of this system.
    pub fn print_dimensions(&self) {
        match self.bounds {
            Some(b) => log::info!(
                "{} particles, x: [{}, {}], y: [{}, {}]",
                self.len(), b.left, b.right, b.bottom, b.top
            ),
            None => log::info!("Particle system is empty"),
        }
    }
}

/// Generates `count` particles spread uniformly over a disk of `radius` centred on the origin.
///
/// Masses are drawn from `[0.1, 1.0)`. With `signed` each mass is negated with
/// probability one half. The same `seed` always gives the same field.
///
/// # Examples
///
/// ```
/// use rs_barnes_hut::particles::random_disk;
///
/// let system = random_disk(100, 5.0, false, 42);
/// assert_eq!(system.len(), 100);
/// assert!(system.particles().iter().all(|p| p.x.hypot(p.y) <= 5.0 + 1e-9 && p.mass > 0.0));
/// assert_eq!(system, random_disk(100, 5.0, false, 42));
/// ```
pub fn random_disk(count: usize, radius: f64, signed: bool, seed: u64) -> ParticleSystem {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut system = ParticleSystem::new();
    for _ in 0..count {
        let r = radius * rng.random::<f64>().sqrt();
        let angle = 2.0 * PI * rng.random::<f64>();
        let mut mass = 0.1 + 0.9 * rng.random::<f64>();
        if signed && rng.random_bool(0.5) {
            mass = -mass;
        }
        system.push(Particle::new(r * angle.cos(), r * angle.sin(), mass));
    }
    system
}

fn parse_field(field: &str, line: usize) -> Result<f64, PhysicsError> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PhysicsError::MalformedInput {
            line,
            reason: format!("'{}' is not a finite number", field),
        }),
    }
}

impl fmt::Display for ParticleSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "<-- ParticleSystem -->")?;
        writeln!(f, "size = {}", self.len())?;
        for particle in &self.particles {
            writeln!(f, "{}", particle)?;
        }
        writeln!(f, "<-- ParticleSystem -->")
    }
}
