use std::fmt;

/// A point mass with a force accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// May be negative (a signed charge) or zero.
    pub mass: f64,
    /// Accumulated force, x component.
    pub fx: f64,
    /// Accumulated force, y component.
    pub fy: f64,
}

impl Particle {
    /// Creates a new Particle with zeroed force accumulators.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_barnes_hut::particles::Particle;
    ///
    /// let particle = Particle::new(1.0, 2.0, 3.0);
    /// assert_eq!(particle.mass, 3.0);
    /// assert_eq!((particle.fx, particle.fy), (0.0, 0.0));
    /// ```
    pub fn new(x: f64, y: f64, mass: f64) -> Self {
        Particle { x, y, mass, fx: 0.0, fy: 0.0 }
    }

    /// Creates a Particle that already carries a force, as read back from a saved result.
    pub fn with_force(x: f64, y: f64, mass: f64, fx: f64, fy: f64) -> Self {
        Particle { x, y, mass, fx, fy }
    }

    /// Adds `(fx, fy)` to the accumulators.
    pub fn accumulate(&mut self, force: (f64, f64)) {
        self.fx += force.0;
        self.fy += force.1;
    }

    pub fn zero_force(&mut self) {
        self.fx = 0.0;
        self.fy = 0.0;
    }

    pub fn force(&self) -> (f64, f64) {
        (self.fx, self.fy)
    }
}

impl fmt::Display for Particle {
    /// Writes the five tab separated fields used by the particle file format.
    ///
    /// ```
    /// use rs_barnes_hut::particles::Particle;
    ///
    /// let p = Particle::with_force(1.0, -2.5, 3.0, 0.25, 0.0);
    /// assert_eq!(p.to_string(), " 1.0000\t-2.5000\t 3.0000\t 0.2500\t 0.0000");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:7.4}\t{:7.4}\t{:7.4}\t{:7.4}\t{:7.4}",
            self.x, self.y, self.mass, self.fx, self.fy
        )
    }
}
