use std::fmt;
use std::error::Error;

/// Represents errors that can occur while building, evaluating or persisting a Barnes-Hut tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A particle was inserted into a node whose region does not contain it.
    GeometryMismatch { x: f64, y: f64 },
    /// The driver or tree was used without the pieces it needs, or with an invalid setting.
    ConfigurationError(String),
    /// A particle record could not be parsed. `line` is 1-based.
    MalformedInput { line: usize, reason: String },
    /// An operation that needs at least one particle was given none.
    EmptyInput,
    /// Two particle collections that must match in size do not.
    SizeMismatch { expected: usize, found: usize },
    /// Reading or writing a particle file failed.
    Io(String),
    /// The worker pool could not be created.
    ThreadPool(String),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PhysicsError::GeometryMismatch { x, y } => write!(f, "Particle at ({}, {}) does not fit in this node", x, y),
            PhysicsError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            PhysicsError::MalformedInput { line, reason } => write!(f, "Malformed input on line {}: {}", line, reason),
            PhysicsError::EmptyInput => write!(f, "No particles to work with"),
            PhysicsError::SizeMismatch { expected, found } => write!(f, "Expected {} particles, found {}", expected, found),
            PhysicsError::Io(msg) => write!(f, "I/O error: {}", msg),
            PhysicsError::ThreadPool(msg) => write!(f, "Could not build worker pool: {}", msg),
        }
    }
}

impl Error for PhysicsError {}

impl From<std::io::Error> for PhysicsError {
    fn from(err: std::io::Error) -> Self {
        PhysicsError::Io(err.to_string())
    }
}
