use crate::utils;

pub const DEFAULT_BARNES_HUT_CONFIG: utils::BarnesHutConfig = utils::BarnesHutConfig {
    gravitational_constant: 1.0,
    opening_angle: 0.5,
    mass_epsilon: 1e-12,
    min_separation: 0.0,
    leeway: 1e-3,
    workers: 4,
};

/// Trees never subdivide past this depth; coincident particles share a bucket instead.
pub const MAX_TREE_DEPTH: u32 = 48;
