mod particle;
mod particle_system;
mod quadtree;
mod barnes_hut;
mod accuracy;

pub use particle::*;
pub use particle_system::*;
pub use quadtree::*;
pub use barnes_hut::*;
pub use accuracy::*;

#[cfg(test)]
mod particle_system_tests;
