//! Error types for the particle swarm.
//!
//! The simulation itself never fails; degenerate numeric cases are guarded.
//! These errors cover the API edges: stale handles and invalid parameters.

use thiserror::Error;

use crate::system::ParticleId;

#[derive(Debug, Error, PartialEq)]
pub enum SwarmError {
    /// A handle refers to a particle that was destroyed or never existed.
    #[error("particle {0:?} is not part of the system")]
    UnknownParticle(ParticleId),
    /// Spring strength must lie in (0, 1].
    #[error("spring strength {0} must be in (0, 1]")]
    InvalidStrength(f32),
    /// A configuration value is out of range.
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
}
