/*
 * Particle Swarm - Module Definitions
 *
 * This file defines the module structure for the particle swarm.
 * The simulation core (particles, springs, the particle system and neighbor
 * queries) is independent of the window; the remaining modules form the
 * interactive nannou application around it.
 */

// Re-export key components for easier access
pub use app::Model;
pub use beat::BpmTapper;
pub use debug::DebugInfo;
pub use emitter::Emitter;
pub use error::SwarmError;
pub use forces::ForceField;
pub use neighbors::{BruteForce, NeighborQuery, SpatialGrid};
pub use params::{Behavior, BoundaryPolicy, EvictionPolicy, Flocking, FrameConfig, SimulationParams, SpringFormation};
pub use particle::Particle;
pub use spring::Spring;
pub use system::{ParticleId, ParticleSystem, SpringId};

// Define modules
pub mod app;
pub mod beat;
pub mod debug;
pub mod emitter;
pub mod error;
pub mod forces;
pub mod input;
pub mod neighbors;
pub mod params;
pub mod particle;
pub mod renderer;
pub mod spring;
pub mod system;
pub mod ui;

// Constants
pub const DEFAULT_MAX_SPEED: f32 = 1.0;
pub const DEFAULT_MAX_FORCE: f32 = 0.05;
pub const MAX_PARTICLE_RADIUS: f32 = 10.0;
pub const RADIUS_RATIO_SCALE: f32 = 1.6;
pub const FILLED_RADIUS_THRESHOLD: f32 = 5.0;
pub const CONNECTION_DISTANCE: f32 = 100.0;
