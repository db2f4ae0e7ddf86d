/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains all the
 * adjustable parameters for the particle swarm, plus the small per-frame
 * configuration values handed to the particle system. Parameters are edited
 * through the UI; the struct also provides change detection, slider ranges,
 * validation and the randomizing presets triggered by keys and beats.
 */

use nannou::prelude::*;
use rand::Rng;

use crate::emitter::Emitter;
use crate::error::SwarmError;
use crate::forces::ForceField;

/// Toggle and weight of a single flocking rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Behavior {
    pub enabled: bool,
    pub factor: f32,
}

impl Default for Behavior {
    fn default() -> Self {
        Self { enabled: false, factor: 1.0 }
    }
}

impl Behavior {
    pub fn enabled(factor: f32) -> Self {
        Self { enabled: true, factor }
    }
}

/// Flocking rules applied during one update. Everything is disabled unless
/// the caller turns it on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flocking {
    pub separation: Behavior,
    pub alignment: Behavior,
    pub cohesion: Behavior,
}

/// What happens to a particle that leaves the borders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    Bounce,
    #[default]
    Wrap,
}

/// How the population cap is enforced at the start of an update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Evict at most the single oldest particle per update.
    OnePerFrame,
    /// Evict oldest particles until the cap holds.
    #[default]
    ToCap,
}

/// Automatic spring creation between a newly added particle and the
/// particles already present.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringFormation {
    pub enabled: bool,
    /// Link reach is `(radius_a + radius_b) * radius_scale`
    pub radius_scale: f32,
    /// Pairs whose reach is not below this never link
    pub max_reach: f32,
    pub require_color_match: bool,
    /// Rest length is the current distance times a factor drawn from this range
    pub rest_jitter: (f32, f32),
    pub strength_range: (f32, f32),
}

impl Default for SpringFormation {
    fn default() -> Self {
        Self {
            enabled: true,
            radius_scale: 100.0,
            max_reach: 500.0,
            require_color_match: false,
            rest_jitter: (1.0, 1.4),
            strength_range: (0.0005, 0.002),
        }
    }
}

impl SpringFormation {
    /// Both sampling ranges must be ordered and finite; strengths lie in (0, 1].
    pub fn validate(&self) -> Result<(), SwarmError> {
        let (min_strength, max_strength) = self.strength_range;
        if !(min_strength > 0.0 && min_strength <= max_strength && max_strength <= 1.0) {
            return Err(SwarmError::InvalidParameter {
                name: "spring strength range",
                value: format!("{}..={}", min_strength, max_strength),
            });
        }

        let (min_jitter, max_jitter) = self.rest_jitter;
        if !(min_jitter >= 0.0 && min_jitter <= max_jitter && max_jitter.is_finite()) {
            return Err(SwarmError::InvalidParameter {
                name: "spring rest jitter",
                value: format!("{}..={}", min_jitter, max_jitter),
            });
        }

        Ok(())
    }
}

/// Configuration for a single `ParticleSystem::update` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameConfig {
    pub flocking: Flocking,
    pub boundary: BoundaryPolicy,
}

// Parameters for the simulation that can be adjusted via UI
pub struct SimulationParams {
    pub max_particles: usize,
    pub eviction: EvictionPolicy,
    pub bounce: bool,
    pub flocking_enabled: bool,
    pub separation_factor: f32,
    pub alignment_factor: f32,
    pub cohesion_factor: f32,
    pub emitter: Emitter,
    pub forces: ForceField,
    pub spring_formation: SpringFormation,
    pub bpm: f32,
    pub particles_per_beat: usize,
    pub spawn_on_beat: bool,
    pub auto_randomize_color: bool,
    pub paint_with_pointer: bool,
    pub show_force_centers: bool,
    pub show_panel: bool,
    pub pause_simulation: bool,
    // Performance settings
    pub use_spatial_grid: bool,

    // Internal state for tracking changes
    previous_values: Option<ParamSnapshot>,
}

// A snapshot of parameter values used for change detection
#[derive(Clone, PartialEq)]
struct ParamSnapshot {
    max_particles: usize,
    eviction: EvictionPolicy,
    use_spatial_grid: bool,
    spring_formation: SpringFormation,
    bounce: bool,
    flocking_enabled: bool,
    separation_factor: f32,
    alignment_factor: f32,
    cohesion_factor: f32,
}

/// What changed since the last snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParamChanges {
    pub system_changed: bool,
    pub neighbor_index_changed: bool,
    pub any_changed: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            max_particles: 1200,
            eviction: EvictionPolicy::default(),
            bounce: false,
            flocking_enabled: true,
            separation_factor: 1.2,
            alignment_factor: 0.9,
            cohesion_factor: 0.4,
            emitter: Emitter::default(),
            forces: ForceField::default(),
            spring_formation: SpringFormation::default(),
            bpm: 124.0,
            particles_per_beat: 8,
            spawn_on_beat: true,
            auto_randomize_color: false,
            paint_with_pointer: true,
            show_force_centers: true,
            show_panel: true,
            pause_simulation: false,
            use_spatial_grid: false,
            previous_values: None,
        }
    }
}

impl SimulationParams {
    /// Flocking and boundary configuration for the next update.
    pub fn frame_config(&self) -> FrameConfig {
        let behavior = |factor: f32| Behavior { enabled: self.flocking_enabled, factor };

        FrameConfig {
            flocking: Flocking {
                separation: behavior(self.separation_factor),
                alignment: behavior(self.alignment_factor),
                cohesion: behavior(self.cohesion_factor),
            },
            boundary: if self.bounce { BoundaryPolicy::Bounce } else { BoundaryPolicy::Wrap },
        }
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(self.snapshot());
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            max_particles: self.max_particles,
            eviction: self.eviction,
            use_spatial_grid: self.use_spatial_grid,
            spring_formation: self.spring_formation.clone(),
            bounce: self.bounce,
            flocking_enabled: self.flocking_enabled,
            separation_factor: self.separation_factor,
            alignment_factor: self.alignment_factor,
            cohesion_factor: self.cohesion_factor,
        }
    }

    // Check if any parameters have changed since the last snapshot
    pub fn detect_changes(&self) -> ParamChanges {
        let mut changes = ParamChanges::default();

        // If we don't have previous values, nothing has changed
        if let Some(prev) = &self.previous_values {
            changes.system_changed = self.max_particles != prev.max_particles
                || self.eviction != prev.eviction
                || self.spring_formation != prev.spring_formation;
            changes.neighbor_index_changed = self.use_spatial_grid != prev.use_spatial_grid;
            changes.any_changed = *prev != self.snapshot();
        }

        changes
    }

    /// Reject parameter combinations the simulation cannot use.
    pub fn validate(&self) -> Result<(), SwarmError> {
        self.spring_formation.validate()?;

        if self.emitter.radius_min > self.emitter.radius_max || self.emitter.radius_min <= 0.0 {
            return Err(SwarmError::InvalidParameter {
                name: "particle radius range",
                value: format!("{}..={}", self.emitter.radius_min, self.emitter.radius_max),
            });
        }

        if self.bpm <= 0.0 {
            return Err(SwarmError::InvalidParameter { name: "bpm", value: self.bpm.to_string() });
        }

        Ok(())
    }

    pub fn randomize_particle_color<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.emitter.color = rgb(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
    }

    // Large personal space, small neighborhood
    pub fn set_high_separation<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.emitter.target_separation = rng.gen_range(50.0..100.0);
        self.emitter.neighboring_distance = rng.gen_range(10.0..50.0);
    }

    // Small personal space, large neighborhood
    pub fn set_high_neighboring<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.emitter.target_separation = rng.gen_range(10.0..50.0);
        self.emitter.neighboring_distance = rng.gen_range(50.0..100.0);
    }

    /// Damp each flocking factor by a random share of itself.
    pub fn randomize_flocking<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.separation_factor *= 1.0 - rng.gen::<f32>();
        self.alignment_factor *= 1.0 - rng.gen::<f32>();
        self.cohesion_factor *= 1.0 - rng.gen::<f32>();
    }

    // Get parameter ranges for UI sliders
    pub fn get_max_particles_range() -> std::ops::RangeInclusive<usize> {
        10..=5000
    }

    pub fn get_separation_factor_range() -> std::ops::RangeInclusive<f32> {
        -5.0..=5.0
    }

    pub fn get_alignment_factor_range() -> std::ops::RangeInclusive<f32> {
        -5.0..=5.0
    }

    pub fn get_cohesion_factor_range() -> std::ops::RangeInclusive<f32> {
        -50.0..=50.0
    }

    pub fn get_distance_range() -> std::ops::RangeInclusive<f32> {
        0.1..=100.0
    }

    pub fn get_bpm_range() -> std::ops::RangeInclusive<f32> {
        60.0..=255.0
    }

    pub fn get_particles_per_beat_range() -> std::ops::RangeInclusive<usize> {
        0..=40
    }

    pub fn get_pull_factor_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1.0
    }

    pub fn get_attraction_factor_range() -> std::ops::RangeInclusive<f32> {
        0.0..=10.0
    }

    pub fn get_repulsion_factor_range() -> std::ops::RangeInclusive<f32> {
        -10.0..=10.0
    }

    pub fn get_repulsion_radius_range() -> std::ops::RangeInclusive<f32> {
        0.0..=800.0
    }
}
