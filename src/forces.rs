/*
 * Force Field Module
 *
 * Ambient forces injected into the particles before every update:
 * - Pull to center: a spring-like pull towards the force center
 * - Attraction: a constant-magnitude pull towards the attraction center
 * - Repulsion: a push away from the attraction center, growing towards it
 *
 * Forces only last one integration step, so the field is applied every frame.
 */

use nannou::prelude::*;

use crate::particle::Particle;
use crate::system::ParticleSystem;

#[derive(Clone, Debug, PartialEq)]
pub struct ForceField {
    pub force_center: Point2,
    pub attraction_center: Point2,
    pub pull_to_center: bool,
    pub pull_factor: f32,
    pub use_attraction: bool,
    pub attraction_factor: f32,
    pub use_repulsion: bool,
    pub repulsion_factor: f32,
    pub repulsion_radius: f32,
}

impl Default for ForceField {
    fn default() -> Self {
        Self {
            force_center: Point2::ZERO,
            attraction_center: Point2::ZERO,
            pull_to_center: true,
            pull_factor: 0.01,
            use_attraction: false,
            attraction_factor: 0.05,
            use_repulsion: false,
            repulsion_factor: 0.8,
            repulsion_radius: 200.0,
        }
    }
}

impl ForceField {
    /// Move both centers, e.g. when the window is resized.
    pub fn recenter(&mut self, center: Point2) {
        self.force_center = center;
        self.attraction_center = center;
    }

    /// Send the attraction center back to `rest` once the pointer lets go.
    pub fn release_attraction(&mut self, rest: Point2) {
        self.attraction_center = rest;
    }

    /// Total ambient force acting on a particle this frame.
    pub fn force_on(&self, particle: &Particle) -> Vec2 {
        let mut force = Vec2::ZERO;

        if self.pull_to_center {
            force += (self.force_center - particle.position) * self.pull_factor;
        }

        if self.use_attraction {
            let towards = self.attraction_center - particle.position;
            let d = towards.length();
            if d > 0.0 {
                force += towards / d * self.attraction_factor;
            }
        }

        if self.use_repulsion {
            let away = particle.position - self.attraction_center;
            let d = away.length();
            if d > 0.0 && d < self.repulsion_radius {
                force += away / d * self.repulsion_factor * (self.repulsion_radius - d);
            }
        }

        force
    }

    pub fn apply(&self, system: &mut ParticleSystem) {
        system.accumulate_forces(|particle| self.force_on(particle));
    }
}
