/*
 * Spring Module
 *
 * A spring keeps two particles near a rest distance. It holds handles to its
 * endpoints, never the particles themselves; the particle system owns both
 * and removes a spring together with either of its endpoints.
 */

use nannou::prelude::*;

use crate::particle::Particle;
use crate::system::ParticleId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub a: ParticleId,
    pub b: ParticleId,
    pub rest: f32,
    pub strength: f32,
}

impl Spring {
    pub fn new(a: ParticleId, b: ParticleId, rest: f32, strength: f32) -> Self {
        Self { a, b, rest, strength }
    }

    pub fn connects(&self, id: ParticleId) -> bool {
        self.a == id || self.b == id
    }

    /// Single relaxation step towards the rest distance, split between the
    /// endpoints by inverse mass. Coincident endpoints are left untouched.
    pub fn relax(&self, a: &mut Particle, b: &mut Particle) {
        let delta = a.position - b.position;
        let length = delta.length();
        let inv_mass_a = a.inverse_mass();
        let inv_mass_b = b.inverse_mass();
        let inv_mass_sum = inv_mass_a + inv_mass_b;

        if length <= 0.0 || inv_mass_sum <= 0.0 {
            return;
        }

        let norm_dist = (length - self.rest) / (length * inv_mass_sum) * self.strength;
        a.position -= delta * norm_dist * inv_mass_a;
        b.position += delta * norm_dist * inv_mass_b;
    }
}

/// Distance between the two endpoint positions.
pub fn span(a: Point2, b: Point2) -> f32 {
    a.distance(b)
}
