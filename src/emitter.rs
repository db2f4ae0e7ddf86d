/*
 * Emitter Module
 *
 * Builds particles from the application's current spawn settings and hands
 * them to the particle system. Pointer painting emits one particle every few
 * frames; a beat emits a burst scattered around a point.
 */

use nannou::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::particle::Particle;
use crate::system::{ParticleId, ParticleSystem};

// Beat bursts scatter particles within this distance of the burst point
const BURST_SCATTER: f32 = 10.0;

#[derive(Clone, Debug)]
pub struct Emitter {
    pub radius_min: f32,
    pub radius_max: f32,
    pub drag: f32,
    pub target_separation: f32,
    pub neighboring_distance: f32,
    pub color: Rgb,
    /// Pointer painting emits on every n-th frame
    pub emit_every: u64,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            radius_min: 0.8,
            radius_max: 1.6,
            drag: 0.95,
            target_separation: 20.0,
            neighboring_distance: 50.0,
            color: rgb(1.0, 1.0, 1.0),
            emit_every: 2,
        }
    }
}

impl Emitter {
    /// A particle with a random radius in the configured range and mass = radius².
    pub fn build<R: Rng + ?Sized>(&self, position: Point2, rng: &mut R) -> Particle {
        let radius = rng.gen_range(self.radius_min..=self.radius_max);
        Particle::new(
            position,
            radius,
            radius * radius,
            self.drag,
            self.target_separation,
            self.neighboring_distance,
            self.color,
        )
    }

    /// Emit one particle at `position` if this frame is an emission frame.
    pub fn paint<R: Rng + ?Sized>(
        &self,
        system: &mut ParticleSystem,
        position: Point2,
        frame: u64,
        rng: &mut R,
    ) -> Option<ParticleId> {
        if self.emit_every > 1 && frame % self.emit_every != 0 {
            return None;
        }
        Some(system.add_particle(self.build(position, rng)))
    }

    /// Emit `count` particles scattered around `center`.
    pub fn burst<R: Rng + ?Sized>(
        &self,
        system: &mut ParticleSystem,
        center: Point2,
        count: usize,
        rng: &mut R,
    ) -> Vec<ParticleId> {
        (0..count)
            .map(|_| {
                let angle = rng.gen_range(0.0..TAU);
                let offset = vec2(angle.cos(), angle.sin()) * BURST_SCATTER;
                system.add_particle(self.build(center + offset, rng))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn system() -> ParticleSystem {
        ParticleSystem::with_seed(Rect::from_w_h(800.0, 600.0), 100, 11)
    }

    #[test]
    fn built_particles_use_squared_radius_as_mass() {
        let emitter = Emitter { radius_min: 1.2, radius_max: 1.2, ..Emitter::default() };
        let mut rng = StdRng::seed_from_u64(5);
        let particle = emitter.build(pt2(1.0, 2.0), &mut rng);

        assert!((particle.mass - 1.44).abs() < 1e-5);
        assert_eq!(particle.anchor, pt2(1.0, 2.0));
        assert_eq!(particle.target_separation, 20.0);
    }

    #[test]
    fn painting_respects_emission_rate() {
        let emitter = Emitter { emit_every: 3, ..Emitter::default() };
        let mut rng = StdRng::seed_from_u64(5);
        let mut system = system();

        let emitted = (0..9)
            .filter_map(|frame| emitter.paint(&mut system, pt2(0.0, 0.0), frame, &mut rng))
            .count();
        assert_eq!(emitted, 3);
        assert_eq!(system.len(), 3);
    }

    #[test]
    fn burst_scatters_around_center() {
        let emitter = Emitter::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut system = system();

        let ids = emitter.burst(&mut system, pt2(100.0, -50.0), 6, &mut rng);
        assert_eq!(ids.len(), 6);
        for id in ids {
            let position = system.particle(id).unwrap().position;
            assert!(position.distance(pt2(100.0, -50.0)) <= BURST_SCATTER + 1e-3);
        }
    }
}
