/*
 * Particle System Module
 *
 * The particle system owns every particle and spring and drives one frame of
 * the simulation:
 * 1. Enforce the population cap by evicting the oldest particles
 * 2. For each particle in spawn order: apply the boundary policy, integrate,
 *    then flock against the live population
 * 3. Relax every spring in creation order
 *
 * Particles and springs live in generational slot maps. Springs refer to
 * their endpoints by handle, and destroying a particle destroys the springs
 * attached to it, so no spring ever refers to a missing particle.
 */

use std::collections::HashSet;

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::{new_key_type, SlotMap};

use crate::error::SwarmError;
use crate::neighbors::{BruteForce, NeighborQuery};
use crate::params::{EvictionPolicy, FrameConfig, SpringFormation};
use crate::particle::Particle;
use crate::spring::Spring;

new_key_type! {
    /// Stable handle for a particle owned by a `ParticleSystem`.
    pub struct ParticleId;

    /// Stable handle for a spring owned by a `ParticleSystem`.
    pub struct SpringId;
}

pub struct ParticleSystem {
    particles: SlotMap<ParticleId, Particle>,
    order: Vec<ParticleId>,
    springs: SlotMap<SpringId, Spring>,
    spring_order: Vec<SpringId>,
    pub max_particles: usize,
    pub eviction: EvictionPolicy,
    pub borders: Rect,
    pub spring_formation: SpringFormation,
    neighbor_query: Box<dyn NeighborQuery>,
    neighbor_buffer: Vec<ParticleId>,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(borders: Rect, max_particles: usize) -> Self {
        Self::with_rng(borders, max_particles, StdRng::from_entropy())
    }

    /// Same as `new`, with a fixed seed for the spring formation jitter.
    pub fn with_seed(borders: Rect, max_particles: usize, seed: u64) -> Self {
        Self::with_rng(borders, max_particles, StdRng::seed_from_u64(seed))
    }

    fn with_rng(borders: Rect, max_particles: usize, rng: StdRng) -> Self {
        Self {
            particles: SlotMap::with_key(),
            order: Vec::new(),
            springs: SlotMap::with_key(),
            spring_order: Vec::new(),
            max_particles,
            eviction: EvictionPolicy::default(),
            borders,
            spring_formation: SpringFormation::default(),
            neighbor_query: Box::new(BruteForce::default()),
            neighbor_buffer: Vec::new(),
            rng,
        }
    }

    pub fn set_neighbor_query(&mut self, query: Box<dyn NeighborQuery>) {
        self.neighbor_query = query;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn spring_count(&self) -> usize {
        self.spring_order.len()
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.particles.contains_key(id)
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn spring(&self, id: SpringId) -> Option<&Spring> {
        self.springs.get(id)
    }

    /// Particles in spawn order, oldest first.
    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> + '_ {
        self.order.iter().filter_map(move |&id| self.particles.get(id).map(|p| (id, p)))
    }

    /// Springs in creation order.
    pub fn springs(&self) -> impl Iterator<Item = (SpringId, &Spring)> + '_ {
        self.spring_order.iter().filter_map(move |&id| self.springs.get(id).map(|s| (id, s)))
    }

    /// The two endpoints of a spring.
    pub fn spring_endpoints(&self, id: SpringId) -> Option<(&Particle, &Particle)> {
        let spring = self.springs.get(id)?;
        Some((self.particles.get(spring.a)?, self.particles.get(spring.b)?))
    }

    /// Add `f(particle)` to the force accumulator of every particle. This is
    /// how exogenous forces reach the simulation before `update`.
    pub fn accumulate_forces<F>(&mut self, mut f: F)
    where
        F: FnMut(&Particle) -> Vec2,
    {
        for &id in &self.order {
            if let Some(particle) = self.particles.get_mut(id) {
                let force = f(particle);
                particle.apply_force(force);
            }
        }
    }

    /// Add a force to a single particle.
    pub fn apply_force(&mut self, id: ParticleId, force: Vec2) -> Result<(), SwarmError> {
        let particle = self.particles.get_mut(id).ok_or(SwarmError::UnknownParticle(id))?;
        particle.apply_force(force);
        Ok(())
    }

    /// Append a particle, then link it to nearby particles when spring
    /// formation is enabled.
    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        let id = self.particles.insert(particle);
        self.order.push(id);

        if self.spring_formation.enabled {
            self.form_springs(id);
        }

        id
    }

    // Link the new particle to every existing one within reach
    fn form_springs(&mut self, id: ParticleId) {
        let formation = &self.spring_formation;
        if let Err(e) = formation.validate() {
            log::debug!("Skipping spring formation: {}", e);
            return;
        }
        let (min_jitter, max_jitter) = formation.rest_jitter;
        let (min_strength, max_strength) = formation.strength_range;

        let new = match self.particles.get(id) {
            Some(particle) => particle,
            None => return,
        };

        let mut links = Vec::new();
        for &other_id in &self.order {
            if other_id == id {
                continue;
            }
            let other = match self.particles.get(other_id) {
                Some(other) => other,
                None => continue,
            };

            if formation.require_color_match && !same_color(new.color, other.color) {
                continue;
            }

            let d = new.position.distance(other.position);
            let reach = (new.radius + other.radius) * formation.radius_scale;

            if d > 0.0 && d <= reach && reach < formation.max_reach {
                let rest = d * self.rng.gen_range(min_jitter..=max_jitter);
                let strength = self.rng.gen_range(min_strength..=max_strength);
                links.push(Spring::new(id, other_id, rest, strength));
            }
        }

        for spring in links {
            let spring_id = self.springs.insert(spring);
            self.spring_order.push(spring_id);
        }
    }

    /// Add a spring between two live particles.
    pub fn add_spring(
        &mut self,
        a: ParticleId,
        b: ParticleId,
        rest: f32,
        strength: f32,
    ) -> Result<SpringId, SwarmError> {
        for id in [a, b] {
            if !self.particles.contains_key(id) {
                return Err(SwarmError::UnknownParticle(id));
            }
        }
        if !(strength > 0.0 && strength <= 1.0) {
            return Err(SwarmError::InvalidStrength(strength));
        }

        let id = self.springs.insert(Spring::new(a, b, rest, strength));
        self.spring_order.push(id);
        Ok(id)
    }

    pub fn destroy_spring(&mut self, id: SpringId) -> Option<Spring> {
        let spring = self.springs.remove(id)?;
        self.spring_order.retain(|&s| s != id);
        Some(spring)
    }

    /// Remove a particle together with every spring attached to it.
    pub fn destroy_particle(&mut self, id: ParticleId) -> Option<Particle> {
        let particle = self.particles.remove(id)?;
        self.order.retain(|&p| p != id);
        self.remove_springs_where(|spring| spring.connects(id));

        Some(particle)
    }

    // One pass over the springs, dropping every spring the predicate selects
    // along with any spring whose slot is already gone
    fn remove_springs_where<F>(&mut self, mut detach: F)
    where
        F: FnMut(&Spring) -> bool,
    {
        let springs = &mut self.springs;
        self.spring_order.retain(|&spring_id| {
            let attached = springs.get(spring_id).map_or(true, &mut detach);
            if attached {
                springs.remove(spring_id);
            }
            !attached
        });
    }

    // Evict the oldest particles while the population is above the cap
    fn enforce_population_cap(&mut self) {
        let excess = self.order.len().saturating_sub(self.max_particles);
        let evictions = match self.eviction {
            EvictionPolicy::OnePerFrame => excess.min(1),
            EvictionPolicy::ToCap => excess,
        };

        if evictions == 0 {
            return;
        }

        let evicted: HashSet<ParticleId> = self.order.drain(..evictions).collect();
        for &id in &evicted {
            self.particles.remove(id);
        }
        self.remove_springs_where(|spring| evicted.contains(&spring.a) || evicted.contains(&spring.b));
        log::debug!("Evicted {} particles, {} remain", evictions, self.order.len());
    }

    /// Advance the simulation by one frame.
    pub fn update(&mut self, config: &FrameConfig) {
        self.enforce_population_cap();

        self.neighbor_query.rebuild(&self.particles, &self.order, self.borders);

        for index in 0..self.order.len() {
            let id = self.order[index];

            let (from, position, radius) = match self.particles.get_mut(id) {
                Some(particle) => {
                    let from = particle.position;
                    particle.borders(self.borders, config.boundary);
                    particle.update();
                    (from, particle.position, particle.target_separation.max(particle.neighboring_distance))
                }
                None => continue,
            };
            self.neighbor_query.moved(id, from, position);

            self.neighbor_buffer.clear();
            self.neighbor_query.candidates(position, radius, &mut self.neighbor_buffer);

            let particles = &self.particles;
            let acceleration = match particles.get(id) {
                Some(particle) => particle.flocking_acceleration(
                    self.neighbor_buffer.iter().filter_map(|n| particles.get(*n)),
                    &config.flocking,
                ),
                None => continue,
            };

            if let Some(particle) = self.particles.get_mut(id) {
                particle.apply_acceleration(acceleration);
            }
        }

        for &spring_id in &self.spring_order {
            if let Some(spring) = self.springs.get(spring_id) {
                if let Some([a, b]) = self.particles.get_disjoint_mut([spring.a, spring.b]) {
                    spring.relax(a, b);
                }
            }
        }
    }

    /// Destroy every spring, then every particle.
    pub fn clear(&mut self) {
        log::debug!("Clearing {} particles and {} springs", self.order.len(), self.spring_order.len());
        self.springs.clear();
        self.spring_order.clear();
        self.particles.clear();
        self.order.clear();
    }
}

/// Exact color equality, used by the spring formation color gate.
pub fn same_color(a: Rgb, b: Rgb) -> bool {
    a.red == b.red && a.green == b.green && a.blue == b.blue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Behavior, BoundaryPolicy, Flocking};

    const EPSILON: f32 = 1e-4;

    fn bounds() -> Rect {
        Rect::from_w_h(1000.0, 1000.0)
    }

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle::new(pt2(x, y), 1.0, 1.0, 0.95, 20.0, 50.0, rgb(1.0, 1.0, 1.0))
    }

    fn quiet_system(max_particles: usize) -> ParticleSystem {
        let mut system = ParticleSystem::with_seed(bounds(), max_particles, 1);
        system.spring_formation.enabled = false;
        system
    }

    #[test]
    fn update_resets_forces_of_every_particle() {
        let mut system = quiet_system(10);
        for i in 0..4 {
            system.add_particle(particle_at(i as f32 * 40.0, 0.0));
        }
        system.accumulate_forces(|p| vec2(1.0, p.position.x));
        system.update(&FrameConfig::default());

        for (_, particle) in system.particles() {
            assert_eq!(particle.forces, Vec2::ZERO);
        }
    }

    #[test]
    fn destroying_a_particle_removes_its_springs() {
        let mut system = quiet_system(10);
        let hub = system.add_particle(particle_at(0.0, 0.0));
        let a = system.add_particle(particle_at(10.0, 0.0));
        let b = system.add_particle(particle_at(0.0, 10.0));
        let c = system.add_particle(particle_at(-10.0, 0.0));

        system.add_spring(hub, a, 10.0, 0.5).unwrap();
        system.add_spring(hub, b, 10.0, 0.5).unwrap();
        system.add_spring(c, hub, 10.0, 0.5).unwrap();
        let kept = system.add_spring(a, b, 10.0, 0.5).unwrap();

        assert!(system.destroy_particle(hub).is_some());
        assert_eq!(system.spring_count(), 1);
        assert!(system.springs().all(|(_, s)| !s.connects(hub)));
        assert!(system.spring(kept).is_some());
        assert!(system.destroy_particle(hub).is_none());
    }

    #[test]
    fn springs_require_live_endpoints_and_valid_strength() {
        let mut system = quiet_system(10);
        let a = system.add_particle(particle_at(0.0, 0.0));
        let b = system.add_particle(particle_at(5.0, 0.0));
        system.destroy_particle(b);

        assert_eq!(system.add_spring(a, b, 1.0, 0.5), Err(SwarmError::UnknownParticle(b)));
        let c = system.add_particle(particle_at(9.0, 0.0));
        assert_eq!(system.add_spring(a, c, 1.0, 0.0), Err(SwarmError::InvalidStrength(0.0)));
        assert_eq!(system.add_spring(a, c, 1.0, 1.5), Err(SwarmError::InvalidStrength(1.5)));
    }

    #[test]
    fn eviction_to_cap_removes_oldest() {
        let mut system = quiet_system(5);
        let ids: Vec<_> = (0..8).map(|i| system.add_particle(particle_at(i as f32 * 60.0 - 400.0, 0.0))).collect();
        system.update(&FrameConfig::default());

        assert_eq!(system.len(), 5);
        for id in &ids[..3] {
            assert!(!system.contains(*id));
        }
        let remaining: Vec<_> = system.particles().map(|(id, _)| id).collect();
        assert_eq!(remaining, ids[3..].to_vec());
    }

    #[test]
    fn eviction_one_per_frame_removes_single_oldest() {
        let mut system = quiet_system(5);
        system.eviction = EvictionPolicy::OnePerFrame;
        let ids: Vec<_> = (0..8).map(|i| system.add_particle(particle_at(i as f32 * 60.0 - 400.0, 0.0))).collect();

        system.update(&FrameConfig::default());
        assert_eq!(system.len(), 7);
        assert!(!system.contains(ids[0]));
        assert!(system.contains(ids[1]));

        system.update(&FrameConfig::default());
        system.update(&FrameConfig::default());
        assert_eq!(system.len(), 5);
        system.update(&FrameConfig::default());
        assert_eq!(system.len(), 5);
    }

    #[test]
    fn eviction_to_cap_drops_springs_of_every_evicted_particle() {
        let mut system = quiet_system(3);
        let ids: Vec<_> = (0..6).map(|i| system.add_particle(particle_at(i as f32 * 60.0 - 400.0, 0.0))).collect();
        system.add_spring(ids[0], ids[4], 60.0, 0.5).unwrap();
        system.add_spring(ids[1], ids[2], 60.0, 0.5).unwrap();
        let survivor = system.add_spring(ids[3], ids[5], 120.0, 0.5).unwrap();
        system.add_spring(ids[5], ids[2], 180.0, 0.5).unwrap();

        system.update(&FrameConfig::default());

        assert_eq!(system.len(), 3);
        let springs: Vec<_> = system.springs().map(|(id, _)| id).collect();
        assert_eq!(springs, vec![survivor]);
    }

    #[test]
    fn reversed_formation_ranges_skip_linking() {
        let mut system = ParticleSystem::with_seed(bounds(), 10, 3);
        system.spring_formation.rest_jitter = (1.4, 1.0);
        system.add_particle(particle_at(0.0, 0.0));
        system.add_particle(particle_at(50.0, 0.0));
        assert_eq!(system.len(), 2);
        assert_eq!(system.spring_count(), 0);

        system.spring_formation.rest_jitter = (1.0, 1.4);
        system.spring_formation.strength_range = (0.002, 0.0005);
        system.add_particle(particle_at(0.0, 50.0));
        assert_eq!(system.spring_count(), 0);

        system.spring_formation.strength_range = (0.0005, 0.002);
        system.add_particle(particle_at(50.0, 50.0));
        assert_eq!(system.spring_count(), 3);
    }

    #[test]
    fn spring_at_rest_is_stable_through_update() {
        let mut system = quiet_system(10);
        let a = system.add_particle(particle_at(0.0, 0.0));
        let b = system.add_particle(particle_at(30.0, 0.0));
        system.add_spring(a, b, 30.0, 0.8).unwrap();

        system.update(&FrameConfig::default());

        let pa = system.particle(a).unwrap().position;
        let pb = system.particle(b).unwrap().position;
        assert!((pa - pt2(0.0, 0.0)).length() < EPSILON);
        assert!((pb - pt2(30.0, 0.0)).length() < EPSILON);
    }

    #[test]
    fn automatic_springs_link_close_particles() {
        let mut system = ParticleSystem::with_seed(bounds(), 10, 3);
        let a = system.add_particle(particle_at(0.0, 0.0));
        // Reach is (0.64 + 0.64) * 100 = 128
        let b = system.add_particle(particle_at(100.0, 0.0));
        let far = system.add_particle(particle_at(400.0, 0.0));

        assert_eq!(system.spring_count(), 1);
        let (_, spring) = system.springs().next().unwrap();
        assert!(spring.connects(a) && spring.connects(b));
        assert!(!spring.connects(far));
        assert!(spring.rest >= 100.0 && spring.rest <= 140.0 + EPSILON);
        assert!(spring.strength > 0.0 && spring.strength <= 0.002);
    }

    #[test]
    fn color_gate_blocks_mismatched_links() {
        let mut system = ParticleSystem::with_seed(bounds(), 10, 3);
        system.spring_formation.require_color_match = true;

        system.add_particle(particle_at(0.0, 0.0));
        let mut red = particle_at(50.0, 0.0);
        red.color = rgb(1.0, 0.0, 0.0);
        system.add_particle(red);
        assert_eq!(system.spring_count(), 0);

        system.add_particle(particle_at(0.0, 50.0));
        assert_eq!(system.spring_count(), 1);
    }

    #[test]
    fn clear_empties_both_collections() {
        let mut system = ParticleSystem::with_seed(bounds(), 10, 3);
        for i in 0..5 {
            system.add_particle(particle_at(i as f32 * 10.0, 0.0));
        }
        assert!(system.spring_count() > 0);

        system.clear();
        assert!(system.is_empty());
        assert_eq!(system.spring_count(), 0);
        system.update(&FrameConfig::default());
    }

    #[test]
    fn flocking_update_keeps_speeds_bounded() {
        let mut system = quiet_system(100);
        for i in 0..30 {
            let mut p = particle_at((i % 6) as f32 * 8.0, (i / 6) as f32 * 8.0);
            p.velocity = vec2(((i * 7) % 5) as f32 * 0.2 - 0.4, 0.3);
            system.add_particle(p);
        }

        let config = FrameConfig {
            flocking: Flocking {
                separation: Behavior::enabled(1.2),
                alignment: Behavior::enabled(0.9),
                cohesion: Behavior::enabled(0.4),
            },
            boundary: BoundaryPolicy::Bounce,
        };
        for _ in 0..20 {
            system.update(&config);
            for (_, p) in system.particles() {
                assert!(p.velocity.length() <= p.max_speed + EPSILON);
            }
        }
    }
}
