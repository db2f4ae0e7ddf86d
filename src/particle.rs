/*
 * Particle Module
 *
 * This module defines the Particle struct and its behavior.
 * A particle integrates its own motion and steers with three flocking rules:
 * 1. Separation: Avoid crowding neighbors closer than the target separation
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * Flocking toggles and weights are not stored on the particle; they arrive
 * every frame through a `Flocking` value.
 */

use nannou::prelude::*;

use crate::params::{BoundaryPolicy, Flocking};
use crate::{DEFAULT_MAX_FORCE, DEFAULT_MAX_SPEED, MAX_PARTICLE_RADIUS, RADIUS_RATIO_SCALE};

// Distance under which steering with slowdown scales the desired speed down
const ARRIVAL_DISTANCE: f32 = 100.0;

#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Point2,
    pub previous_position: Point2,
    pub anchor: Point2,
    pub velocity: Vec2,
    pub forces: Vec2,
    pub radius: f32,
    pub mass: f32,
    pub drag: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub color: Rgb,
    pub target_separation: f32,
    pub neighboring_distance: f32,
}

impl Particle {
    pub fn new(
        position: Point2,
        radius: f32,
        mass: f32,
        drag: f32,
        target_separation: f32,
        neighboring_distance: f32,
        color: Rgb,
    ) -> Self {
        // The drawn radius follows the separation/neighboring ratio
        let radius = if neighboring_distance > 0.0 {
            target_separation / neighboring_distance * RADIUS_RATIO_SCALE
        } else {
            radius
        };

        Self {
            position,
            previous_position: position,
            anchor: position,
            velocity: Vec2::ZERO,
            forces: Vec2::ZERO,
            radius: radius.min(MAX_PARTICLE_RADIUS),
            mass,
            drag,
            max_speed: DEFAULT_MAX_SPEED,
            max_force: DEFAULT_MAX_FORCE,
            color,
            target_separation,
            neighboring_distance,
        }
    }

    /// Inverse mass used by integration and spring relaxation.
    /// Non-positive masses behave as immovable.
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    // Accumulate an external force for the next integration step
    pub fn apply_force(&mut self, force: Vec2) {
        self.forces += force;
    }

    /// Integrate one step. Forces only last for a single step and have to be
    /// re-applied every frame.
    pub fn update(&mut self) {
        self.previous_position = self.position;
        self.position += self.velocity + self.forces * self.inverse_mass();
        self.forces = Vec2::ZERO;
    }

    // Flock against a set of neighbors (may include the particle itself)
    pub fn flock<'a, I>(&mut self, neighbors: I, flocking: &Flocking)
    where
        I: IntoIterator<Item = &'a Particle>,
        I::IntoIter: Clone,
    {
        let acceleration = self.flocking_acceleration(neighbors, flocking);
        self.apply_acceleration(acceleration);
    }

    /// Weighted sum of the enabled steering behaviors, in the order
    /// separation, alignment, cohesion.
    pub fn flocking_acceleration<'a, I>(&self, neighbors: I, flocking: &Flocking) -> Vec2
    where
        I: IntoIterator<Item = &'a Particle>,
        I::IntoIter: Clone,
    {
        let neighbors = neighbors.into_iter();
        let mut acceleration = Vec2::ZERO;

        if flocking.separation.enabled {
            acceleration += self.separate(neighbors.clone()) * flocking.separation.factor;
        }
        if flocking.alignment.enabled {
            acceleration += self.align(neighbors.clone()) * flocking.alignment.factor;
        }
        if flocking.cohesion.enabled {
            acceleration += self.cohesion(neighbors) * flocking.cohesion.factor;
        }

        acceleration
    }

    pub fn apply_acceleration(&mut self, acceleration: Vec2) {
        self.velocity = limit(self.velocity + acceleration, self.max_speed);
    }

    // Calculate separation force (avoid crowding neighbors)
    pub fn separate<'a, I>(&self, neighbors: I) -> Vec2
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let mut steering = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            let diff = self.position - other.position;
            let d = diff.length();

            if d > 0.0 && d < self.target_separation {
                // Weight by distance
                steering += diff / d / d;
                count += 1;
            }
        }

        if count > 0 {
            steering /= count as f32;
        }

        self.steer_velocity(steering)
    }

    // Calculate alignment force (steer towards average heading of neighbors)
    pub fn align<'a, I>(&self, neighbors: I) -> Vec2
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let mut steering = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            let d = self.position.distance(other.position);

            if d > 0.0 && d < self.neighboring_distance {
                steering += other.velocity;
                count += 1;
            }
        }

        if count > 0 {
            steering /= count as f32;
        }

        self.steer_velocity(steering)
    }

    // Calculate cohesion force (steer towards average position of neighbors)
    pub fn cohesion<'a, I>(&self, neighbors: I) -> Vec2
    where
        I: IntoIterator<Item = &'a Particle>,
    {
        let mut center = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            let d = self.position.distance(other.position);

            if d > 0.0 && d < self.neighboring_distance {
                center += other.position;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }

        self.steer(center / count as f32, false)
    }

    /// Steering force towards `target`: desired velocity minus current
    /// velocity, limited to `max_force`. With `slowdown` the desired speed
    /// ramps down inside the arrival distance.
    pub fn steer(&self, target: Point2, slowdown: bool) -> Vec2 {
        let desired = target - self.position;
        let d = desired.length();

        if d <= 0.0 {
            return Vec2::ZERO;
        }

        let speed = if slowdown && d < ARRIVAL_DISTANCE {
            self.max_speed * (d / ARRIVAL_DISTANCE)
        } else {
            self.max_speed
        };

        limit(desired / d * speed - self.velocity, self.max_force)
    }

    // Reynolds steering for a desired heading: Steering = Desired - Velocity
    fn steer_velocity(&self, heading: Vec2) -> Vec2 {
        let length = heading.length();
        if length <= 0.0 {
            return Vec2::ZERO;
        }

        let desired = heading / length * self.max_speed;
        limit(desired - self.velocity, self.max_force)
    }

    /// Apply the boundary policy against `bounds`.
    pub fn borders(&mut self, bounds: Rect, policy: BoundaryPolicy) {
        match policy {
            BoundaryPolicy::Bounce => self.bounce_edges(bounds),
            BoundaryPolicy::Wrap => self.wrap_edges(bounds),
        }
    }

    // Reflect the velocity component of every crossed edge back inside
    fn bounce_edges(&mut self, bounds: Rect) {
        if self.position.x <= bounds.left() {
            self.velocity.x = self.velocity.x.abs();
        } else if self.position.x >= bounds.right() {
            self.velocity.x = -self.velocity.x.abs();
        }

        if self.position.y <= bounds.bottom() {
            self.velocity.y = self.velocity.y.abs();
        } else if self.position.y >= bounds.top() {
            self.velocity.y = -self.velocity.y.abs();
        }
    }

    // Move a particle that left an edge by some overshoot to the opposite
    // edge, inset by radius plus that overshoot
    fn wrap_edges(&mut self, bounds: Rect) {
        if self.position.x < bounds.left() {
            let overshoot = bounds.left() - self.position.x;
            self.position.x = bounds.right() - (self.radius + overshoot);
        } else if self.position.x > bounds.right() {
            let overshoot = self.position.x - bounds.right();
            self.position.x = bounds.left() + self.radius + overshoot;
        }

        if self.position.y < bounds.bottom() {
            let overshoot = bounds.bottom() - self.position.y;
            self.position.y = bounds.top() - (self.radius + overshoot);
        } else if self.position.y > bounds.top() {
            let overshoot = self.position.y - bounds.top();
            self.position.y = bounds.bottom() + self.radius + overshoot;
        }
    }
}

/// Clamp the magnitude of `v` to `max`.
#[inline]
pub fn limit(v: Vec2, max: f32) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > max * max {
        v * (max / length_squared.sqrt())
    } else {
        v
    }
}
