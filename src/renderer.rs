/*
 * Renderer Module
 *
 * This module handles the rendering of the particle swarm. Each frame draws:
 * - Proximity connections between every pair of particles closer than the
 *   connection distance, fading and blending colors with distance
 * - Particles: small ones filled, large ones as translucent outlines
 * - Springs as lines fading with their current length
 * - The force and attraction centers when enabled
 *
 * The style decisions are plain functions so they can be tested without a
 * window; the nannou drawing only consumes them.
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::particle::Particle;
use crate::spring::span;
use crate::system::ParticleSystem;
use crate::{CONNECTION_DISTANCE, FILLED_RADIUS_THRESHOLD};

const OUTLINE_ALPHA: f32 = 0.7;
const CONNECTION_ALPHA: f32 = 0.8;
// Connections stop short of the particle outline by this gap
const CONNECTION_GAP: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParticleStyle {
    Filled,
    Stroked { alpha: f32 },
}

pub fn particle_style(particle: &Particle) -> ParticleStyle {
    if particle.radius < FILLED_RADIUS_THRESHOLD {
        ParticleStyle::Filled
    } else {
        ParticleStyle::Stroked { alpha: OUTLINE_ALPHA }
    }
}

/// Fade factor `1 - distance / CONNECTION_DISTANCE`, clamped to be non-negative.
pub fn distance_fade(distance: f32) -> f32 {
    (1.0 - distance / CONNECTION_DISTANCE).max(0.0)
}

/// A line to draw between two nearby particles.
#[derive(Clone, Copy, Debug)]
pub struct Connection {
    pub start: Point2,
    pub end: Point2,
    pub color: Rgb,
    pub alpha: f32,
}

pub fn connection(first: &Particle, second: &Particle) -> Option<Connection> {
    let offset = second.position - first.position;
    let distance = offset.length();
    let fade = distance_fade(distance);

    if distance <= 0.0 || fade <= 0.0 {
        return None;
    }

    let direction = offset / distance;
    Some(Connection {
        start: first.position + direction * (first.radius + CONNECTION_GAP),
        end: second.position - direction * (second.radius + CONNECTION_GAP),
        color: lerp_color(first.color, second.color, fade),
        alpha: fade * CONNECTION_ALPHA,
    })
}

/// Every connection of the current population, each unordered pair once.
pub fn connections(system: &ParticleSystem) -> Vec<Connection> {
    let particles: Vec<&Particle> = system.particles().map(|(_, p)| p).collect();
    let mut result = Vec::new();

    for (i, first) in particles.iter().enumerate() {
        for second in &particles[i + 1..] {
            if let Some(c) = connection(first, second) {
                result.push(c);
            }
        }
    }

    result
}

fn lerp_color(a: Rgb, b: Rgb, t: f32) -> Rgb {
    rgb(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
    )
}

pub fn draw_particle(draw: &Draw, particle: &Particle) {
    let c = particle.color;
    match particle_style(particle) {
        ParticleStyle::Filled => {
            draw.ellipse()
                .xy(particle.position)
                .radius(particle.radius)
                .color(c);
        }
        ParticleStyle::Stroked { alpha } => {
            draw.ellipse()
                .xy(particle.position)
                .radius(particle.radius)
                .no_fill()
                .stroke(rgba(c.red, c.green, c.blue, alpha))
                .stroke_weight(1.0);
        }
    }
}

pub fn draw_system(draw: &Draw, system: &ParticleSystem) {
    for c in connections(system) {
        draw.line()
            .start(c.start)
            .end(c.end)
            .weight(1.0)
            .color(rgba(c.color.red, c.color.green, c.color.blue, c.alpha));
    }

    for (_, particle) in system.particles() {
        draw_particle(draw, particle);
    }

    for (id, _) in system.springs() {
        if let Some((a, b)) = system.spring_endpoints(id) {
            let alpha = distance_fade(span(a.position, b.position));
            draw.line()
                .start(a.position)
                .end(b.position)
                .weight(1.0)
                .color(rgba(0.5, 0.7, 0.3, alpha));
        }
    }
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    draw_system(&draw, &model.system);

    if model.params.show_force_centers {
        let forces = &model.params.forces;
        draw.ellipse()
            .xy(forces.force_center)
            .radius(4.0)
            .color(rgba(0.0, 1.0, 0.0, 0.6));
        draw.ellipse()
            .xy(forces.attraction_center)
            .radius((forces.attraction_factor * 10.0).max(2.0))
            .color(rgba(1.0, 0.0, 1.0, 0.6));
    }

    if let Err(e) = draw.to_frame(app, &frame) {
        log::error!("Failed to draw frame: {:?}", e);
    }

    if let Err(e) = model.egui.draw_to_frame(&frame) {
        log::error!("Failed to draw UI: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(x: f32, radius: f32, color: Rgb) -> Particle {
        let mut p = Particle::new(pt2(x, 0.0), 1.0, 1.0, 0.95, 20.0, 50.0, color);
        p.radius = radius;
        p
    }

    #[test]
    fn small_particles_are_filled() {
        let white = rgb(1.0, 1.0, 1.0);
        assert_eq!(particle_style(&particle(0.0, 4.9, white)), ParticleStyle::Filled);
        assert_eq!(
            particle_style(&particle(0.0, 5.0, white)),
            ParticleStyle::Stroked { alpha: OUTLINE_ALPHA }
        );
    }

    #[test]
    fn fade_is_clamped() {
        assert_eq!(distance_fade(0.0), 1.0);
        assert_eq!(distance_fade(50.0), 0.5);
        assert_eq!(distance_fade(250.0), 0.0);
    }

    #[test]
    fn connections_only_between_close_particles() {
        let red = rgb(1.0, 0.0, 0.0);
        let blue = rgb(0.0, 0.0, 1.0);
        let near = connection(&particle(0.0, 1.0, red), &particle(50.0, 1.0, blue)).unwrap();

        assert_eq!(near.start, pt2(3.0, 0.0));
        assert_eq!(near.end, pt2(47.0, 0.0));
        assert!((near.alpha - 0.4).abs() < 1e-5);
        assert!((near.color.red - 0.5).abs() < 1e-5);

        assert!(connection(&particle(0.0, 1.0, red), &particle(120.0, 1.0, blue)).is_none());
        assert!(connection(&particle(0.0, 1.0, red), &particle(0.0, 1.0, blue)).is_none());
    }

    #[test]
    fn each_pair_is_connected_once() {
        let mut system = ParticleSystem::with_seed(Rect::from_w_h(500.0, 500.0), 10, 2);
        system.spring_formation.enabled = false;
        for x in [0.0, 20.0, 40.0, 300.0] {
            system.add_particle(particle(x, 1.0, rgb(1.0, 1.0, 1.0)));
        }

        assert_eq!(connections(&system).len(), 3);
    }
}
