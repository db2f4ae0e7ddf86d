/*
 * Particle Swarm
 *
 * An interactive particle swarm. Particles flock using three rules
 * (separation, alignment, cohesion), are pulled around by ambient forces,
 * spawn on a beat clock or under the pointer, and are linked by springs to
 * the particles they were born next to.
 *
 * Controls: drag to paint, space to clear, f toggles flocking, b toggles
 * bounce/wrap, 1-4 run the presets, s hides the settings panel.
 */

use particle_swarm::app::{model, update};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting particle swarm...");

    nannou::app(model)
        .update(update)
        .run();
}
