/*
 * Input Module
 *
 * This module handles user input events for the particle swarm.
 *
 * Features:
 * - Pointer movement steers the attraction center
 * - Dragging paints particles (emission happens in the update)
 * - Keyboard shortcuts for clearing, toggles and presets
 * - Forwarding raw window events to the UI
 */

use nannou::prelude::*;
use nannou::winit::event::MouseButton;

use crate::app::Model;

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    model.pointer = pos;
    model.params.forces.attraction_center = pos;
}

// Mouse pressed event handler
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left && !model.egui.ctx().is_pointer_over_area() {
        model.painting = true;
    }
}

// Mouse released event handler
pub fn mouse_released(app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.painting = false;
        model.params.forces.release_attraction(app.window_rect().xy());
    }
}

// Keyboard shortcuts
pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    let mut rng = rand::thread_rng();

    match key {
        Key::Space => {
            log::info!("Clearing {} particles", model.system.len());
            model.system.clear();
        }
        Key::F => {
            model.params.flocking_enabled = !model.params.flocking_enabled;
            log::info!("Flocking {}", if model.params.flocking_enabled { "enabled" } else { "disabled" });
        }
        Key::B => {
            model.params.bounce = !model.params.bounce;
            log::info!("Boundary policy: {}", if model.params.bounce { "bounce" } else { "wrap" });
        }
        Key::Key1 => model.params.randomize_particle_color(&mut rng),
        Key::Key2 => model.params.set_high_separation(&mut rng),
        Key::Key3 => model.params.set_high_neighboring(&mut rng),
        Key::Key4 => model.params.randomize_flocking(&mut rng),
        Key::S => model.params.show_panel = !model.params.show_panel,
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
