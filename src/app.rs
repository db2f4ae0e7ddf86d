/*
 * Application Module
 *
 * This module defines the main application model and logic for the particle
 * swarm. Each frame it:
 * 1. Runs the UI and applies changed parameters to the particle system
 * 2. Injects the ambient forces and advances the simulation
 * 3. Spawns particles from the pointer and from the beat clock
 */

use nannou::prelude::*;
use nannou_egui::Egui;

use crate::beat::BpmTapper;
use crate::debug::DebugInfo;
use crate::input::{key_pressed, mouse_moved, mouse_pressed, mouse_released, raw_window_event};
use crate::neighbors::{BruteForce, NeighborQuery, SpatialGrid};
use crate::params::SimulationParams;
use crate::renderer::view;
use crate::system::ParticleSystem;
use crate::ui::{self, UiActions};

// Beat bursts trace a figure across this share of the window
const BURST_PATH_SCALE: f32 = 0.4;

// Main model for the application
pub struct Model {
    pub system: ParticleSystem,
    pub params: SimulationParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub beat: BpmTapper,
    pub pointer: Point2,
    pub painting: bool,
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Particle Swarm")
        .size(1280, 720)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .key_pressed(key_pressed)
        .resized(resized)
        .raw_event(raw_window_event)
        .build()
        .expect("Failed to build window");

    let window = app.window(window_id).expect("Window closed during setup");
    let egui = Egui::from_window(&window);

    let params = SimulationParams::default();
    if let Err(e) = params.validate() {
        log::warn!("Default parameters rejected: {}", e);
    }

    let mut system = ParticleSystem::new(app.window_rect(), params.max_particles);
    system.eviction = params.eviction;
    system.spring_formation = params.spring_formation.clone();
    system.set_neighbor_query(neighbor_query(&params));

    let mut beat = BpmTapper::new(params.bpm);
    beat.start();

    log::info!(
        "Particle swarm ready: max {} particles, {} bpm",
        params.max_particles,
        params.bpm
    );

    Model {
        system,
        params,
        egui,
        debug_info: DebugInfo::default(),
        beat,
        pointer: Point2::ZERO,
        painting: false,
    }
}

// Brute force unless the spatial grid is enabled
fn neighbor_query(params: &SimulationParams) -> Box<dyn NeighborQuery> {
    if params.use_spatial_grid {
        let cell_size = params.emitter.target_separation.max(params.emitter.neighboring_distance);
        Box::new(SpatialGrid::new(cell_size))
    } else {
        Box::new(BruteForce::default())
    }
}

// Push parameter changes made in the UI into the particle system
fn apply_param_changes(model: &mut Model) {
    let changes = model.params.detect_changes();
    if !changes.any_changed {
        return;
    }

    if let Err(e) = model.params.validate() {
        log::warn!("Ignoring parameter change: {}", e);
        return;
    }

    if changes.system_changed {
        model.system.max_particles = model.params.max_particles;
        model.system.eviction = model.params.eviction;
        model.system.spring_formation = model.params.spring_formation.clone();
    }

    if changes.neighbor_index_changed {
        model.system.set_neighbor_query(neighbor_query(&model.params));
        log::info!("Spatial grid {}", if model.params.use_spatial_grid { "enabled" } else { "disabled" });
    }
}

fn apply_actions(model: &mut Model, actions: UiActions) {
    let mut rng = rand::thread_rng();

    if actions.clear {
        model.system.clear();
    }
    if actions.randomize_color {
        model.params.randomize_particle_color(&mut rng);
    }
    if actions.high_separation {
        model.params.set_high_separation(&mut rng);
    }
    if actions.high_neighboring {
        model.params.set_high_neighboring(&mut rng);
    }
    if actions.randomize_flocking {
        model.params.randomize_flocking(&mut rng);
    }
}

// Point on a Lissajous figure where the next beat burst appears
fn burst_position(window_rect: Rect, time: f32) -> Point2 {
    pt2(
        (time * 8.0).sin() * window_rect.w() * BURST_PATH_SCALE,
        (time * 4.0).cos() * window_rect.h() * BURST_PATH_SCALE,
    ) + window_rect.xy()
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    let actions = ui::update_ui(&mut model.egui, &mut model.params, &model.debug_info);
    apply_param_changes(model);
    apply_actions(model, actions);

    model.debug_info.record_frame(app.fps(), update.since_last, &model.system);

    if model.params.pause_simulation {
        return;
    }

    let window_rect = app.window_rect();
    model.system.borders = window_rect;

    model.params.forces.apply(&mut model.system);
    model.system.update(&model.params.frame_config());

    let mut rng = rand::thread_rng();

    if model.painting && model.params.paint_with_pointer {
        model.params.emitter.paint(&mut model.system, model.pointer, app.elapsed_frames(), &mut rng);
    }

    model.beat.set_bpm(model.params.bpm);
    model.beat.update(update.since_last);

    if model.beat.on_beat() {
        model.debug_info.beats += 1;

        if model.params.auto_randomize_color {
            model.params.randomize_particle_color(&mut rng);
        }

        if model.params.spawn_on_beat {
            let center = burst_position(window_rect, app.time);
            model.params.emitter.burst(&mut model.system, center, model.params.particles_per_beat, &mut rng);
        }
    }
}

// Keep the force centers in the middle of the window
fn resized(app: &App, model: &mut Model, _size: Vec2) {
    let window_rect = app.window_rect();
    model.system.borders = window_rect;
    model.params.forces.recenter(window_rect.xy());
}
