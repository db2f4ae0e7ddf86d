/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It provides controls for the swarm parameters and
 * buttons for the presets; button presses are returned to the app as actions.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::{EvictionPolicy, SimulationParams};

/// Buttons pressed this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiActions {
    pub clear: bool,
    pub randomize_color: bool,
    pub high_separation: bool,
    pub high_neighboring: bool,
    pub randomize_flocking: bool,
}

// Update the UI and return the buttons pressed this frame
pub fn update_ui(egui: &mut Egui, params: &mut SimulationParams, debug_info: &DebugInfo) -> UiActions {
    let mut actions = UiActions::default();

    // Take a snapshot of current parameter values for change detection
    params.take_snapshot();

    let ctx = egui.begin_frame();

    if !params.show_panel {
        return actions;
    }

    egui::Window::new("Settings")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Particles", |ui| {
                ui.label(format!("Particle Count: {}", debug_info.particle_count));
                ui.label(format!("Spring Count: {}", debug_info.spring_count));
                ui.add(egui::Slider::new(&mut params.max_particles, SimulationParams::get_max_particles_range()).text("Max Particles"));
                ui.radio_value(&mut params.eviction, EvictionPolicy::ToCap, "Evict down to cap");
                ui.radio_value(&mut params.eviction, EvictionPolicy::OnePerFrame, "Evict one per frame");

                let emitter = &mut params.emitter;
                let mut color = [emitter.color.red, emitter.color.green, emitter.color.blue];
                ui.horizontal(|ui| {
                    ui.label("Particle Color");
                    if ui.color_edit_button_rgb(&mut color).changed() {
                        emitter.color = nannou::color::rgb(color[0], color[1], color[2]);
                    }
                });
                ui.add(egui::Slider::new(&mut emitter.target_separation, SimulationParams::get_distance_range()).text("Target Separation"));
                ui.add(egui::Slider::new(&mut emitter.neighboring_distance, SimulationParams::get_distance_range()).text("Neighboring Distance"));

                ui.checkbox(&mut params.paint_with_pointer, "Paint with Pointer");
                ui.checkbox(&mut params.auto_randomize_color, "Auto-Randomize Color on Beat");

                if ui.button("Randomize Particle Color").clicked() {
                    actions.randomize_color = true;
                }
                if ui.button("High Separation").clicked() {
                    actions.high_separation = true;
                }
                if ui.button("High Neighboring").clicked() {
                    actions.high_neighboring = true;
                }
                if ui.button("Clear").clicked() {
                    actions.clear = true;
                }
            });

            ui.collapsing("Flocking", |ui| {
                ui.checkbox(&mut params.flocking_enabled, "Flocking Enabled");
                ui.add(egui::Slider::new(&mut params.separation_factor, SimulationParams::get_separation_factor_range()).text("Separation Factor"));
                ui.add(egui::Slider::new(&mut params.alignment_factor, SimulationParams::get_alignment_factor_range()).text("Alignment Factor"));
                ui.add(egui::Slider::new(&mut params.cohesion_factor, SimulationParams::get_cohesion_factor_range()).text("Cohesion Factor"));
                if ui.button("Randomize Flocking Parameters").clicked() {
                    actions.randomize_flocking = true;
                }
                ui.checkbox(&mut params.bounce, "Bounce at Borders");
            });

            ui.collapsing("Springs", |ui| {
                let formation = &mut params.spring_formation;
                ui.checkbox(&mut formation.enabled, "Form Springs on Spawn");
                ui.checkbox(&mut formation.require_color_match, "Only Link Matching Colors");
                ui.add(egui::Slider::new(&mut formation.radius_scale, 1.0..=200.0).text("Reach per Radius"));
                ui.add(egui::Slider::new(&mut formation.max_reach, 1.0..=1000.0).text("Max Reach"));
            });

            ui.collapsing("Forces", |ui| {
                let forces = &mut params.forces;
                ui.checkbox(&mut forces.pull_to_center, "Pull Particles to Center");
                ui.add(egui::Slider::new(&mut forces.pull_factor, SimulationParams::get_pull_factor_range()).text("Pull Factor"));
                ui.separator();
                ui.checkbox(&mut forces.use_attraction, "Attraction Enabled");
                ui.add(egui::Slider::new(&mut forces.attraction_factor, SimulationParams::get_attraction_factor_range()).text("Attraction Factor"));
                ui.separator();
                ui.checkbox(&mut forces.use_repulsion, "Repulsion Enabled");
                ui.add(egui::Slider::new(&mut forces.repulsion_factor, SimulationParams::get_repulsion_factor_range()).text("Repulsion Factor"));
                ui.add(egui::Slider::new(&mut forces.repulsion_radius, SimulationParams::get_repulsion_radius_range()).text("Repulsion Radius"));
                ui.checkbox(&mut params.show_force_centers, "Show Force Centers");
            });

            ui.collapsing("Beat", |ui| {
                ui.add(egui::Slider::new(&mut params.bpm, SimulationParams::get_bpm_range()).text("BPM Tempo"));
                ui.checkbox(&mut params.spawn_on_beat, "Spawn on Beat");
                ui.add(egui::Slider::new(&mut params.particles_per_beat, SimulationParams::get_particles_per_beat_range()).text("Particles on Beat"));
                ui.label(format!("Beats: {}", debug_info.beats));
            });

            ui.collapsing("Performance", |ui| {
                ui.checkbox(&mut params.use_spatial_grid, "Enable Spatial Grid");
                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
            });

            ui.checkbox(&mut params.pause_simulation, "Pause Simulation");
        });

    actions
}
