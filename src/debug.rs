/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and population counts displayed in the UI.
 */

use std::time::Duration;

use crate::system::ParticleSystem;

// Debug information to display
#[derive(Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub particle_count: usize,
    pub spring_count: usize,
    pub beats: u64,
}

impl DebugInfo {
    pub fn record_frame(&mut self, fps: f32, frame_time: Duration, system: &ParticleSystem) {
        self.fps = fps;
        self.frame_time = frame_time;
        self.particle_count = system.len();
        self.spring_count = system.spring_count();
    }
}
