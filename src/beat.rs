/*
 * Beat Module
 *
 * A tap-tempo style beat clock. It accumulates frame time and reports a beat
 * on the frame where one beat period has elapsed, then starts the next period.
 * A disabled clock never beats.
 */

use std::time::Duration;

pub struct BpmTapper {
    pub enabled: bool,
    bpm: f32,
    elapsed: Duration,
    running: bool,
    on_beat: bool,
}

impl BpmTapper {
    pub fn new(bpm: f32) -> Self {
        Self {
            enabled: true,
            bpm,
            elapsed: Duration::ZERO,
            running: false,
            on_beat: false,
        }
    }

    pub fn start(&mut self) {
        if !self.enabled {
            return;
        }
        self.elapsed = Duration::ZERO;
        self.running = true;
        self.on_beat = false;
    }

    pub fn stop(&mut self) {
        if !self.enabled {
            return;
        }
        self.running = false;
        self.on_beat = false;
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        self.bpm = bpm;
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    /// Length of one beat, `None` for a non-positive tempo.
    pub fn period(&self) -> Option<Duration> {
        if self.bpm > 0.0 {
            Some(Duration::from_secs_f32(60.0 / self.bpm))
        } else {
            None
        }
    }

    // Advance the clock by one frame
    pub fn update(&mut self, since_last: Duration) {
        self.on_beat = false;
        if !self.enabled {
            return;
        }
        if !self.running {
            self.start();
            return;
        }

        self.elapsed += since_last;
        if let Some(period) = self.period() {
            if self.elapsed > period {
                self.on_beat = true;
                self.elapsed = Duration::ZERO;
            }
        }
    }

    /// True only on the frame the beat fired.
    pub fn on_beat(&self) -> bool {
        self.on_beat
    }
}

impl Default for BpmTapper {
    fn default() -> Self {
        Self::new(124.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(tapper: &mut BpmTapper, count: usize, frame: Duration) -> usize {
        (0..count)
            .filter(|_| {
                tapper.update(frame);
                tapper.on_beat()
            })
            .count()
    }

    #[test]
    fn fires_once_per_period() {
        // 120 bpm: one beat every 500ms, 10ms frames
        let mut tapper = BpmTapper::new(120.0);
        tapper.start();
        let beats = frames(&mut tapper, 200, Duration::from_millis(10));
        assert_eq!(beats, 3);
    }

    #[test]
    fn beat_lasts_a_single_frame() {
        let mut tapper = BpmTapper::new(600.0);
        tapper.start();
        tapper.update(Duration::from_millis(150));
        assert!(tapper.on_beat());
        tapper.update(Duration::from_millis(1));
        assert!(!tapper.on_beat());
    }

    #[test]
    fn disabled_clock_never_beats() {
        let mut tapper = BpmTapper::new(600.0);
        tapper.enabled = false;
        assert_eq!(frames(&mut tapper, 100, Duration::from_millis(50)), 0);
    }

    #[test]
    fn non_positive_tempo_never_beats() {
        let mut tapper = BpmTapper::new(0.0);
        tapper.start();
        assert!(tapper.period().is_none());
        assert_eq!(frames(&mut tapper, 100, Duration::from_millis(50)), 0);
    }
}
