//! Idle human mimicry
//!
//! Small harmless actions between gathering passes: a camera nudge, a
//! glance at the game viewport, or just doing nothing for a moment. Pure
//! noise as far as the game is concerned; its only purpose is breaking up
//! the action cadence.

use enigo::Key;
use rand::Rng;
use std::time::Duration;

use crate::Session;

impl Session {
    /// Occasionally perform one idle action, governed by the configured
    /// probability.
    pub fn maybe_idle_action(&mut self) {
        let probability = self.settings.mimicry.idle_action_probability;
        if !self.input.humanizer().should_micro_pause(probability) {
            return;
        }

        let mut rng = rand::thread_rng();
        match rng.gen_range(0..3u8) {
            0 if self.settings.mimicry.camera_drift => {
                let key = if rng.gen_bool(0.5) {
                    Key::LeftArrow
                } else {
                    Key::RightArrow
                };
                let hold = Duration::from_millis(rng.gen_range(400..=1200));
                log::debug!("idle: camera drift for {hold:?}");
                self.input.key_hold(key, hold);
            }
            1 => {
                log::debug!("idle: glancing at the viewport");
                let view = self.regions.game_view;
                self.input.move_to_region(&view);
            }
            _ => {
                let pause = self.input.humanizer().micro_pause_duration();
                log::debug!("idle: pausing for {pause:?}");
                std::thread::sleep(pause);
            }
        }
    }

    /// Occasionally take a longer break after a multiple of passes.
    pub fn maybe_break(&mut self) {
        let passes = self.stats.passes_completed;
        if self.input.humanizer().should_take_break(passes) {
            let duration = self.input.humanizer().break_duration();
            log::info!("taking a break for {duration:?}");
            std::thread::sleep(duration);
        }
    }
}
