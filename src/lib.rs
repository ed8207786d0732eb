//! Scapebot - screen-vision automation for a desktop game client
//!
//! This library drives a game client purely through what is visible on
//! screen: it captures fixed regions of the display, matches small
//! reference images ("needles") against them, and synthesizes human-like
//! mouse and keyboard input in response. It never reads game memory or
//! network traffic, so everything it believes about the game is subject to
//! image-matching false negatives and positives.
//!
//! ## Humanization
//!
//! The `input` module adds realistic variance to pointer paths, click
//! points, and timing so the synthesized input does not form a mechanically
//! uniform trace.

pub mod behavior;
pub mod config;
pub mod error;
pub mod input;
pub mod poll;
pub mod protocol;
pub mod screen;
pub mod vision;

pub use error::{Error, Result};

use std::time::{Duration, Instant};

use crate::config::{Credentials, Settings};
use crate::input::InputSynthesizer;
use crate::poll::{poll_until, RetryPolicy};
use crate::screen::{Region, RegionMap};
use crate::vision::{template, FrameSource, MatchResult, NeedleSet, NeedleSpec};

/// Counters for one run, owned by the session rather than the process so
/// several sessions can coexist in tests.
#[derive(Debug)]
pub struct SessionStats {
    pub items_gathered: u32,
    pub passes_completed: u32,
    pub started: Instant,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            items_gathered: 0,
            passes_completed: 0,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// One oriented automation session: the frame source, the input device,
/// the region map derived from the client anchor, the needle cache, and
/// the run counters. Everything higher up (interaction protocols, behavior
/// loops) is implemented as methods on this type in their own modules.
pub struct Session {
    pub frames: Box<dyn FrameSource>,
    pub input: InputSynthesizer,
    pub regions: RegionMap,
    pub needles: NeedleSet,
    pub settings: Settings,
    pub credentials: Credentials,
    pub stats: SessionStats,
}

impl Session {
    pub fn new(
        frames: Box<dyn FrameSource>,
        input: InputSynthesizer,
        regions: RegionMap,
        needles: NeedleSet,
        settings: Settings,
        credentials: Credentials,
    ) -> Self {
        Self {
            frames,
            input,
            regions,
            needles,
            settings,
            credentials,
            stats: SessionStats::new(),
        }
    }

    /// Single synchronous needle probe over a fresh capture of `region`.
    ///
    /// A `Found` region is in display coordinates, ready to aim the
    /// pointer at.
    pub fn probe(&mut self, spec: &NeedleSpec, region: &Region) -> Result<MatchResult> {
        let haystack = self.frames.grab(region)?;
        let needle = self.needles.image(spec)?;
        let result = template::locate(&haystack, needle, spec.confidence, spec.mode);

        Ok(match result.region() {
            Some(local) => {
                // The capture was clipped to the display; matches are
                // relative to the clipped origin.
                let origin = region
                    .intersect(&self.frames.display_bounds())
                    .unwrap_or(*region);
                MatchResult::Found(local.translated(origin.left, origin.top))
            }
            None => MatchResult::NotFound,
        })
    }

    /// Poll for a needle under a retry policy, early-exiting on the first
    /// hit. Exhausting the policy yields `NotFound`, not an error.
    pub fn await_needle(
        &mut self,
        spec: &NeedleSpec,
        region: &Region,
        policy: &RetryPolicy,
    ) -> Result<MatchResult> {
        let mut failure = None;
        let result = poll_until(
            || match self.probe(spec, region) {
                Ok(r) => {
                    failure = None;
                    r
                }
                Err(e) => {
                    failure = Some(e);
                    MatchResult::NotFound
                }
            },
            policy,
        );
        match failure {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }

    /// Whether a needle is visible right now.
    pub fn is_visible(&mut self, spec: &NeedleSpec, region: &Region) -> Result<bool> {
        Ok(self.probe(spec, region)?.is_found())
    }

    /// Poll until a needle is no longer visible. `Ok(false)` means it was
    /// still there when the policy ran out.
    pub fn await_vanish(
        &mut self,
        spec: &NeedleSpec,
        region: &Region,
        policy: &RetryPolicy,
    ) -> Result<bool> {
        let mut failure = None;
        let gone = poll::poll_until_true(
            || match self.is_visible(spec, region) {
                Ok(visible) => {
                    failure = None;
                    !visible
                }
                Err(e) => {
                    failure = Some(e);
                    false
                }
            },
            policy,
        );
        match failure {
            Some(e) => Err(e),
            None => Ok(gone),
        }
    }

    /// Count non-overlapping instances of a needle inside `region`.
    pub fn count(&mut self, spec: &NeedleSpec, region: &Region) -> Result<usize> {
        let haystack = self.frames.grab(region)?;
        let needle = self.needles.image(spec)?;
        Ok(template::count_matches(
            &haystack,
            needle,
            spec.confidence,
            spec.mode,
        ))
    }

    /// Whether the most recent chat line shows a message needle.
    pub fn chat_shows(&mut self, spec: &NeedleSpec) -> Result<bool> {
        let region = self.regions.chat_recent;
        self.is_visible(spec, &region)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for protocol and behavior tests: a session wired to
    //! an in-memory frame source and a recording input backend.

    use super::*;
    use crate::input::Recorder;
    use image::{Rgba, RgbaImage};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Checkerboard background that cannot accidentally correlate with the
    /// structured test needles.
    pub fn textured_frame(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let v = if (x + y) % 2 == 0 { 90 } else { 130 };
            Rgba([v, v, v, 255])
        })
    }

    /// An 8x8 needle glyph; each seed (mod 8) selects a shape dissimilar
    /// enough from the others that cross-matches stay far below the test
    /// confidence thresholds.
    pub fn pattern(seed: u32) -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| {
            let on = match seed % 8 {
                0 => x == 3 || y == 3,
                1 => x == y || x + y == 7,
                2 => y % 3 == 0,
                3 => x % 3 == 0,
                4 => (x / 2 + y / 2) % 2 == 0,
                5 => x == 0 || y == 0 || x == 7 || y == 7,
                6 => x < 4,
                _ => x % 3 == 1 && y % 3 == 1,
            };
            if on {
                Rgba([250, 250, 250, 255])
            } else {
                Rgba([15, 15, 15, 255])
            }
        })
    }

    pub fn stamp(frame: &mut RgbaImage, needle: &RgbaImage, left: i64, top: i64) {
        image::imageops::replace(frame, needle, left, top);
    }

    pub fn session_with(
        frames: Box<dyn FrameSource>,
        needles: NeedleSet,
    ) -> (Session, Rc<RefCell<Recorder>>) {
        let recorder = Rc::new(RefCell::new(Recorder::new()));
        let input = InputSynthesizer::new(Box::new(recorder.clone())).with_timings(
            crate::input::PressTiming::INSTANT,
            crate::input::PressTiming::INSTANT,
        );
        let regions = RegionMap::new(crate::screen::ClientAnchor::new(
            crate::screen::Point::new(0, 0),
        ));
        let session = Session::new(
            frames,
            input,
            regions,
            needles,
            Settings::default(),
            Credentials {
                username: "tester".into(),
                password: "hunter2".into(),
            },
        );
        (session, recorder)
    }
}
