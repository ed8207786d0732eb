//! Orientation and session detection
//!
//! Locates the client window by searching the full display for a known
//! anchor icon and classifies the session as logged-in or logged-out. The
//! matched anchor's center, adjusted by a per-layout fixed offset, becomes
//! the `ClientAnchor` every other region is derived from. This is the only
//! producer of `ClientAnchor` in the crate.

use std::time::Duration;

use super::needles::specs;
use super::{template, FrameSource, NeedleSet};
use crate::error::Error;
use crate::screen::{ClientAnchor, Point};

/// What the display shows about the session. `Unknown` is never part of a
/// successful orientation; it only describes a frame we could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedIn,
    LoggedOut,
    Unknown,
}

/// Successful orientation: the classified state, the matched anchor icon's
/// center, and the derived client anchor.
#[derive(Debug, Clone, Copy)]
pub struct Orientation {
    pub state: SessionState,
    pub anchor_center: Point,
    pub anchor: ClientAnchor,
}

/// External collaborator that can start the game client when orientation
/// cannot find it on screen.
pub trait ClientLauncher {
    fn launch(&mut self) -> std::io::Result<()>;
}

/// Launcher backed by a shell command from the configuration.
pub struct CommandLauncher {
    command: String,
}

impl CommandLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl ClientLauncher for CommandLauncher {
    fn launch(&mut self) -> std::io::Result<()> {
        log::info!("launching client: {}", self.command);
        std::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .spawn()
            .map(|_| ())
    }
}

/// The anchor icon sits at a different offset from the window's true
/// top-left corner on the login layout than on the logged-in layout.
/// Offsets map the matched icon center back to the client origin.
pub const LOGGED_IN_ANCHOR_TO_ORIGIN: (i32, i32) = (-561, -20);
pub const LOGGED_OUT_ANCHOR_TO_ORIGIN: (i32, i32) = (-382, -73);

const LAUNCH_ASSIST_ATTEMPTS: u32 = 3;
const LAUNCH_WAIT: Duration = Duration::from_secs(25);

/// Classify the current display, optionally launching the client and
/// retrying when nothing is found. Fatal when the client cannot be located:
/// every coordinate in the process depends on this anchor.
pub fn orient(
    frames: &mut dyn FrameSource,
    needles: &mut NeedleSet,
    mut launcher: Option<&mut dyn ClientLauncher>,
) -> Result<Orientation, Error> {
    let attempts = if launcher.is_some() {
        LAUNCH_ASSIST_ATTEMPTS
    } else {
        1
    };

    for attempt in 1..=attempts {
        if let Some(orientation) = classify(frames, needles)? {
            log::info!(
                "oriented: {:?}, client origin at ({}, {})",
                orientation.state,
                orientation.anchor.origin.x,
                orientation.anchor.origin.y
            );
            return Ok(orientation);
        }

        if attempt < attempts {
            if let Some(l) = launcher.as_mut() {
                l.launch().map_err(|e| {
                    Error::protocol("client launch", format!("launch command failed: {e}"))
                })?;
                log::info!("client not visible; launched and waiting for it to appear");
                std::thread::sleep(LAUNCH_WAIT);
            }
        }
    }

    Err(Error::Orientation { attempts })
}

/// One classification pass over a fresh full-display frame.
fn classify(
    frames: &mut dyn FrameSource,
    needles: &mut NeedleSet,
) -> Result<Option<Orientation>, Error> {
    let frame = frames.grab_display()?;
    let display = frames.display_bounds();

    for (spec, state, (dx, dy)) in [
        (
            &specs::LOGGED_IN_ANCHOR,
            SessionState::LoggedIn,
            LOGGED_IN_ANCHOR_TO_ORIGIN,
        ),
        (
            &specs::LOGGED_OUT_ANCHOR,
            SessionState::LoggedOut,
            LOGGED_OUT_ANCHOR_TO_ORIGIN,
        ),
    ] {
        let needle = needles.image(spec)?;
        let result = template::locate(&frame, needle, spec.confidence, spec.mode);
        if let Some(local) = result.region() {
            // Frame coordinates are display coordinates shifted by its origin.
            let center = local
                .translated(display.left, display.top)
                .center();
            return Ok(Some(Orientation {
                state,
                anchor_center: center,
                anchor: ClientAnchor::new(center.offset(dx, dy)),
            }));
        }
        log::debug!("{} not visible", spec.id);
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::StaticFrame;
    use image::{Rgba, RgbaImage};

    fn textured(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let v = if (x + y) % 2 == 0 { 90 } else { 130 };
            Rgba([v, v, v, 255])
        })
    }

    /// Distinct 16x16 patterns so the two anchors cannot cross-match.
    fn cross_pattern() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| {
            if x == 8 || y == 8 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([10, 10, 10, 255])
            }
        })
    }

    fn stripe_pattern() -> RgbaImage {
        RgbaImage::from_fn(16, 16, |x, y| {
            if (x + y) % 4 == 0 {
                Rgba([240, 240, 240, 255])
            } else {
                Rgba([30, 30, 30, 255])
            }
        })
    }

    #[test]
    fn test_logged_out_anchor_at_known_pixel() {
        let logged_in = stripe_pattern();
        let logged_out = cross_pattern();

        // Stamp only the logged-out anchor so its center lands on (400, 300).
        let mut frame = textured(800, 600);
        image::imageops::replace(&mut frame, &logged_out, 392, 292);

        let mut needles = NeedleSet::new("/nonexistent");
        needles.insert(specs::LOGGED_IN_ANCHOR.id, logged_in);
        needles.insert(specs::LOGGED_OUT_ANCHOR.id, logged_out);

        let mut frames = StaticFrame::new(frame);
        let orientation = orient(&mut frames, &mut needles, None).unwrap();

        assert_eq!(orientation.state, SessionState::LoggedOut);
        assert_eq!(orientation.anchor_center, Point::new(400, 300));
        let (dx, dy) = LOGGED_OUT_ANCHOR_TO_ORIGIN;
        assert_eq!(
            orientation.anchor.origin,
            Point::new(400 + dx, 300 + dy)
        );
    }

    #[test]
    fn test_logged_in_takes_priority() {
        let logged_in = stripe_pattern();
        let logged_out = cross_pattern();

        let mut frame = textured(800, 600);
        image::imageops::replace(&mut frame, &logged_in, 100, 100);
        image::imageops::replace(&mut frame, &logged_out, 392, 292);

        let mut needles = NeedleSet::new("/nonexistent");
        needles.insert(specs::LOGGED_IN_ANCHOR.id, logged_in);
        needles.insert(specs::LOGGED_OUT_ANCHOR.id, logged_out);

        let mut frames = StaticFrame::new(frame);
        let orientation = orient(&mut frames, &mut needles, None).unwrap();
        assert_eq!(orientation.state, SessionState::LoggedIn);
    }

    #[test]
    fn test_no_anchor_is_fatal() {
        let mut needles = NeedleSet::new("/nonexistent");
        needles.insert(specs::LOGGED_IN_ANCHOR.id, stripe_pattern());
        needles.insert(specs::LOGGED_OUT_ANCHOR.id, cross_pattern());

        let mut frames = StaticFrame::new(textured(800, 600));
        let err = orient(&mut frames, &mut needles, None).unwrap_err();
        assert!(matches!(err, Error::Orientation { attempts: 1 }));
    }
}
