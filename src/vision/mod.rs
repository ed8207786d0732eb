//! Vision and template matching
//!
//! Handles screen capture, needle (reference image) bookkeeping, normalized
//! cross-correlation template matching, and orientation of the client
//! window from known anchor icons.

pub mod capture;
pub mod needles;
pub mod orient;
pub mod template;

pub use capture::{FrameScript, FrameSource, ScreenGrabber, StaticFrame};
pub use needles::{NeedleSet, NeedleSpec};
pub use orient::{ClientLauncher, Orientation, SessionState};

use crate::screen::{Point, Region};

/// Whether a match runs on full color planes or a grayscale conversion.
///
/// Grayscale is roughly a third of the work; color is required when the
/// confusable states differ mainly in hue (raw vs cooked food, gem colors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Color,
    Grayscale,
}

/// Outcome of a single template-match attempt.
///
/// `NotFound` is the expected, frequent, soft case; it is a value, never an
/// error, and is not logged above debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    NotFound,
    /// Best-scoring location at or above the needle's confidence threshold,
    /// sized like the needle.
    Found(Region),
}

impl MatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found(_))
    }

    pub fn region(&self) -> Option<Region> {
        match self {
            MatchResult::Found(r) => Some(*r),
            MatchResult::NotFound => None,
        }
    }

    pub fn center(&self) -> Option<Point> {
        self.region().map(|r| r.center())
    }
}

/// Vision errors: capture and asset problems, never "no match".
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("screen capture failed: {0}")]
    Capture(String),
    #[error("failed to load needle image {path}: {source}")]
    NeedleLoad {
        path: String,
        source: image::ImageError,
    },
}
