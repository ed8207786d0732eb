//! Screen capture
//!
//! A `FrameSource` produces fresh pixel rasters for arbitrary display
//! regions. The live implementation wraps the primary monitor; the
//! in-memory implementations let the matcher and every protocol on top of
//! it run against canned frames in tests.

use image::RgbaImage;
use std::collections::VecDeque;
use xcap::Monitor;

use super::VisionError;
use crate::screen::Region;

/// Supplier of pixel content for display regions.
pub trait FrameSource {
    /// Bounds of the whole display, in display coordinates.
    fn display_bounds(&self) -> Region;

    /// Capture the pixel contents of `region`, freshly.
    ///
    /// Out-of-bounds portions are clipped; a region fully outside the
    /// display yields an empty image.
    fn grab(&mut self, region: &Region) -> Result<RgbaImage, VisionError>;

    /// Capture the whole display.
    fn grab_display(&mut self) -> Result<RgbaImage, VisionError> {
        self.grab(&self.display_bounds())
    }
}

/// Clip `region` against `bounds` and crop it out of `frame`.
///
/// `frame` is assumed to cover `bounds` exactly.
fn crop_clipped(frame: &RgbaImage, bounds: &Region, region: &Region) -> RgbaImage {
    let Some(clipped) = region.intersect(bounds) else {
        return RgbaImage::new(0, 0);
    };
    let x = (clipped.left - bounds.left) as u32;
    let y = (clipped.top - bounds.top) as u32;
    image::imageops::crop_imm(frame, x, y, clipped.width, clipped.height).to_image()
}

/// Live capture from the primary monitor.
pub struct ScreenGrabber {
    monitor: Monitor,
    bounds: Region,
    frame_count: u64,
}

impl ScreenGrabber {
    /// Open the primary monitor.
    pub fn primary() -> Result<Self, VisionError> {
        let monitors = Monitor::all().map_err(|e| VisionError::Capture(e.to_string()))?;
        let monitor = monitors
            .into_iter()
            .next()
            .ok_or_else(|| VisionError::Capture("no monitors found".into()))?;

        let x = monitor.x().map_err(|e| VisionError::Capture(e.to_string()))?;
        let y = monitor.y().map_err(|e| VisionError::Capture(e.to_string()))?;
        let width = monitor
            .width()
            .map_err(|e| VisionError::Capture(e.to_string()))?;
        let height = monitor
            .height()
            .map_err(|e| VisionError::Capture(e.to_string()))?;

        Ok(Self {
            monitor,
            bounds: Region::new(x, y, width, height),
            frame_count: 0,
        })
    }

    /// Number of frames captured so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl FrameSource for ScreenGrabber {
    fn display_bounds(&self) -> Region {
        self.bounds
    }

    fn grab(&mut self, region: &Region) -> Result<RgbaImage, VisionError> {
        let frame = self
            .monitor
            .capture_image()
            .map_err(|e| VisionError::Capture(e.to_string()))?;
        self.frame_count += 1;
        Ok(crop_clipped(&frame, &self.bounds, region))
    }
}

/// A single fixed frame standing in for the display.
pub struct StaticFrame {
    frame: RgbaImage,
    bounds: Region,
}

impl StaticFrame {
    pub fn new(frame: RgbaImage) -> Self {
        let bounds = Region::new(0, 0, frame.width(), frame.height());
        Self { frame, bounds }
    }
}

impl FrameSource for StaticFrame {
    fn display_bounds(&self) -> Region {
        self.bounds
    }

    fn grab(&mut self, region: &Region) -> Result<RgbaImage, VisionError> {
        Ok(crop_clipped(&self.frame, &self.bounds, region))
    }
}

/// A queue of frames served one per grab; the final frame repeats forever.
///
/// Lets a test walk a protocol through a sequence of visual states (rock
/// full, chat silent, rock still full, ...).
pub struct FrameScript {
    queue: VecDeque<RgbaImage>,
    current: RgbaImage,
    bounds: Region,
}

impl FrameScript {
    /// Panics if `frames` is empty or frames disagree on dimensions.
    pub fn new(frames: Vec<RgbaImage>) -> Self {
        let mut queue: VecDeque<RgbaImage> = frames.into();
        let current = queue.pop_front().expect("FrameScript needs at least one frame");
        let bounds = Region::new(0, 0, current.width(), current.height());
        for f in &queue {
            assert_eq!(
                (f.width(), f.height()),
                (bounds.width, bounds.height),
                "FrameScript frames must share dimensions"
            );
        }
        Self {
            queue,
            current,
            bounds,
        }
    }
}

impl FrameSource for FrameScript {
    fn display_bounds(&self) -> Region {
        self.bounds
    }

    fn grab(&mut self, region: &Region) -> Result<RgbaImage, VisionError> {
        let cropped = crop_clipped(&self.current, &self.bounds, region);
        if let Some(next) = self.queue.pop_front() {
            self.current = next;
        }
        Ok(cropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, v: u8) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([v, v, v, 255]))
    }

    #[test]
    fn test_static_frame_crop() {
        let mut frame = solid(20, 20, 0);
        frame.put_pixel(5, 7, Rgba([255, 0, 0, 255]));
        let mut source = StaticFrame::new(frame);

        let crop = source.grab(&Region::new(5, 7, 3, 3)).unwrap();
        assert_eq!(crop.dimensions(), (3, 3));
        assert_eq!(crop.get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_out_of_bounds_is_clipped() {
        let mut source = StaticFrame::new(solid(10, 10, 9));

        let crop = source.grab(&Region::new(8, 8, 5, 5)).unwrap();
        assert_eq!(crop.dimensions(), (2, 2));

        let empty = source.grab(&Region::new(50, 50, 5, 5)).unwrap();
        assert_eq!(empty.dimensions(), (0, 0));
    }

    #[test]
    fn test_frame_script_advances_and_repeats() {
        let mut script = FrameScript::new(vec![solid(4, 4, 1), solid(4, 4, 2)]);
        let all = Region::new(0, 0, 4, 4);

        assert_eq!(script.grab(&all).unwrap().get_pixel(0, 0)[0], 1);
        assert_eq!(script.grab(&all).unwrap().get_pixel(0, 0)[0], 2);
        // Last frame repeats.
        assert_eq!(script.grab(&all).unwrap().get_pixel(0, 0)[0], 2);
    }
}
