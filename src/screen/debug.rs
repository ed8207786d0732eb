//! Calibration screenshots
//!
//! Writes one annotated screenshot with every named region outlined, for
//! eyeballing the offset table against a live client. Not part of the
//! runtime contract.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::Path;

use super::{Region, RegionMap};
use crate::vision::{FrameSource, VisionError};

const OUTLINE: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Capture the full display and outline every region in the map, saving the
/// result to `path` (PNG).
pub fn dump_regions(
    frames: &mut dyn FrameSource,
    map: &RegionMap,
    path: &Path,
) -> Result<(), VisionError> {
    let mut frame = frames.grab_display()?;

    for region in named_regions(map) {
        outline(&mut frame, &region);
    }

    frame
        .save(path)
        .map_err(|e| VisionError::Capture(format!("failed to save {}: {e}", path.display())))?;
    log::info!("wrote calibration screenshot to {}", path.display());
    Ok(())
}

fn named_regions(map: &RegionMap) -> Vec<Region> {
    vec![
        map.client,
        map.game_view,
        map.inventory,
        map.inventory_left,
        map.inventory_right,
        map.side_tabs,
        map.chat,
        map.chat_recent,
        map.minimap,
        map.minimap_slice,
        map.login_existing_user,
        map.login_username,
        map.login_password,
        map.login_submit,
    ]
}

fn outline(frame: &mut RgbaImage, region: &Region) {
    if region.width == 0 || region.height == 0 {
        return;
    }
    let rect = Rect::at(region.left, region.top).of_size(region.width, region.height);
    draw_hollow_rect_mut(frame, rect, OUTLINE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::{ClientAnchor, Point};
    use crate::vision::StaticFrame;

    #[test]
    fn test_dump_writes_a_png() {
        let frame = RgbaImage::from_pixel(800, 600, Rgba([0, 0, 0, 255]));
        let mut source = StaticFrame::new(frame);
        let map = RegionMap::new(ClientAnchor::new(Point::new(5, 5)));

        let dir = std::env::temp_dir().join("scapebot-debug-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("regions.png");

        dump_regions(&mut source, &map, &path).unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }
}
