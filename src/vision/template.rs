//! Normalized cross-correlation template matching
//!
//! `locate` finds the single best-scoring placement of a needle inside a
//! haystack raster and accepts it only at or above the confidence
//! threshold. `count_matches` counts non-overlapping instances by
//! suppressing a needle-sized window around each accepted peak before
//! rescanning the score map.

use image::{GrayImage, ImageBuffer, Luma, RgbaImage};
use imageproc::template_matching::{find_extremes, match_template_parallel, MatchTemplateMethod};

use super::{ColorMode, MatchResult};
use crate::screen::Region;

type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Find the needle in the haystack. The returned region is in haystack-local
/// coordinates; callers anchored to a display region translate it themselves.
///
/// Ties on the exact best score resolve to the first location in scan order.
pub fn locate(
    haystack: &RgbaImage,
    needle: &RgbaImage,
    confidence: f32,
    mode: ColorMode,
) -> MatchResult {
    debug_assert!(confidence > 0.0 && confidence <= 1.0);

    if !fits(haystack, needle) {
        return MatchResult::NotFound;
    }

    let scores = score_map(haystack, needle, mode);
    let extremes = find_extremes(&scores);

    if extremes.max_value >= confidence {
        let (x, y) = extremes.max_value_location;
        MatchResult::Found(Region::new(
            x as i32,
            y as i32,
            needle.width(),
            needle.height(),
        ))
    } else {
        MatchResult::NotFound
    }
}

/// Count non-overlapping instances of the needle at or above the threshold.
///
/// Returns 0 (never an error) when nothing matches or the needle cannot fit.
pub fn count_matches(
    haystack: &RgbaImage,
    needle: &RgbaImage,
    confidence: f32,
    mode: ColorMode,
) -> usize {
    debug_assert!(confidence > 0.0 && confidence <= 1.0);

    if !fits(haystack, needle) {
        return 0;
    }

    let mut scores = score_map(haystack, needle, mode);
    let (nw, nh) = needle.dimensions();
    let (map_w, map_h) = scores.dimensions();
    let mut count = 0;

    loop {
        let extremes = find_extremes(&scores);
        if extremes.max_value < confidence {
            return count;
        }
        count += 1;

        // Suppress every placement whose rectangle would overlap this match,
        // so one on-screen instance is never counted twice.
        let (mx, my) = extremes.max_value_location;
        let x0 = mx.saturating_sub(nw - 1);
        let y0 = my.saturating_sub(nh - 1);
        let x1 = (mx + nw).min(map_w);
        let y1 = (my + nh).min(map_h);
        for y in y0..y1 {
            for x in x0..x1 {
                scores.put_pixel(x, y, Luma([f32::NEG_INFINITY]));
            }
        }
    }
}

fn fits(haystack: &RgbaImage, needle: &RgbaImage) -> bool {
    needle.width() > 0
        && needle.height() > 0
        && needle.width() <= haystack.width()
        && needle.height() <= haystack.height()
}

/// Correlation scores for every placement of the needle.
fn score_map(haystack: &RgbaImage, needle: &RgbaImage, mode: ColorMode) -> ScoreMap {
    match mode {
        ColorMode::Grayscale => ncc(
            &image::imageops::grayscale(haystack),
            &image::imageops::grayscale(needle),
        ),
        ColorMode::Color => {
            // Correlate each color plane independently and average, so hue
            // differences that vanish in grayscale still separate scores.
            let mut avg = ncc(&channel_plane(haystack, 0), &channel_plane(needle, 0));
            let g = ncc(&channel_plane(haystack, 1), &channel_plane(needle, 1));
            let b = ncc(&channel_plane(haystack, 2), &channel_plane(needle, 2));
            for ((a, g), b) in avg.pixels_mut().zip(g.pixels()).zip(b.pixels()) {
                a[0] = (a[0] + g[0] + b[0]) / 3.0;
            }
            avg
        }
    }
}

fn ncc(haystack: &GrayImage, needle: &GrayImage) -> ScoreMap {
    match_template_parallel(
        haystack,
        needle,
        MatchTemplateMethod::CrossCorrelationNormalized,
    )
}

fn channel_plane(img: &RgbaImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y)[channel]])
    })
}
