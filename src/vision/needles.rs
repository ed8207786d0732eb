//! Needle assets
//!
//! A needle is an externally supplied reference image identified by its
//! path under the asset root, with a per-needle confidence threshold and
//! color mode. Confidences are tuned per operation and kept as named
//! constants here; there is no universal default.

use image::RgbaImage;
use std::collections::HashMap;
use std::path::PathBuf;

use super::{ColorMode, VisionError};

/// Identity and matching parameters of one needle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeedleSpec {
    /// Path relative to the asset root, also the stable identifier.
    pub id: &'static str,
    /// Minimum accepted correlation, in (0, 1].
    pub confidence: f32,
    pub mode: ColorMode,
}

impl NeedleSpec {
    pub const fn new(id: &'static str, confidence: f32, mode: ColorMode) -> Self {
        assert!(confidence > 0.0 && confidence <= 1.0);
        Self {
            id,
            confidence,
            mode,
        }
    }
}

/// The needle catalogue, organized by semantic purpose like the asset tree.
///
/// Color mode rationale: pairs whose confusable states differ mainly in hue
/// (ore veins, gems, toggle highlights) match in color; chrome that is
/// unique in shape (buttons, tab icons, chat glyphs) matches grayscale.
pub mod specs {
    use super::NeedleSpec;
    use crate::vision::ColorMode::{Color, Grayscale};

    // Orientation anchors.
    pub const LOGGED_IN_ANCHOR: NeedleSpec =
        NeedleSpec::new("orient/compass.png", 0.85, Grayscale);
    pub const LOGGED_OUT_ANCHOR: NeedleSpec =
        NeedleSpec::new("orient/login_logo.png", 0.85, Grayscale);

    // Login and logout chrome.
    pub const EXISTING_USER_BUTTON: NeedleSpec =
        NeedleSpec::new("buttons/existing_user.png", 0.9, Grayscale);
    pub const CLICK_TO_PLAY_BUTTON: NeedleSpec =
        NeedleSpec::new("buttons/click_to_play.png", 0.9, Grayscale);
    pub const LOGOUT_BUTTON: NeedleSpec =
        NeedleSpec::new("buttons/logout.png", 0.92, Grayscale);

    // Side-panel tabs: selected state has a highlighted backplate, so the
    // pair is matched in color.
    pub const INVENTORY_TAB: NeedleSpec =
        NeedleSpec::new("tabs/inventory.png", 0.9, Color);
    pub const INVENTORY_TAB_SELECTED: NeedleSpec =
        NeedleSpec::new("tabs/inventory_selected.png", 0.9, Color);
    pub const LOGOUT_TAB: NeedleSpec = NeedleSpec::new("tabs/logout.png", 0.9, Color);
    pub const LOGOUT_TAB_SELECTED: NeedleSpec =
        NeedleSpec::new("tabs/logout_selected.png", 0.9, Color);

    // Bank interface.
    pub const BANK_BOOTH: NeedleSpec = NeedleSpec::new("bank/booth.png", 0.78, Color);
    pub const BANK_WINDOW: NeedleSpec =
        NeedleSpec::new("bank/window_title.png", 0.92, Grayscale);
    pub const BANK_PIN_PROMPT: NeedleSpec =
        NeedleSpec::new("bank/pin_prompt.png", 0.92, Grayscale);
    pub const BANK_CLOSE_BUTTON: NeedleSpec =
        NeedleSpec::new("bank/close.png", 0.92, Grayscale);
    pub const BANK_DEPOSIT_INVENTORY: NeedleSpec =
        NeedleSpec::new("bank/deposit_inventory.png", 0.9, Grayscale);
    /// Quantity-All toggle; the enabled state differs only by its red
    /// highlight border, hence color.
    pub const BANK_QTY_ALL_OFF: NeedleSpec =
        NeedleSpec::new("bank/qty_all_off.png", 0.93, Color);
    pub const BANK_QTY_ALL_ON: NeedleSpec =
        NeedleSpec::new("bank/qty_all_on.png", 0.93, Color);

    /// PIN pad digits; the pad shuffles them, so each is located per click.
    pub const PIN_DIGITS: [NeedleSpec; 10] = [
        NeedleSpec::new("pin/0.png", 0.93, Grayscale),
        NeedleSpec::new("pin/1.png", 0.93, Grayscale),
        NeedleSpec::new("pin/2.png", 0.93, Grayscale),
        NeedleSpec::new("pin/3.png", 0.93, Grayscale),
        NeedleSpec::new("pin/4.png", 0.93, Grayscale),
        NeedleSpec::new("pin/5.png", 0.93, Grayscale),
        NeedleSpec::new("pin/6.png", 0.93, Grayscale),
        NeedleSpec::new("pin/7.png", 0.93, Grayscale),
        NeedleSpec::new("pin/8.png", 0.93, Grayscale),
        NeedleSpec::new("pin/9.png", 0.93, Grayscale),
    ];

    // Chat messages, matched against the most recent line. Glyphs are
    // monochrome on a fixed background: grayscale on purpose.
    pub const CHAT_MINING_STARTED: NeedleSpec =
        NeedleSpec::new("chat/mining_started.png", 0.82, Grayscale);
    pub const CHAT_INVENTORY_FULL: NeedleSpec =
        NeedleSpec::new("chat/inventory_full.png", 0.82, Grayscale);

    // Resources: ore veins differ from the depleted rock mainly by vein
    // color, so both states match in color.
    pub const ROCK_IRON_FULL: NeedleSpec =
        NeedleSpec::new("rocks/iron_full.png", 0.8, Color);
    pub const ROCK_IRON_EMPTY: NeedleSpec =
        NeedleSpec::new("rocks/iron_empty.png", 0.8, Color);

    // Inventory items. Ore and gems are hue-coded: color.
    pub const ITEM_IRON_ORE: NeedleSpec =
        NeedleSpec::new("items/iron_ore.png", 0.9, Color);
    pub const ITEM_UNCUT_SAPPHIRE: NeedleSpec =
        NeedleSpec::new("items/uncut_sapphire.png", 0.93, Color);
    pub const ITEM_UNCUT_EMERALD: NeedleSpec =
        NeedleSpec::new("items/uncut_emerald.png", 0.93, Color);
    pub const ITEM_UNCUT_RUBY: NeedleSpec =
        NeedleSpec::new("items/uncut_ruby.png", 0.93, Color);
}

/// Load-once cache of needle images under one asset root.
pub struct NeedleSet {
    root: PathBuf,
    cache: HashMap<&'static str, RgbaImage>,
}

impl NeedleSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// The image for a spec, loading it from disk on first use.
    pub fn image(&mut self, spec: &NeedleSpec) -> Result<&RgbaImage, VisionError> {
        if !self.cache.contains_key(spec.id) {
            let path = self.root.join(spec.id);
            let img = image::open(&path)
                .map_err(|source| VisionError::NeedleLoad {
                    path: path.display().to_string(),
                    source,
                })?
                .to_rgba8();
            log::debug!("loaded needle {} ({}x{})", spec.id, img.width(), img.height());
            self.cache.insert(spec.id, img);
        }
        Ok(&self.cache[spec.id])
    }

    /// Pre-seed an image, bypassing disk. Used by tests and calibration
    /// tools that synthesize needles from live captures.
    pub fn insert(&mut self, id: &'static str, image: RgbaImage) {
        self.cache.insert(id, image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_insert_bypasses_disk() {
        let mut set = NeedleSet::new("/nonexistent");
        let spec = NeedleSpec::new("fake/needle.png", 0.9, crate::vision::ColorMode::Grayscale);
        set.insert(spec.id, RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));

        let img = set.image(&spec).unwrap();
        assert_eq!(img.dimensions(), (4, 4));
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let mut set = NeedleSet::new("/nonexistent");
        let spec = NeedleSpec::new("missing.png", 0.9, crate::vision::ColorMode::Grayscale);
        assert!(set.image(&spec).is_err());
    }

    #[test]
    fn test_all_pin_digits_are_distinct_ids() {
        let mut ids: Vec<&str> = specs::PIN_DIGITS.iter().map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
