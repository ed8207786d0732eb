//! Fixed client-window layout
//!
//! One supported window size (765x503 fixed-size client). Every named
//! sub-area is a compile-time offset from the client anchor; supporting
//! another layout means another offset table, not new logic.

use super::{ClientAnchor, Region};

/// Per-area offsets `(dx, dy, width, height)` from the client origin.
pub mod offsets {
    /// Whole client window.
    pub const CLIENT: (i32, i32, u32, u32) = (0, 0, 765, 503);

    /// 3D game viewport.
    pub const GAME_VIEW: (i32, i32, u32, u32) = (4, 4, 512, 334);

    /// 28-slot inventory grid (4 columns x 7 rows).
    pub const INVENTORY: (i32, i32, u32, u32) = (548, 205, 190, 261);

    /// Side-panel tab strip, both rows.
    pub const SIDE_TABS: (i32, i32, u32, u32) = (521, 168, 244, 335);

    /// Chat log including the scrollback.
    pub const CHAT: (i32, i32, u32, u32) = (7, 345, 506, 129);

    /// Minimap plus surrounding orbs.
    pub const MINIMAP: (i32, i32, u32, u32) = (570, 9, 146, 151);

    /// Login screen text fields and buttons. The login layout shares the
    /// client origin, so these coexist with the logged-in offsets above.
    pub const LOGIN_EXISTING_USER: (i32, i32, u32, u32) = (396, 276, 136, 34);
    pub const LOGIN_USERNAME: (i32, i32, u32, u32) = (340, 248, 180, 16);
    pub const LOGIN_PASSWORD: (i32, i32, u32, u32) = (340, 286, 180, 16);
    pub const LOGIN_SUBMIT: (i32, i32, u32, u32) = (232, 308, 136, 34);

    /// Height of one chat line; the most recent message occupies the line
    /// directly above the input row.
    pub const CHAT_LINE_HEIGHT: u32 = 14;
    /// Height of the chat input row at the very bottom of the chat area.
    pub const CHAT_INPUT_HEIGHT: u32 = 22;
}

/// Every named region for one oriented session.
///
/// Constructed once after orientation and read-only afterwards. Derived
/// areas (inventory halves, the most recent chat line, the minimap slice)
/// are computed from their parents here and never independently mutated.
#[derive(Debug, Clone, Copy)]
pub struct RegionMap {
    pub client: Region,
    pub game_view: Region,
    pub inventory: Region,
    pub inventory_left: Region,
    pub inventory_right: Region,
    pub side_tabs: Region,
    pub chat: Region,
    pub chat_recent: Region,
    pub minimap: Region,
    pub minimap_slice: Region,
    pub login_existing_user: Region,
    pub login_username: Region,
    pub login_password: Region,
    pub login_submit: Region,
}

impl RegionMap {
    /// Derive all regions from the client anchor. Pure arithmetic: the same
    /// anchor always yields bit-identical coordinates.
    pub fn new(anchor: ClientAnchor) -> Self {
        let at = |o: (i32, i32, u32, u32)| anchor.region(o.0, o.1, o.2, o.3);

        let inventory = at(offsets::INVENTORY);
        let chat = at(offsets::CHAT);
        let minimap = at(offsets::MINIMAP);

        // The most recent message sits one line above the input row.
        let chat_recent = chat
            .bottom_strip(offsets::CHAT_INPUT_HEIGHT + offsets::CHAT_LINE_HEIGHT)
            .translated(0, -(offsets::CHAT_INPUT_HEIGHT as i32))
            .bottom_strip(offsets::CHAT_LINE_HEIGHT);

        Self {
            client: at(offsets::CLIENT),
            game_view: at(offsets::GAME_VIEW),
            inventory,
            inventory_left: inventory.left_half(),
            inventory_right: inventory.right_half(),
            side_tabs: at(offsets::SIDE_TABS),
            chat,
            chat_recent,
            minimap,
            minimap_slice: minimap.centered(60, 60),
            login_existing_user: at(offsets::LOGIN_EXISTING_USER),
            login_username: at(offsets::LOGIN_USERNAME),
            login_password: at(offsets::LOGIN_PASSWORD),
            login_submit: at(offsets::LOGIN_SUBMIT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Point;

    #[test]
    fn test_same_anchor_same_regions() {
        let anchor = ClientAnchor::new(Point::new(123, 456));
        let a = RegionMap::new(anchor);
        let b = RegionMap::new(anchor);
        assert_eq!(a.inventory, b.inventory);
        assert_eq!(a.chat_recent, b.chat_recent);
        assert_eq!(a.minimap_slice, b.minimap_slice);
    }

    #[test]
    fn test_regions_track_the_anchor() {
        let a = RegionMap::new(ClientAnchor::new(Point::new(0, 0)));
        let b = RegionMap::new(ClientAnchor::new(Point::new(50, -20)));
        assert_eq!(b.inventory, a.inventory.translated(50, -20));
        assert_eq!(b.game_view, a.game_view.translated(50, -20));
    }

    #[test]
    fn test_inventory_halves_stay_inside_parent() {
        let map = RegionMap::new(ClientAnchor::new(Point::new(10, 10)));
        assert_eq!(map.inventory_left.left, map.inventory.left);
        assert_eq!(map.inventory_right.right(), map.inventory.right());
        assert_eq!(
            map.inventory_left.width + map.inventory_right.width,
            map.inventory.width
        );
    }

    #[test]
    fn test_chat_recent_is_one_line_above_input() {
        let map = RegionMap::new(ClientAnchor::new(Point::new(0, 0)));
        assert_eq!(map.chat_recent.height, offsets::CHAT_LINE_HEIGHT);
        assert_eq!(
            map.chat_recent.bottom(),
            map.chat.bottom() - offsets::CHAT_INPUT_HEIGHT as i32
        );
        assert_eq!(map.chat_recent.left, map.chat.left);
    }

    #[test]
    fn test_minimap_slice_is_centered() {
        let map = RegionMap::new(ClientAnchor::new(Point::new(0, 0)));
        assert_eq!(map.minimap_slice.center(), map.minimap.center());
        assert_eq!(map.minimap_slice.width, 60);
    }
}
