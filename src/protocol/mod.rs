//! Generic interaction protocols
//!
//! Reusable building blocks over the region model, matcher, polling engine,
//! and input synthesizer. None of these trust that input "worked": every
//! click is verified by re-checking the screen, and a protocol that cannot
//! reach its target state within its bounded retries raises a
//! `ProtocolFailure` that aborts the current high-level action.

pub mod bank;

pub use bank::Quantity;

use enigo::Key;

use crate::error::{Error, Result};
use crate::poll::RetryPolicy;
use crate::screen::Region;
use crate::vision::NeedleSpec;
use crate::Session;

/// Attempt ceiling for flipping a binary toggle on.
const TOGGLE_ATTEMPTS: u32 = 5;
/// Attempt ceiling for opening a panel via its hotkey.
const PANEL_ATTEMPTS: u32 = 5;
/// Re-poll pacing after a hotkey press.
const PANEL_POLL: RetryPolicy = RetryPolicy::new(3, 200, 450);

/// Delta bounds for parking the pointer away from what it just clicked.
const PARK_DELTA: Region = Region {
    left: 30,
    top: 30,
    width: 60,
    height: 60,
};

impl Session {
    /// Move the pointer a short random distance away so it cannot occlude
    /// the region about to be verified.
    pub fn park_pointer(&mut self) {
        self.input.move_relative(&PARK_DELTA, true);
    }

    /// Ensure a binary UI toggle is ON. Idempotent: when the enabled needle
    /// is already visible nothing is clicked. Otherwise clicks the disabled
    /// needle and re-checks, parking the pointer between attempts.
    pub fn ensure_toggle_enabled(
        &mut self,
        disabled: &NeedleSpec,
        disabled_region: &Region,
        enabled: &NeedleSpec,
        enabled_region: &Region,
    ) -> Result<()> {
        for attempt in 1..=TOGGLE_ATTEMPTS {
            if self.is_visible(enabled, enabled_region)? {
                if attempt > 1 {
                    log::info!("toggle {} enabled after {} attempts", enabled.id, attempt - 1);
                }
                return Ok(());
            }

            match self.probe(disabled, disabled_region)?.region() {
                Some(target) => {
                    self.input.move_to_region(&target);
                    self.input.click_left();
                    self.park_pointer();
                }
                None => {
                    log::debug!(
                        "toggle {}: neither state visible on attempt {attempt}",
                        enabled.id
                    );
                }
            }
        }

        Err(Error::protocol(
            "enable toggle",
            format!("{} not enabled after {TOGGLE_ATTEMPTS} attempts", enabled.id),
        ))
    }

    /// Ensure a hotkey-bound panel is open, confirmed by its open-state
    /// anchor. A panel that never opens means the binding is wrong, which
    /// is a configuration problem, not a transient one.
    pub fn ensure_panel_open(
        &mut self,
        hotkey: Key,
        open_anchor: &NeedleSpec,
        region: &Region,
    ) -> Result<()> {
        for _ in 1..=PANEL_ATTEMPTS {
            if self.is_visible(open_anchor, region)? {
                return Ok(());
            }
            self.input.press(hotkey);
            if self
                .await_needle(open_anchor, region, &PANEL_POLL)?
                .is_found()
            {
                return Ok(());
            }
        }

        Err(Error::protocol(
            "open panel",
            format!(
                "{} not visible after {PANEL_ATTEMPTS} hotkey presses; check the binding",
                open_anchor.id
            ),
        ))
    }

    /// Locate a needle under a policy and click it. Returns whether it was
    /// found and clicked; soft, for callers that treat absence as data.
    pub fn click_needle(
        &mut self,
        spec: &NeedleSpec,
        region: &Region,
        policy: &RetryPolicy,
    ) -> Result<bool> {
        match self.await_needle(spec, region, policy)?.region() {
            Some(target) => {
                self.input.move_to_region(&target);
                self.input.click_left();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop an item from the inventory with a shift-click.
    pub fn drop_item(&mut self, item: &NeedleSpec) -> Result<bool> {
        let inventory = self.regions.inventory;
        match self.probe(item, &inventory)?.region() {
            Some(target) => {
                self.input.move_to_region(&target);
                self.input
                    .with_key_held(Key::Shift, |input| input.click_left());
                self.park_pointer();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
