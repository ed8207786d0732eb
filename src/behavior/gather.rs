//! Resource-gathering loop
//!
//! The generic skeleton behind mining-style activities: find a full
//! resource, click it, confirm the action started from the chat log, then
//! wait for the resource to empty or the inventory to fill. A click that
//! never produces a chat message while the resource stays full is treated
//! as a miss and the search restarts; it is not an error.
//!
//! The resource set is an ordered rotation: each depleted resource advances
//! the rotation to the next entry, never re-randomized.

use crate::error::{Error, Result};
use crate::input::DelayRange;
use crate::poll::RetryPolicy;
use crate::protocol::Quantity;
use crate::vision::NeedleSpec;
use crate::Session;

/// One resource in the rotation: its harvestable and depleted needles.
#[derive(Debug, Clone, Copy)]
pub struct ResourcePair {
    pub full: NeedleSpec,
    pub empty: NeedleSpec,
}

/// The needles describing one gathering activity.
#[derive(Debug, Clone, Copy)]
pub struct GatherPlan {
    /// Ordered resource rotation; at least one entry.
    pub resources: &'static [ResourcePair],
    /// Chat message confirming the action began.
    pub action_started: NeedleSpec,
    /// Chat message reporting a full inventory.
    pub inventory_full: NeedleSpec,
    /// The item the activity accumulates, for banking.
    pub gathered_item: NeedleSpec,
    /// Occasional valuable drops, banked or discarded per configuration.
    pub byproducts: &'static [NeedleSpec],
}

/// States of one gathering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherState {
    SearchingForResource,
    WaitingForActionStart,
    WaitingForActionFinish,
}

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The resource emptied; rotate to the next one.
    ResourceDepleted,
    /// The inventory filled; bank before continuing.
    InventoryFull,
    /// The action never started and the resource is still full. The click
    /// probably missed; search again.
    MissedClick,
}

/// Finding the next full resource. Respawns take a while.
const SEARCH_POLL: RetryPolicy = RetryPolicy::new(8, 600, 1200);
/// Waiting for the action-started chat message after the click.
const ACTION_START_POLL: RetryPolicy = RetryPolicy::new(6, 500, 900);
/// Iterations watching for the resource to empty or the inventory to fill.
const FINISH_ATTEMPTS: u32 = 20;
const FINISH_WAIT: DelayRange = DelayRange::new(600, 1100);
/// Slot ceiling when discarding byproducts one stack at a time.
const DISCARD_LIMIT: u32 = 28;

impl Session {
    /// One pass of the gathering state machine against the resource at
    /// `rotation` (taken modulo the rotation length).
    pub fn gather_pass(&mut self, plan: &GatherPlan, rotation: usize) -> Result<PassOutcome> {
        if plan.resources.is_empty() {
            return Err(Error::protocol("gather", "empty resource rotation"));
        }
        let resource = plan.resources[rotation % plan.resources.len()];
        let game_view = self.regions.game_view;
        let mut state = GatherState::SearchingForResource;

        loop {
            match state {
                GatherState::SearchingForResource => {
                    let target = self
                        .await_needle(&resource.full, &game_view, &SEARCH_POLL)?
                        .region()
                        .ok_or_else(|| {
                            Error::protocol(
                                "gather",
                                format!("no {} visible in the viewport", resource.full.id),
                            )
                        })?;
                    self.input.move_to_region(&target);
                    self.input.click_left();
                    self.park_pointer();
                    state = GatherState::WaitingForActionStart;
                }

                GatherState::WaitingForActionStart => {
                    let chat = self.regions.chat_recent;
                    let started = self
                        .await_needle(&plan.action_started, &chat, &ACTION_START_POLL)?
                        .is_found();
                    if started {
                        state = GatherState::WaitingForActionFinish;
                    } else if self.is_visible(&resource.full, &game_view)? {
                        // No confirmation and the resource is untouched: the
                        // click missed.
                        log::debug!("{}: click missed, searching again", resource.full.id);
                        return Ok(PassOutcome::MissedClick);
                    } else {
                        // The resource changed without a message; assume the
                        // action is underway.
                        state = GatherState::WaitingForActionFinish;
                    }
                }

                GatherState::WaitingForActionFinish => {
                    for _ in 0..FINISH_ATTEMPTS {
                        if self.chat_shows(&plan.inventory_full)? {
                            return Ok(PassOutcome::InventoryFull);
                        }
                        if self.is_visible(&resource.empty, &game_view)? {
                            return Ok(PassOutcome::ResourceDepleted);
                        }
                        let wait = self.input.humanizer().delay(&FINISH_WAIT);
                        std::thread::sleep(wait);
                    }
                    // Lost track of the resource entirely; start over.
                    log::debug!("{}: never saw it finish", resource.full.id);
                    return Ok(PassOutcome::MissedClick);
                }
            }
        }
    }

    /// Run the gathering activity until a hard failure.
    pub fn run_gather_loop(&mut self, plan: &GatherPlan) -> Result<()> {
        log::info!("gathering {} until stopped", plan.gathered_item.id);
        let mut rotation = 0usize;
        loop {
            match self.gather_pass(plan, rotation)? {
                PassOutcome::MissedClick => continue,
                PassOutcome::ResourceDepleted => {
                    rotation = rotation.wrapping_add(1);
                    self.stats.items_gathered += 1;
                    self.stats.passes_completed += 1;
                    self.maybe_idle_action();
                    self.maybe_break();
                }
                PassOutcome::InventoryFull => {
                    log::info!(
                        "inventory full after {} items, banking",
                        self.stats.items_gathered
                    );
                    self.bank_gathered(plan)?;
                    self.stats.passes_completed += 1;
                }
            }
        }
    }

    /// Empty the inventory at the bank: store the gathered item and any
    /// byproducts flagged keep, discard the rest, close the bank.
    fn bank_gathered(&mut self, plan: &GatherPlan) -> Result<()> {
        self.open_bank()?;
        self.configure_bank_quantity_all()?;
        self.deposit(&plan.gathered_item, Quantity::All)?;

        for byproduct in plan.byproducts {
            if self.settings.byproducts.keeps(byproduct.id) {
                self.deposit(byproduct, Quantity::All)?;
            }
        }
        self.close_bank()?;

        // Discarding needs the inventory unobstructed by the bank window.
        for byproduct in plan.byproducts {
            if self.settings.byproducts.keeps(byproduct.id) {
                continue;
            }
            for _ in 0..DISCARD_LIMIT {
                if !self.drop_item(byproduct)? {
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::vision::{ColorMode, FrameScript, NeedleSet, StaticFrame};
    use image::RgbaImage;

    const TEST_ROCKS: &[ResourcePair] = &[
        ResourcePair {
            full: NeedleSpec::new("test/rock_a_full.png", 0.9, ColorMode::Color),
            empty: NeedleSpec::new("test/rock_a_empty.png", 0.9, ColorMode::Color),
        },
        ResourcePair {
            full: NeedleSpec::new("test/rock_b_full.png", 0.9, ColorMode::Color),
            empty: NeedleSpec::new("test/rock_b_empty.png", 0.9, ColorMode::Color),
        },
    ];

    fn test_plan() -> GatherPlan {
        GatherPlan {
            resources: TEST_ROCKS,
            action_started: NeedleSpec::new("test/chat_start.png", 0.9, ColorMode::Grayscale),
            inventory_full: NeedleSpec::new("test/chat_full.png", 0.9, ColorMode::Grayscale),
            gathered_item: NeedleSpec::new("test/ore.png", 0.9, ColorMode::Color),
            byproducts: &[],
        }
    }

    /// Images for rock A full/empty, rock B full, and the two chat lines.
    fn needle_set(plan: &GatherPlan) -> (NeedleSet, [RgbaImage; 5]) {
        let a_full = pattern(1);
        let a_empty = pattern(3);
        let b_full = pattern(4);
        let started = pattern(5);
        let inv_full = pattern(7);

        let mut set = NeedleSet::new("/nonexistent");
        set.insert(plan.resources[0].full.id, a_full.clone());
        set.insert(plan.resources[0].empty.id, a_empty.clone());
        set.insert(plan.resources[1].full.id, b_full.clone());
        set.insert(plan.resources[1].empty.id, pattern(6));
        set.insert(plan.action_started.id, started.clone());
        set.insert(plan.inventory_full.id, inv_full.clone());
        (set, [a_full, a_empty, b_full, started, inv_full])
    }

    /// Display-sized frame; the region map in tests is anchored at (0, 0),
    /// so the game viewport starts at (4, 4) and the most recent chat line
    /// sits at y=438.
    fn base_frame() -> RgbaImage {
        textured_frame(800, 600)
    }

    #[test]
    fn test_missed_click_returns_to_search_without_raising() {
        let plan = test_plan();
        let (needles, [a_full, ..]) = needle_set(&plan);

        // The rock stays full and the chat stays silent for the whole pass.
        let mut frame = base_frame();
        stamp(&mut frame, &a_full, 100, 100);

        let (mut session, _) = session_with(Box::new(StaticFrame::new(frame)), needles);
        let outcome = session.gather_pass(&plan, 0).unwrap();
        assert_eq!(outcome, PassOutcome::MissedClick);
    }

    #[test]
    fn test_depleted_resource_ends_the_pass() {
        let plan = test_plan();
        let (needles, [a_full, a_empty, _, started, _]) = needle_set(&plan);

        let mut searching = base_frame();
        stamp(&mut searching, &a_full, 100, 100);

        let mut confirming = base_frame();
        stamp(&mut confirming, &started, 10, 440);

        let mut finished = base_frame();
        stamp(&mut finished, &a_empty, 100, 100);

        // Grabs: viewport (rock full), chat (started), chat (silent),
        // viewport (rock empty).
        let script = FrameScript::new(vec![searching, confirming, finished.clone(), finished]);
        let (mut session, _) = session_with(Box::new(script), needles);

        let outcome = session.gather_pass(&plan, 0).unwrap();
        assert_eq!(outcome, PassOutcome::ResourceDepleted);
    }

    #[test]
    fn test_rotation_selects_the_next_resource() {
        let plan = test_plan();
        let (needles, [_, _, b_full, started, inv_full]) = needle_set(&plan);

        // Only rock B is on screen; a pass at rotation 1 must target it.
        let mut searching = base_frame();
        stamp(&mut searching, &b_full, 200, 150);

        let mut confirming = base_frame();
        stamp(&mut confirming, &started, 10, 440);

        let mut full_message = base_frame();
        stamp(&mut full_message, &inv_full, 10, 440);

        let script = FrameScript::new(vec![searching, confirming, full_message]);
        let (mut session, _) = session_with(Box::new(script), needles);

        let outcome = session.gather_pass(&plan, 1).unwrap();
        assert_eq!(outcome, PassOutcome::InventoryFull);
    }

    #[test]
    fn test_full_inventory_ends_the_pass() {
        let plan = test_plan();
        let (needles, [a_full, _, _, started, inv_full]) = needle_set(&plan);

        let mut searching = base_frame();
        stamp(&mut searching, &a_full, 100, 100);

        let mut confirming = base_frame();
        stamp(&mut confirming, &started, 10, 440);

        let mut full_message = base_frame();
        stamp(&mut full_message, &inv_full, 10, 440);

        let script = FrameScript::new(vec![searching, confirming, full_message]);
        let (mut session, _) = session_with(Box::new(script), needles);

        let outcome = session.gather_pass(&plan, 0).unwrap();
        assert_eq!(outcome, PassOutcome::InventoryFull);
    }
}
