//! Bank protocols
//!
//! Opening and closing the bank, PIN entry, quantity settings, and the
//! deposit/withdraw operations. Every inventory-affecting action is
//! verified by count-delta convergence: a pre-action `count`, an expected
//! post-action count, and bounded re-click/re-poll until the observation
//! matches. Success is never reported on click-issued alone.

use crate::error::{Error, Result};
use crate::poll::RetryPolicy;
use crate::screen::Region;
use crate::vision::needles::specs;
use crate::vision::NeedleSpec;
use crate::Session;

/// How many of an item one operation moves. The client only offers these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    One,
    Five,
    Ten,
    All,
}

impl Quantity {
    /// The exact count, or `None` for "all of them".
    pub fn exact(&self) -> Option<usize> {
        match self {
            Quantity::One => Some(1),
            Quantity::Five => Some(5),
            Quantity::Ten => Some(10),
            Quantity::All => None,
        }
    }
}

/// Locating something clickable (booth, button, digit).
const BANK_CLICK_POLL: RetryPolicy = RetryPolicy::new(3, 300, 700);
/// Waiting for the bank window after clicking the booth.
const BANK_OPEN_POLL: RetryPolicy = RetryPolicy::new(6, 500, 900);
/// Waiting for the window to vanish after the close button.
const BANK_CLOSE_POLL: RetryPolicy = RetryPolicy::new(4, 300, 650);
/// Observing a count change after a deposit/withdraw click.
const CONVERGE_POLL: RetryPolicy = RetryPolicy::new(3, 300, 650);
/// Re-issue ceiling for a click whose count never converges.
const CONVERGE_ATTEMPTS: u32 = 4;
/// Booth-click ceiling before giving up on opening the bank.
const BANK_OPEN_ATTEMPTS: u32 = 3;
/// Consecutive stable observations for withdraw-all convergence.
const WITHDRAW_ALL_POLL: RetryPolicy = RetryPolicy::new(6, 400, 800);

impl Session {
    /// Whether the bank window is on screen.
    pub fn bank_is_open(&mut self) -> Result<bool> {
        let client = self.regions.client;
        self.is_visible(&specs::BANK_WINDOW, &client)
    }

    /// Open the bank by clicking a booth in the game viewport, entering the
    /// PIN when prompted.
    pub fn open_bank(&mut self) -> Result<()> {
        if self.bank_is_open()? {
            return Ok(());
        }

        let game_view = self.regions.game_view;
        let client = self.regions.client;

        for attempt in 1..=BANK_OPEN_ATTEMPTS {
            if !self.click_needle(&specs::BANK_BOOTH, &game_view, &BANK_CLICK_POLL)? {
                log::debug!("no bank booth visible (attempt {attempt})");
                continue;
            }
            self.park_pointer();

            if self
                .await_needle(&specs::BANK_WINDOW, &client, &BANK_OPEN_POLL)?
                .is_found()
            {
                return Ok(());
            }

            if self.is_visible(&specs::BANK_PIN_PROMPT, &client)? {
                self.enter_bank_pin()?;
                if self
                    .await_needle(&specs::BANK_WINDOW, &client, &BANK_OPEN_POLL)?
                    .is_found()
                {
                    return Ok(());
                }
            }
        }

        Err(Error::protocol(
            "open bank",
            format!("bank window never appeared after {BANK_OPEN_ATTEMPTS} booth clicks"),
        ))
    }

    /// Click the four configured PIN digits. The pad shuffles its buttons,
    /// so each digit is located fresh by its needle.
    pub fn enter_bank_pin(&mut self) -> Result<()> {
        log::info!("entering bank PIN");
        let client = self.regions.client;
        let digits = self.settings.pin_digits();

        for digit in digits {
            let spec = specs::PIN_DIGITS[digit];
            if !self.click_needle(&spec, &client, &BANK_CLICK_POLL)? {
                return Err(Error::protocol(
                    "bank pin",
                    format!("digit button {} not visible", spec.id),
                ));
            }
            self.park_pointer();
        }
        Ok(())
    }

    /// Close the bank window if it is open.
    pub fn close_bank(&mut self) -> Result<()> {
        if !self.bank_is_open()? {
            return Ok(());
        }

        let client = self.regions.client;
        for _ in 1..=BANK_OPEN_ATTEMPTS {
            self.click_needle(&specs::BANK_CLOSE_BUTTON, &client, &BANK_CLICK_POLL)?;
            self.park_pointer();
            if self.await_vanish(&specs::BANK_WINDOW, &client, &BANK_CLOSE_POLL)? {
                return Ok(());
            }
        }

        Err(Error::protocol("close bank", "bank window would not close"))
    }

    /// Ensure the bank's quantity selector is on "All".
    pub fn configure_bank_quantity_all(&mut self) -> Result<()> {
        let client = self.regions.client;
        self.ensure_toggle_enabled(
            &specs::BANK_QTY_ALL_OFF,
            &client,
            &specs::BANK_QTY_ALL_ON,
            &client,
        )
    }

    /// Deposit `quantity` of an item from the inventory. Succeeds only when
    /// the inventory count converges on the expected value; an empty
    /// inventory short-circuits to success without a single click.
    pub fn deposit(&mut self, item: &NeedleSpec, quantity: Quantity) -> Result<()> {
        let inventory = self.regions.inventory;
        let before = self.count(item, &inventory)?;
        if before == 0 {
            log::debug!("deposit {}: nothing to deposit", item.id);
            return Ok(());
        }

        let expected = match quantity.exact() {
            Some(q) => before.saturating_sub(q),
            None => 0,
        };

        for attempt in 1..=CONVERGE_ATTEMPTS {
            if !self.click_needle(item, &inventory, &RetryPolicy::probe())? {
                log::debug!("deposit {}: stack not visible on attempt {attempt}", item.id);
            }
            self.park_pointer();

            if self.await_count(item, &inventory, |n| n == expected)? {
                log::info!("deposited {} x{} ({} left)", item.id, before - expected, expected);
                return Ok(());
            }
        }

        Err(Error::protocol(
            "deposit",
            format!(
                "{} count never converged from {before} to {expected}",
                item.id
            ),
        ))
    }

    /// Withdraw `quantity` of an item from the open bank into the
    /// inventory, verified by inventory count convergence. Withdraw-all
    /// converges when the grown count holds across consecutive
    /// observations, since the total in the bank is unknown.
    pub fn withdraw(&mut self, item: &NeedleSpec, quantity: Quantity) -> Result<()> {
        let inventory = self.regions.inventory;
        let client = self.regions.client;
        let before = self.count(item, &inventory)?;

        match quantity.exact() {
            Some(q) => {
                let expected = before + q;
                for attempt in 1..=CONVERGE_ATTEMPTS {
                    if !self.click_needle(item, &client, &RetryPolicy::probe())? {
                        log::debug!("withdraw {}: not visible in bank on attempt {attempt}", item.id);
                    }
                    self.park_pointer();

                    if self.await_count(item, &inventory, |n| n == expected)? {
                        log::info!("withdrew {} x{q}", item.id);
                        return Ok(());
                    }
                }
                Err(Error::protocol(
                    "withdraw",
                    format!("{} count never reached {expected}", item.id),
                ))
            }
            None => {
                if !self.click_needle(item, &client, &BANK_CLICK_POLL)? {
                    return Err(Error::protocol(
                        "withdraw",
                        format!("{} not visible in bank", item.id),
                    ));
                }
                self.park_pointer();

                let mut last = before;
                for attempt in 1..=WITHDRAW_ALL_POLL.attempts() {
                    let now = self.count(item, &inventory)?;
                    if now > before && now == last {
                        log::info!("withdrew all {} ({} in inventory)", item.id, now);
                        return Ok(());
                    }
                    last = now;
                    if attempt < WITHDRAW_ALL_POLL.attempts() {
                        std::thread::sleep(std::time::Duration::from_millis(500));
                    }
                }
                Err(Error::protocol(
                    "withdraw",
                    format!("{} count never grew and settled", item.id),
                ))
            }
        }
    }

    /// Poll until the observed count of `item` satisfies the predicate.
    fn await_count<F>(&mut self, item: &NeedleSpec, region: &Region, accept: F) -> Result<bool>
    where
        F: Fn(usize) -> bool,
    {
        let mut failure = None;
        let converged = crate::poll::poll_until_true(
            || match self.count(item, region) {
                Ok(n) => {
                    failure = None;
                    accept(n)
                }
                Err(e) => {
                    failure = Some(e);
                    false
                }
            },
            &CONVERGE_POLL,
        );
        match failure {
            Some(e) => Err(e),
            None => Ok(converged),
        }
    }
}
