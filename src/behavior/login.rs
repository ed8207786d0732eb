//! Login and logout
//!
//! Types the credential files into the login form and verifies the
//! resulting session state by its anchor needles. Both flows are verified
//! visually; neither trusts that a click or keystroke took effect.

use crate::config::ConfigError;
use crate::error::{Error, Result};
use crate::input::parse_key;
use crate::poll::RetryPolicy;
use crate::vision::needles::specs;
use crate::Session;

/// Locating login-screen chrome.
const LOGIN_CHROME_POLL: RetryPolicy = RetryPolicy::new(4, 400, 800);
/// The lobby button can take a while after submitting credentials.
const LOBBY_POLL: RetryPolicy = RetryPolicy::new(12, 700, 1200);
/// The world fades in after the lobby click.
const WORLD_POLL: RetryPolicy = RetryPolicy::new(10, 800, 1400);
/// The login screen after a logout click.
const LOGOUT_POLL: RetryPolicy = RetryPolicy::new(8, 700, 1200);

impl Session {
    /// Log in with the configured credentials and confirm the logged-in
    /// anchor is visible.
    pub fn login(&mut self) -> Result<()> {
        log::info!("logging in");
        let client = self.regions.client;

        // The welcome screen shows an existing-user button first; it is
        // absent when the client is already on the credential form.
        if self.is_visible(&specs::EXISTING_USER_BUTTON, &client)? {
            self.click_needle(&specs::EXISTING_USER_BUTTON, &client, &LOGIN_CHROME_POLL)?;
        }

        let username_field = self.regions.login_username;
        self.input.move_to_region(&username_field);
        self.input.click_left();
        self.input.type_text(&self.credentials.username);

        let password_field = self.regions.login_password;
        self.input.move_to_region(&password_field);
        self.input.click_left();
        self.input.type_text(&self.credentials.password);

        let submit = self.regions.login_submit;
        self.input.move_to_region(&submit);
        self.input.click_left();

        // The lobby's "click here to play" confirms the credentials were
        // accepted.
        if !self.click_needle(&specs::CLICK_TO_PLAY_BUTTON, &client, &LOBBY_POLL)? {
            return Err(Error::protocol(
                "login",
                "lobby never appeared after submitting credentials",
            ));
        }
        self.park_pointer();

        if self
            .await_needle(&specs::LOGGED_IN_ANCHOR, &client, &WORLD_POLL)?
            .is_found()
        {
            log::info!("logged in");
            Ok(())
        } else {
            Err(Error::protocol("login", "world never became visible"))
        }
    }

    /// Log out through the logout panel and confirm the login screen.
    pub fn logout(&mut self) -> Result<()> {
        log::info!("logging out");
        let tabs = self.regions.side_tabs;
        let client = self.regions.client;

        let key = parse_key(&self.settings.hotkeys.logout).ok_or_else(|| {
            Error::Config(ConfigError::BadHotkey {
                panel: "logout",
                name: self.settings.hotkeys.logout.clone(),
            })
        })?;

        self.ensure_panel_open(key, &specs::LOGOUT_TAB_SELECTED, &tabs)?;

        if !self.click_needle(&specs::LOGOUT_BUTTON, &tabs, &LOGIN_CHROME_POLL)? {
            return Err(Error::protocol("logout", "logout button not visible"));
        }
        self.park_pointer();

        if self
            .await_needle(&specs::LOGGED_OUT_ANCHOR, &client, &LOGOUT_POLL)?
            .is_found()
        {
            log::info!("logged out");
            Ok(())
        } else {
            Err(Error::protocol("logout", "login screen never appeared"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::RecordedEvent;
    use crate::test_support::*;
    use crate::vision::{FrameScript, NeedleSet};
    use enigo::Key;
    use image::RgbaImage;

    fn login_needles() -> (NeedleSet, RgbaImage, RgbaImage) {
        let play = pattern(2);
        let world = pattern(5);
        let mut set = NeedleSet::new("/nonexistent");
        // The welcome button never appears in these fixtures.
        set.insert(specs::EXISTING_USER_BUTTON.id, pattern(7));
        set.insert(specs::CLICK_TO_PLAY_BUTTON.id, play.clone());
        set.insert(specs::LOGGED_IN_ANCHOR.id, world.clone());
        (set, play, world)
    }

    #[test]
    fn test_login_types_both_credentials() {
        let (needles, play, world) = login_needles();

        let form = textured_frame(800, 600);
        let mut lobby = textured_frame(800, 600);
        stamp(&mut lobby, &play, 300, 250);
        let mut in_world = textured_frame(800, 600);
        stamp(&mut in_world, &world, 600, 30);

        // Grabs: existing-user check (form), lobby poll (lobby), world
        // poll (in_world).
        let script = FrameScript::new(vec![form, lobby, in_world]);
        let (mut session, recorder) = session_with(Box::new(script), needles);

        session.login().unwrap();

        let typed: String = recorder
            .borrow()
            .events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Key {
                    key: Key::Unicode(c),
                    down: true,
                } => Some(*c),
                _ => None,
            })
            .collect();
        assert_eq!(typed, "testerhunter2");
    }
}
