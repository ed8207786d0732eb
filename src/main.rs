//! Scapebot CLI
//!
//! Loads the configuration, orients on the client window, logs in if
//! needed, and runs the selected activity until a fatal error or an
//! external kill. `--dump-regions` instead writes one annotated
//! calibration screenshot and exits.

use std::path::{Path, PathBuf};

use scapebot::behavior::Activity;
use scapebot::config::{Credentials, Settings};
use scapebot::input::InputSynthesizer;
use scapebot::screen::{debug, RegionMap};
use scapebot::vision::orient::{orient, ClientLauncher, CommandLauncher};
use scapebot::vision::{NeedleSet, ScreenGrabber, SessionState};
use scapebot::{Error, Session};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("fatal: {e}");
        std::process::exit(1);
    }
}

fn run() -> scapebot::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let dump_regions = args.iter().any(|a| a == "--dump-regions");
    let config_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("settings.json"));

    let settings = Settings::load(&config_path)?;
    let activity = Activity::from_id(&settings.activity)?;
    let credentials = Credentials::load(&settings.credentials)?;

    let mut frames = Box::new(ScreenGrabber::primary()?);
    let mut needles = NeedleSet::new(&settings.assets_dir);

    let mut launcher = settings.launch_command.clone().map(CommandLauncher::new);
    let orientation = orient(
        &mut *frames,
        &mut needles,
        launcher.as_mut().map(|l| l as &mut dyn ClientLauncher),
    )?;
    let regions = RegionMap::new(orientation.anchor);

    if dump_regions {
        debug::dump_regions(&mut *frames, &regions, Path::new("regions.png"))?;
        return Ok(());
    }

    let input = InputSynthesizer::desktop()?;
    let mut session = Session::new(frames, input, regions, needles, settings, credentials);

    if orientation.state == SessionState::LoggedOut {
        session.login()?;
    }

    match activity.run(&mut session) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!(
                "activity {} aborted after {} items in {:?}: {e}",
                activity.id(),
                session.stats.items_gathered,
                session.stats.elapsed()
            );
            if !matches!(e, Error::Orientation { .. }) {
                // Best effort: leave the account at the login screen.
                if let Err(logout_err) = session.logout() {
                    log::warn!("graceful logout failed: {logout_err}");
                }
            }
            Err(e)
        }
    }
}
