//! Input synthesis
//!
//! Moves the pointer along randomized curved paths and issues clicks and
//! keystrokes with randomized delays and hold durations. Fire-and-forget:
//! nothing here reports success or failure. Callers verify outcomes by
//! re-checking the screen through the matcher, never by trusting that input
//! "worked".

pub mod humanize;

pub use humanize::{DelayRange, Humanizer, PressTiming};

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use crate::error::Error;
use crate::screen::{Point, Region};

/// Mouse buttons this system uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    fn to_enigo(self) -> Button {
        match self {
            MouseButton::Left => Button::Left,
            MouseButton::Right => Button::Right,
        }
    }
}

/// Raw device access behind the synthesizer. The live implementation wraps
/// enigo; the recording implementation backs tests and dry runs.
pub trait InputBackend {
    fn cursor(&mut self) -> Point;
    fn move_abs(&mut self, p: Point);
    fn button(&mut self, button: MouseButton, down: bool);
    fn key(&mut self, key: Key, down: bool);
}

/// Live input device.
pub struct EnigoBackend {
    enigo: Enigo,
}

impl EnigoBackend {
    pub fn new() -> Result<Self, Error> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| Error::Input(e.to_string()))?;
        Ok(Self { enigo })
    }
}

impl InputBackend for EnigoBackend {
    fn cursor(&mut self) -> Point {
        match self.enigo.location() {
            Ok((x, y)) => Point::new(x, y),
            Err(e) => {
                log::debug!("cursor location unavailable: {e}");
                Point::new(0, 0)
            }
        }
    }

    fn move_abs(&mut self, p: Point) {
        if let Err(e) = self.enigo.move_mouse(p.x, p.y, Coordinate::Abs) {
            log::debug!("move_mouse failed: {e}");
        }
    }

    fn button(&mut self, button: MouseButton, down: bool) {
        let direction = if down {
            Direction::Press
        } else {
            Direction::Release
        };
        if let Err(e) = self.enigo.button(button.to_enigo(), direction) {
            log::debug!("button event failed: {e}");
        }
    }

    fn key(&mut self, key: Key, down: bool) {
        let direction = if down {
            Direction::Press
        } else {
            Direction::Release
        };
        if let Err(e) = self.enigo.key(key, direction) {
            log::debug!("key event failed: {e}");
        }
    }
}

/// Records every event instead of emitting it. Tests assert against the
/// event log; a dry-run mode can print it.
pub struct Recorder {
    cursor: Point,
    pub events: Vec<RecordedEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordedEvent {
    Move(Point),
    Button { button: MouseButton, down: bool },
    Key { key: Key, down: bool },
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            cursor: Point::new(0, 0),
            events: Vec::new(),
        }
    }

    /// Count of completed presses (down events) for a button.
    pub fn clicks(&self, button: MouseButton) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::Button { button: b, down: true } if *b == button))
            .count()
    }
}

impl InputBackend for Recorder {
    fn cursor(&mut self) -> Point {
        self.cursor
    }

    fn move_abs(&mut self, p: Point) {
        self.cursor = p;
        self.events.push(RecordedEvent::Move(p));
    }

    fn button(&mut self, button: MouseButton, down: bool) {
        self.events.push(RecordedEvent::Button { button, down });
    }

    fn key(&mut self, key: Key, down: bool) {
        self.events.push(RecordedEvent::Key { key, down });
    }
}

// A shared recorder, so a test can keep a handle on the log while the
// synthesizer owns the backend.
impl InputBackend for std::rc::Rc<std::cell::RefCell<Recorder>> {
    fn cursor(&mut self) -> Point {
        self.borrow_mut().cursor()
    }

    fn move_abs(&mut self, p: Point) {
        self.borrow_mut().move_abs(p);
    }

    fn button(&mut self, button: MouseButton, down: bool) {
        self.borrow_mut().button(button, down);
    }

    fn key(&mut self, key: Key, down: bool) {
        self.borrow_mut().key(key, down);
    }
}

/// Human-like input on top of a raw backend.
pub struct InputSynthesizer {
    backend: Box<dyn InputBackend>,
    humanizer: Humanizer,
    click_timing: PressTiming,
    key_timing: PressTiming,
}

impl InputSynthesizer {
    pub fn new(backend: Box<dyn InputBackend>) -> Self {
        Self {
            backend,
            humanizer: Humanizer::new(),
            click_timing: PressTiming::CLICK,
            key_timing: PressTiming::KEY,
        }
    }

    /// Synthesizer driving the real input device.
    pub fn desktop() -> Result<Self, Error> {
        Ok(Self::new(Box::new(EnigoBackend::new()?)))
    }

    /// Override the default press timings. Tests use `PressTiming::INSTANT`.
    pub fn with_timings(mut self, click: PressTiming, key: PressTiming) -> Self {
        self.click_timing = click;
        self.key_timing = key;
        self
    }

    pub fn humanizer(&mut self) -> &mut Humanizer {
        &mut self.humanizer
    }

    /// Move to a uniformly random point inside the region along a curved
    /// path. Returns the point the pointer ended on.
    pub fn move_to_region(&mut self, region: &Region) -> Point {
        let target = self.humanizer.point_in(region);
        self.move_to_point(target);
        target
    }

    fn move_to_point(&mut self, target: Point) {
        let from = self.backend.cursor();
        for step in self.humanizer.pointer_path(from, target) {
            self.backend.move_abs(step);
            std::thread::sleep(self.humanizer.step_pause());
        }
    }

    /// Move by a delta drawn from `bounds` (a rectangle of delta values),
    /// optionally flipping the sign of each axis at random so the pointer
    /// can wander either way from where it is.
    pub fn move_relative(&mut self, bounds: &Region, random_flip: bool) {
        let delta = self.humanizer.point_in(bounds);
        let (mut dx, mut dy) = (delta.x, delta.y);
        if random_flip {
            dx = self.humanizer.flip_sign(dx);
            dy = self.humanizer.flip_sign(dy);
        }
        let target = self.backend.cursor().offset(dx, dy);
        self.move_to_point(target);
    }

    /// Press and release a mouse button with randomized pre-delay, hold
    /// duration, and post-delay.
    pub fn click(&mut self, button: MouseButton, timing: PressTiming) {
        std::thread::sleep(self.humanizer.delay(&timing.pre));
        self.backend.button(button, true);
        std::thread::sleep(self.humanizer.delay(&timing.hold));
        self.backend.button(button, false);
        std::thread::sleep(self.humanizer.delay(&timing.post));
    }

    /// Left click with the synthesizer's default timing.
    pub fn click_left(&mut self) {
        self.click(MouseButton::Left, self.click_timing);
    }

    /// Press and release a key with randomized delays and hold.
    pub fn key_press(&mut self, key: Key, timing: PressTiming) {
        std::thread::sleep(self.humanizer.delay(&timing.pre));
        self.backend.key(key, true);
        std::thread::sleep(self.humanizer.delay(&timing.hold));
        self.backend.key(key, false);
        std::thread::sleep(self.humanizer.delay(&timing.post));
    }

    /// Key press with the synthesizer's default timing.
    pub fn press(&mut self, key: Key) {
        self.key_press(key, self.key_timing);
    }

    /// Hold a key down for a duration, for camera drift.
    pub fn key_hold(&mut self, key: Key, duration: std::time::Duration) {
        self.backend.key(key, true);
        std::thread::sleep(duration);
        self.backend.key(key, false);
    }

    /// Press and release a modifier around a closure, for shift-clicks.
    pub fn with_key_held<F: FnOnce(&mut Self)>(&mut self, key: Key, f: F) {
        self.backend.key(key, true);
        f(self);
        self.backend.key(key, false);
    }

    /// Type a string one character at a time with the default key timing.
    pub fn type_text(&mut self, text: &str) {
        let timing = self.key_timing;
        for c in text.chars() {
            self.key_press(Key::Unicode(c), timing);
        }
    }
}

/// Map a configured key name to an enigo key. Single characters become
/// `Key::Unicode`; names cover the bindable specials.
pub fn parse_key(name: &str) -> Option<Key> {
    let key = match name {
        "F1" => Key::F1,
        "F2" => Key::F2,
        "F3" => Key::F3,
        "F4" => Key::F4,
        "F5" => Key::F5,
        "F6" => Key::F6,
        "F7" => Key::F7,
        "F8" => Key::F8,
        "F9" => Key::F9,
        "F10" => Key::F10,
        "F11" => Key::F11,
        "F12" => Key::F12,
        "Escape" | "Esc" => Key::Escape,
        "Return" | "Enter" => Key::Return,
        "Tab" => Key::Tab,
        "Space" => Key::Space,
        "Up" => Key::UpArrow,
        "Down" => Key::DownArrow,
        "Left" => Key::LeftArrow,
        "Right" => Key::RightArrow,
        _ => {
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            Key::Unicode(c)
        }
    };
    Some(key)
}
