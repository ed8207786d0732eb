//! User settings
//!
//! One JSON document covering everything tunable: the selected activity,
//! bank PIN, side-panel hotkey bindings, byproduct keep/drop flags, mimicry
//! knobs, the needle asset root, and the optional client launch command.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::ConfigError;
use crate::input::parse_key;

/// Main settings structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Identifier of the activity to run, e.g. "mine_iron".
    pub activity: String,
    /// Four-digit bank PIN, kept as a string to preserve leading zeros.
    pub bank_pin: String,
    /// Side-panel hotkey bindings.
    pub hotkeys: Hotkeys,
    /// Keep/drop flags for valuable byproducts picked up while gathering.
    pub byproducts: ByproductPolicy,
    /// Human-mimicry tuning.
    pub mimicry: MimicrySettings,
    /// Root directory of the needle image assets.
    pub assets_dir: PathBuf,
    /// Paths of the two credential files.
    pub credentials: CredentialPaths,
    /// Shell command that starts the game client, for launch assistance.
    pub launch_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            activity: "mine_iron".into(),
            bank_pin: "0000".into(),
            hotkeys: Hotkeys::default(),
            byproducts: ByproductPolicy::default(),
            mimicry: MimicrySettings::default(),
            assets_dir: PathBuf::from("assets"),
            credentials: CredentialPaths::default(),
            launch_command: None,
        }
    }
}

impl Settings {
    /// Load and validate a settings document.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Startup-time validation of everything checkable without the screen.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bank_pin.len() != 4 || !self.bank_pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidPin);
        }
        self.hotkeys.validate()?;
        Ok(())
    }

    /// The PIN as four digit values in entry order.
    pub fn pin_digits(&self) -> [usize; 4] {
        let mut digits = [0usize; 4];
        for (i, c) in self.bank_pin.chars().enumerate().take(4) {
            digits[i] = c.to_digit(10).unwrap_or(0) as usize;
        }
        digits
    }
}

/// One key name per side panel. Names are resolved through
/// `input::parse_key` ("F3", "Escape", single characters).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotkeys {
    pub attacks: String,
    pub skills: String,
    pub quests: String,
    pub inventory: String,
    pub equipment: String,
    pub prayers: String,
    pub spellbook: String,
    pub friends: String,
    pub settings: String,
    pub music: String,
    pub logout: String,
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            attacks: "F1".into(),
            skills: "F2".into(),
            quests: "F3".into(),
            inventory: "F4".into(),
            equipment: "F5".into(),
            prayers: "F6".into(),
            spellbook: "F7".into(),
            friends: "F8".into(),
            settings: "F10".into(),
            music: "F12".into(),
            logout: "F11".into(),
        }
    }
}

impl Hotkeys {
    fn validate(&self) -> Result<(), ConfigError> {
        for (panel, name) in self.bindings() {
            if parse_key(name).is_none() {
                return Err(ConfigError::BadHotkey {
                    panel,
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn bindings(&self) -> [(&'static str, &str); 11] {
        [
            ("attacks", &self.attacks),
            ("skills", &self.skills),
            ("quests", &self.quests),
            ("inventory", &self.inventory),
            ("equipment", &self.equipment),
            ("prayers", &self.prayers),
            ("spellbook", &self.spellbook),
            ("friends", &self.friends),
            ("settings", &self.settings),
            ("music", &self.music),
            ("logout", &self.logout),
        ]
    }
}

/// Keep/drop flags for gem-like byproducts, keyed by item needle id.
/// Unlisted items are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ByproductPolicy {
    pub keep: BTreeMap<String, bool>,
}

impl ByproductPolicy {
    pub fn keeps(&self, item_id: &str) -> bool {
        self.keep.get(item_id).copied().unwrap_or(true)
    }
}

/// Human-mimicry tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MimicrySettings {
    /// Probability of an idle micro-action between passes (0.0-1.0).
    pub idle_action_probability: f32,
    /// Whether idle actions may drift the camera with held arrow keys.
    pub camera_drift: bool,
}

impl Default for MimicrySettings {
    fn default() -> Self {
        Self {
            idle_action_probability: 0.08,
            camera_drift: true,
        }
    }
}

/// Locations of the two plain-text credential files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialPaths {
    pub username_file: PathBuf,
    pub password_file: PathBuf,
}

impl Default for CredentialPaths {
    fn default() -> Self {
        Self {
            username_file: PathBuf::from("username.txt"),
            password_file: PathBuf::from("password.txt"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn test_bad_pin_is_rejected() {
        let mut settings = Settings::default();
        settings.bank_pin = "12a4".into();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidPin)
        ));

        settings.bank_pin = "12345".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_pin_digits_preserve_order_and_zeros() {
        let mut settings = Settings::default();
        settings.bank_pin = "0417".into();
        assert_eq!(settings.pin_digits(), [0, 4, 1, 7]);
    }

    #[test]
    fn test_bad_hotkey_is_rejected() {
        let mut settings = Settings::default();
        settings.hotkeys.inventory = "NotAKey".into();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::BadHotkey { panel: "inventory", .. })
        ));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "activity": "mine_iron", "bank_pin": "1234" }"#).unwrap();
        assert_eq!(settings.bank_pin, "1234");
        assert_eq!(settings.hotkeys.inventory, "F4");
        assert!(settings.byproducts.keeps("items/uncut_ruby.png"));
    }

    #[test]
    fn test_byproduct_flags() {
        let mut policy = ByproductPolicy::default();
        policy.keep.insert("items/uncut_sapphire.png".into(), false);
        assert!(!policy.keeps("items/uncut_sapphire.png"));
        assert!(policy.keeps("items/uncut_ruby.png"));
    }
}
