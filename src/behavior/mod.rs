//! Behavior state machine
//!
//! Login/logout, idle mimicry, the resource-gathering skeleton, and the
//! registry mapping configured activity identifiers to runnable plans.

pub mod gather;
pub mod idle;
pub mod login;

pub use gather::{GatherPlan, GatherState, PassOutcome, ResourcePair};

use crate::config::ConfigError;
use crate::vision::needles::specs;
use crate::vision::NeedleSpec;
use crate::Session;

const IRON_ROCKS: [ResourcePair; 1] = [ResourcePair {
    full: specs::ROCK_IRON_FULL,
    empty: specs::ROCK_IRON_EMPTY,
}];

const IRON_BYPRODUCTS: [NeedleSpec; 3] = [
    specs::ITEM_UNCUT_SAPPHIRE,
    specs::ITEM_UNCUT_EMERALD,
    specs::ITEM_UNCUT_RUBY,
];

/// Activities selectable from the configuration. Unknown identifiers are a
/// startup configuration error, reported before anything touches the
/// screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    MineIron,
}

impl Activity {
    pub fn from_id(id: &str) -> Result<Self, ConfigError> {
        match id {
            "mine_iron" => Ok(Activity::MineIron),
            other => Err(ConfigError::UnknownActivity(other.to_string())),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Activity::MineIron => "mine_iron",
        }
    }

    fn plan(&self) -> GatherPlan {
        match self {
            Activity::MineIron => GatherPlan {
                resources: &IRON_ROCKS,
                action_started: specs::CHAT_MINING_STARTED,
                inventory_full: specs::CHAT_INVENTORY_FULL,
                gathered_item: specs::ITEM_IRON_ORE,
                byproducts: &IRON_BYPRODUCTS,
            },
        }
    }

    /// Run the activity until a hard failure or an external kill.
    pub fn run(&self, session: &mut Session) -> crate::Result<()> {
        log::info!("running activity {}", self.id());
        session.run_gather_loop(&self.plan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_activity_resolves() {
        assert_eq!(Activity::from_id("mine_iron").unwrap(), Activity::MineIron);
    }

    #[test]
    fn test_unknown_activity_is_a_config_error() {
        let err = Activity::from_id("bake_bread").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownActivity(id) if id == "bake_bread"));
    }

    #[test]
    fn test_activity_ids_round_trip() {
        for activity in [Activity::MineIron] {
            assert_eq!(Activity::from_id(activity.id()).unwrap(), activity);
        }
    }
}
