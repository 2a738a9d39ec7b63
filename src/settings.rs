//! Player settings and upgrades
//!
//! Serialized as JSON by the host; the simulation only reads upgrade levels
//! and writes back the coin balance and unlocked levels.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_UPGRADE;
use crate::highscores::HighScores;

/// Default player ship colour seed
pub const DEFAULT_SHIP_COLOR: u32 = 1301;

/// Purchasable ship upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    Gun,
    Side,
    Shield,
    Bombs,
    Magnet,
}

impl Upgrade {
    pub const ALL: [Upgrade; 5] = [
        Upgrade::Gun,
        Upgrade::Side,
        Upgrade::Shield,
        Upgrade::Bombs,
        Upgrade::Magnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Upgrade::Gun => "Main Gun",
            Upgrade::Side => "Side Cannon",
            Upgrade::Shield => "Shield",
            Upgrade::Bombs => "Bombs",
            Upgrade::Magnet => "Magnet",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Upgrade levels, each in `0..=MAX_UPGRADE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Upgrades([u8; 5]);

impl Upgrades {
    pub fn new(levels: [u8; 5]) -> Self {
        Self(levels.map(|l| l.min(MAX_UPGRADE)))
    }

    #[inline]
    pub fn level(&self, upgrade: Upgrade) -> u8 {
        self.0[upgrade.index()]
    }

    /// Raise one level; false when already maxed
    pub fn raise(&mut self, upgrade: Upgrade) -> bool {
        let slot = &mut self.0[upgrade.index()];
        if *slot >= MAX_UPGRADE {
            return false;
        }
        *slot += 1;
        true
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Highest level index unlocked
    #[serde(default)]
    pub unlocked_level: usize,
    /// Coin balance
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub upgrades: Upgrades,
    /// Colour seed for the player ship
    #[serde(default = "default_ship_color")]
    pub ship_color: u32,
    /// Best score per level
    #[serde(default)]
    pub top_scores: HighScores,
}

fn default_ship_color() -> u32 {
    DEFAULT_SHIP_COLOR
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            unlocked_level: 0,
            stars: 0,
            upgrades: Upgrades::default(),
            ship_color: DEFAULT_SHIP_COLOR,
            top_scores: HighScores::new(),
        }
    }
}

impl Settings {
    /// Storage key the host persists settings under
    pub const STORAGE_KEY: &'static str = "Galaxy Raid";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        // Clamp hand-edited values
        settings.upgrades = Upgrades::new(settings.upgrades.0);
        Ok(settings)
    }

    /// Parse, falling back to defaults on corrupt input
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Some(Err(err)) => {
                log::warn!("Ignoring corrupt settings: {}", err);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[inline]
    pub fn upgrade_level(&self, upgrade: Upgrade) -> u8 {
        self.upgrades.level(upgrade)
    }

    /// Unlock `level` if it is beyond the current frontier; true when it was new
    pub fn unlock(&mut self, level: usize) -> bool {
        if level > self.unlocked_level {
            self.unlocked_level = level;
            true
        } else {
            false
        }
    }
}
