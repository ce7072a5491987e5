//! Game configuration - the difficulty tables.
//!
//! Damage, boss max-HP and XP-reward amounts are data, not code: they are
//! loaded once (from a TOML file or the built-in defaults) and treated as
//! immutable for the life of the process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Difficulty rating shared by tasks and bosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Quick win
    Easy,
    /// Typical unit of work
    Medium,
    /// Substantial effort
    Hard,
    /// Milestone-sized
    Epic,
}

impl Difficulty {
    /// All difficulties, in ascending order.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Epic,
    ];
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Epic => "Epic",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "epic" => Ok(Difficulty::Epic),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Max HP used when a difficulty is missing from the HP table.
const FALLBACK_BOSS_HP: u32 = 100;

/// Errors from loading or interpreting game configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Difficulty label not in the enumerated set
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

/// The static difficulty tables.
///
/// Lookups never fail: a difficulty missing from a table falls back to a
/// neutral default (0 damage, 0 XP, 100 max HP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Damage dealt by completing a task of each difficulty
    #[serde(default)]
    pub damage: HashMap<Difficulty, u32>,

    /// Max HP a boss of each difficulty starts with
    #[serde(default)]
    pub boss_hp: HashMap<Difficulty, u32>,

    /// XP awarded when a boss of each difficulty is defeated
    #[serde(default)]
    pub xp_reward: HashMap<Difficulty, u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            damage: HashMap::from([
                (Difficulty::Easy, 5),
                (Difficulty::Medium, 10),
                (Difficulty::Hard, 20),
                (Difficulty::Epic, 50),
            ]),
            boss_hp: HashMap::from([
                (Difficulty::Easy, 50),
                (Difficulty::Medium, 100),
                (Difficulty::Hard, 200),
                (Difficulty::Epic, 500),
            ]),
            xp_reward: HashMap::from([
                (Difficulty::Easy, 20),
                (Difficulty::Medium, 50),
                (Difficulty::Hard, 100),
                (Difficulty::Epic, 250),
            ]),
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file. Missing tables keep the
    /// defaults empty, so lookups fall back to the neutral values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Damage dealt by a task of the given difficulty.
    pub fn damage(&self, difficulty: Difficulty) -> u32 {
        self.damage.get(&difficulty).copied().unwrap_or(0)
    }

    /// Starting max HP for a boss of the given difficulty.
    pub fn boss_max_hp(&self, difficulty: Difficulty) -> u32 {
        self.boss_hp
            .get(&difficulty)
            .copied()
            .unwrap_or(FALLBACK_BOSS_HP)
    }

    /// XP awarded for defeating a boss of the given difficulty.
    pub fn xp_reward(&self, difficulty: Difficulty) -> u32 {
        self.xp_reward.get(&difficulty).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_damage_table() {
        let config = GameConfig::default();
        assert_eq!(config.damage(Difficulty::Easy), 5);
        assert_eq!(config.damage(Difficulty::Medium), 10);
        assert_eq!(config.damage(Difficulty::Hard), 20);
        assert_eq!(config.damage(Difficulty::Epic), 50);
    }

    #[test]
    fn missing_difficulty_defaults() {
        let config = GameConfig {
            damage: HashMap::new(),
            boss_hp: HashMap::new(),
            xp_reward: HashMap::new(),
        };
        assert_eq!(config.damage(Difficulty::Hard), 0);
        assert_eq!(config.boss_max_hp(Difficulty::Hard), 100);
        assert_eq!(config.xp_reward(Difficulty::Hard), 0);
    }

    #[test]
    fn parse_partial_toml() {
        let config: GameConfig = toml::from_str(
            r#"
            [damage]
            Easy = 10
            Medium = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.damage(Difficulty::Easy), 10);
        assert_eq!(config.damage(Difficulty::Medium), 20);
        // Absent tables fall back to neutral values
        assert_eq!(config.damage(Difficulty::Epic), 0);
        assert_eq!(config.boss_max_hp(Difficulty::Easy), 100);
    }

    #[test]
    fn difficulty_round_trips_through_str() {
        for d in Difficulty::ALL {
            let parsed: Difficulty = d.to_string().parse().unwrap();
            assert_eq!(parsed, d);
        }
        assert!("Legendary".parse::<Difficulty>().is_err());
    }
}
