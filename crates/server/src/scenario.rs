//! RON scenarios: a roster of players and the host events to replay.
//!
//! ```ron
//! Scenario(
//!     name: "lagged totem",
//!     players: [
//!         (id: 1, name: "Steve", health: 2.0, location: (world: "world", x: 10.5, y: 64.0, z: -3.5),
//!          off_hand: Some((kind: TotemOfUndying, amount: 1)), ghost: true),
//!     ],
//!     steps: [Damage(player: 1, amount: 5.0), Tick(2)],
//! )
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use game_core::{Hand, ItemStack, Location};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use totem_runtime::{PlatformInfo, RevivalConfig};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse scenario {origin}: {source}")]
    Parse {
        origin: String,
        source: ron::error::SpannedError,
    },

    #[error("player id {0} is declared twice")]
    DuplicatePlayer(u64),

    #[error("step {index} references undeclared player {player}")]
    UnknownPlayer { index: usize, player: u64 },
}

/// One replayable run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub platform: PlatformInfo,
    /// Replaces the environment's revival configuration when present.
    #[serde(default)]
    pub config: Option<RevivalConfig>,
    /// Respawn point for players without a bed.
    #[serde(default = "default_spawn")]
    pub spawn: Location,
    pub players: Vec<PlayerSpec>,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub id: u64,
    pub name: String,
    #[serde(default = "default_health")]
    pub health: f64,
    #[serde(default)]
    pub absorption: f64,
    pub location: Location,
    #[serde(default)]
    pub bed: Option<Location>,
    #[serde(default)]
    pub main_hand: Option<ItemStack>,
    #[serde(default)]
    pub off_hand: Option<ItemStack>,
    #[serde(default)]
    pub level: u32,
    /// The host's own totem resolution misses this player: lethal damage
    /// kills them while the totem is still in hand.
    #[serde(default)]
    pub ghost: bool,
}

/// A host event or a passage of time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Post-mitigation damage dealt to a player.
    Damage {
        player: u64,
        amount: f64,
        #[serde(default)]
        cancelled: bool,
    },
    /// Replace a hand slot, e.g. the player moving the totem away.
    SetHand {
        player: u64,
        hand: Hand,
        item: Option<ItemStack>,
    },
    /// Advance the simulation by this many ticks.
    Tick(u64),
    /// The player clicks respawn on the death screen.
    Respawn { player: u64 },
    Quit { player: u64 },
    Join { player: u64 },
    /// Move the clock without running ticks.
    AdvanceClock(u64),
}

impl Step {
    pub fn player(&self) -> Option<u64> {
        match self {
            Step::Damage { player, .. }
            | Step::SetHand { player, .. }
            | Step::Respawn { player }
            | Step::Quit { player }
            | Step::Join { player } => Some(*player),
            Step::Tick(_) | Step::AdvanceClock(_) => None,
        }
    }
}

impl Scenario {
    /// Load and validate a scenario from a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_ron(&content, &path.display().to_string())
    }

    /// Parse and validate scenario text. `origin` only appears in errors.
    pub fn from_ron(content: &str, origin: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(content).map_err(|source| ScenarioError::Parse {
            origin: origin.to_string(),
            source,
        })?;

        scenario.validate()?;
        Ok(scenario)
    }

    /// Every player id is unique and every step names a declared player.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut ids = HashSet::new();
        for player in &self.players {
            if !ids.insert(player.id) {
                return Err(ScenarioError::DuplicatePlayer(player.id));
            }
        }

        for (index, step) in self.steps.iter().enumerate() {
            if let Some(player) = step.player()
                && !ids.contains(&player)
            {
                return Err(ScenarioError::UnknownPlayer { index, player });
            }
        }

        Ok(())
    }
}

fn default_health() -> f64 {
    20.0
}

fn default_spawn() -> Location {
    Location::new("world", 0.5, 64.0, 0.5)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use game_core::ItemKind;

    use super::*;

    const MINIMAL: &str = r#"
        Scenario(
            name: "minimal",
            players: [
                (
                    id: 7,
                    name: "Alex",
                    health: 2.0,
                    location: (world: "world", x: 1.0, y: 64.0, z: 2.0),
                    off_hand: Some((kind: TotemOfUndying, amount: 1)),
                    ghost: true,
                ),
            ],
            steps: [
                Damage(player: 7, amount: 5.0),
                SetHand(player: 7, hand: MainHand, item: None),
                Tick(2),
                AdvanceClock(500),
                Quit(player: 7),
            ],
        )
    "#;

    #[test]
    fn parses_minimal_scenario_with_defaults() {
        let scenario = Scenario::from_ron(MINIMAL, "inline").unwrap();

        assert_eq!(scenario.name, "minimal");
        assert_eq!(scenario.platform, PlatformInfo::default());
        assert_eq!(scenario.config, None);
        assert_eq!(scenario.spawn, default_spawn());

        let alex = &scenario.players[0];
        assert!(alex.ghost);
        assert_eq!(alex.absorption, 0.0);
        assert_eq!(alex.bed, None);
        assert_eq!(alex.off_hand, Some(ItemStack::new(ItemKind::TotemOfUndying, 1)));

        assert_eq!(
            scenario.steps[0],
            Step::Damage {
                player: 7,
                amount: 5.0,
                cancelled: false
            }
        );
        assert_eq!(scenario.steps[2], Step::Tick(2));
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let content = r#"
            Scenario(
                name: "tuned",
                config: Some((cooldown: 2000, revival_health: 4.0)),
                players: [],
                steps: [],
            )
        "#;

        let config = Scenario::from_ron(content, "inline")
            .unwrap()
            .config
            .unwrap();

        assert_eq!(config.cooldown, Duration::from_secs(2));
        assert_eq!(config.revival_health, 4.0);
        assert_eq!(config.effects, RevivalConfig::default().effects);
    }

    #[test]
    fn rejects_steps_for_unknown_players() {
        let content = r#"
            Scenario(
                name: "typo",
                players: [(id: 1, name: "Alex", location: (world: "world", x: 0.0, y: 0.0, z: 0.0))],
                steps: [Tick(1), Quit(player: 2)],
            )
        "#;

        let err = Scenario::from_ron(content, "inline").unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::UnknownPlayer {
                index: 1,
                player: 2
            }
        ));
    }

    #[test]
    fn rejects_duplicate_players() {
        let content = r#"
            Scenario(
                name: "twins",
                players: [
                    (id: 1, name: "Alex", location: (world: "world", x: 0.0, y: 0.0, z: 0.0)),
                    (id: 1, name: "Sam", location: (world: "world", x: 0.0, y: 0.0, z: 0.0)),
                ],
                steps: [],
            )
        "#;

        assert!(matches!(
            Scenario::from_ron(content, "inline"),
            Err(ScenarioError::DuplicatePlayer(1))
        ));
    }

    #[test]
    fn reports_parse_errors_with_origin() {
        let err = Scenario::from_ron("Scenario(name: ", "broken.ron").unwrap_err();

        assert!(matches!(err, ScenarioError::Parse { .. }));
        assert!(err.to_string().contains("broken.ron"));
    }
}
