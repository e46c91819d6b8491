use std::{fs, path::Path, path::PathBuf, time::Duration};

use delve_system_procgen::Config as DungeonConfig;
use delve_system_progression::Config as ProgressionConfig;
use delve_system_spawning::Config as SpawningConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read game config at {path}")]
    Io {
        /// Location of the unreadable file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not valid TOML for a game config.
    #[error("failed to parse game config toml")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but is out of range.
    #[error("invalid game config: {0}")]
    Invalid(String),
}

/// Top-level game configuration; every section falls back to its defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Dungeon generation parameters.
    pub dungeon: DungeonSection,
    /// Room progression parameters.
    pub progression: ProgressionSection,
    /// Enemy spawning parameters.
    pub spawning: SpawningSection,
    /// Simulation parameters.
    pub world: WorldSection,
}

/// `[dungeon]` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DungeonSection {
    /// Generator seed; omitted draws one from entropy.
    pub seed: Option<u64>,
    /// Number of rooms the generator aims for.
    pub rooms: usize,
    /// Width and height of the first room in tiles.
    pub first_room_size: (i32, i32),
    /// Smallest room edge in tiles.
    pub min_size: i32,
    /// Largest room edge in tiles.
    pub max_size: i32,
}

impl Default for DungeonSection {
    fn default() -> Self {
        Self {
            seed: None,
            rooms: 6,
            first_room_size: (20, 15),
            min_size: 15,
            max_size: 30,
        }
    }
}

/// `[progression]` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgressionSection {
    /// Seconds a room stays armed before it may lock.
    pub arm_delay_secs: f32,
    /// Pixels the player must keep from every door before a room locks.
    pub min_lock_depth: f32,
}

impl Default for ProgressionSection {
    fn default() -> Self {
        Self {
            arm_delay_secs: 0.3,
            min_lock_depth: 48.0,
        }
    }
}

/// `[spawning]` section.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawningSection {
    /// Placement seed; omitted draws one from entropy.
    pub seed: Option<u64>,
    /// Fewest enemies per locked room.
    pub min_batch: usize,
    /// Most enemies per locked room.
    pub max_batch: usize,
    /// Tries per enemy before its placement is abandoned.
    pub placement_attempts: usize,
    /// Minimum pixels between a spawn point and the player.
    pub player_clearance: f32,
}

impl Default for SpawningSection {
    fn default() -> Self {
        Self {
            seed: None,
            min_batch: 3,
            max_batch: 6,
            placement_attempts: 20,
            player_clearance: 96.0,
        }
    }
}

/// `[world]` section.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldSection {
    /// Seed of the enemy AI stream; omitted draws one from entropy.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Seeds every random stream from one value.
    ///
    /// The streams stay independent: each derives its own seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.dungeon.seed = Some(seed);
        self.world.seed = Some(seed.wrapping_add(1));
        self.spawning.seed = Some(seed.wrapping_add(2));
        self
    }

    /// Checks value ranges that the TOML types cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dungeon.rooms == 0 {
            return Err(ConfigError::Invalid("dungeon.rooms must be at least 1".into()));
        }
        if self.dungeon.min_size > self.dungeon.max_size {
            return Err(ConfigError::Invalid(format!(
                "dungeon.min_size {} exceeds dungeon.max_size {}",
                self.dungeon.min_size, self.dungeon.max_size
            )));
        }
        if !self.progression.arm_delay_secs.is_finite() || self.progression.arm_delay_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "progression.arm_delay_secs must be a non-negative number".into(),
            ));
        }
        if self.spawning.min_batch > self.spawning.max_batch {
            return Err(ConfigError::Invalid(format!(
                "spawning.min_batch {} exceeds spawning.max_batch {}",
                self.spawning.min_batch, self.spawning.max_batch
            )));
        }
        Ok(())
    }

    /// Generator configuration described by the `[dungeon]` section.
    #[must_use]
    pub fn dungeon_config(&self) -> DungeonConfig {
        let section = &self.dungeon;
        DungeonConfig::new(
            section.seed,
            section.rooms,
            section.first_room_size,
            section.min_size,
            section.max_size,
        )
    }

    /// Progression configuration described by the `[progression]` section.
    #[must_use]
    pub fn progression_config(&self) -> ProgressionConfig {
        let delay = Duration::try_from_secs_f32(self.progression.arm_delay_secs.max(0.0))
            .unwrap_or_default();
        ProgressionConfig::new(delay, self.progression.min_lock_depth)
    }

    /// Spawning configuration described by the `[spawning]` section.
    #[must_use]
    pub fn spawning_config(&self) -> SpawningConfig {
        let section = &self.spawning;
        SpawningConfig::new(
            section.seed,
            section.min_batch,
            section.max_batch,
            section.placement_attempts,
            section.player_clearance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = GameConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, GameConfig::default());
        assert_eq!(
            config.progression_config().arm_delay(),
            Duration::from_millis(300)
        );
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            [dungeon]
            seed = 7
            first_room_size = [12, 10]

            [spawning]
            max_batch = 4
            "#,
        )
        .expect("partial config is valid");

        assert_eq!(config.dungeon.seed, Some(7));
        assert_eq!(config.dungeon.first_room_size, (12, 10));
        assert_eq!(config.dungeon.rooms, 6);
        assert_eq!(config.spawning.max_batch, 4);
        assert_eq!(config.spawning.min_batch, 3);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_ranges() {
        assert!(matches!(
            GameConfig::from_toml_str("[dungeon]\nroomz = 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[dungeon]\nmin_size = 20\nmax_size = 10\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[progression]\narm_delay_secs = -1.0\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = GameConfig::load("/nonexistent/delve.toml").expect_err("file is missing");
        assert!(error.to_string().contains("/nonexistent/delve.toml"));
    }
}
