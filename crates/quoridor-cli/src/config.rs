use std::{fs, path::Path};

use anyhow::Context;
use quoridor_engine::{GameConfig, SessionSeed};
use serde::Deserialize;

/// Settings read from a `--config` TOML file.
///
/// ```toml
/// board_size = 9
/// players = 4
/// seed = "00000000000000000000000000c0ffee"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub board_size: Option<usize>,
    pub players: Option<usize>,
    pub seed: Option<SessionSeed>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn overridden(
        self,
        board_size: Option<usize>,
        players: Option<usize>,
        seed: Option<SessionSeed>,
    ) -> GameSettings {
        let defaults = GameConfig::default();
        GameSettings {
            config: GameConfig {
                board_size: board_size.or(self.board_size).unwrap_or(defaults.board_size),
            },
            players: players
                .or(self.players)
                .unwrap_or(GameSettings::DEFAULT_PLAYERS),
            seed: seed.or(self.seed),
        }
    }
}

/// Settings for a new game after command-line flags override the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub config: GameConfig,
    pub players: usize,
    pub seed: Option<SessionSeed>,
}

impl GameSettings {
    pub const DEFAULT_PLAYERS: usize = 2;

    pub fn resolve(
        file: Option<&Path>,
        board_size: Option<usize>,
        players: Option<usize>,
        seed: Option<SessionSeed>,
    ) -> anyhow::Result<Self> {
        let file = file.map(FileConfig::load).transpose()?.unwrap_or_default();
        Ok(file.overridden(board_size, players, seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_file() {
        let file: FileConfig = toml::from_str(
            r#"
            board_size = 7
            players = 3
            seed = "ff"
            "#,
        )
        .unwrap();
        assert_eq!(
            file,
            FileConfig {
                board_size: Some(7),
                players: Some(3),
                seed: Some(SessionSeed::from_u128(0xff)),
            }
        );
        assert!(toml::from_str::<FileConfig>("colour = \"red\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            board_size: Some(7),
            players: Some(3),
            seed: None,
        };
        let settings = file.overridden(None, Some(4), Some(SessionSeed::from_u128(1)));
        assert_eq!(settings.config.board_size, 7);
        assert_eq!(settings.players, 4);
        assert_eq!(settings.seed, Some(SessionSeed::from_u128(1)));

        let defaults = FileConfig::default().overridden(None, None, None);
        assert_eq!(defaults.config, GameConfig::default());
        assert_eq!(defaults.players, 2);
        assert_eq!(defaults.seed, None);
    }
}
