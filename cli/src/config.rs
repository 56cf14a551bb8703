use std::path::Path;

use anyhow::{Context, Result};
use sapper_core::{Difficulty, FlagSemantics};
use serde::Deserialize;

/// Optional TOML file; every key can be overridden on the command line.
///
/// ```toml
/// [game]
/// preset = "intermediate"
/// seed = 7
///
/// [bot]
/// games = 100
/// delay_ms = 0
/// flags = "Strict"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub game: GameSection,
    pub bot: BotSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameSection {
    pub preset: Option<Difficulty>,
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    pub mines: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotSection {
    pub games: Option<usize>,
    pub delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub flags: Option<FlagSemantics>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = FileConfig::parse(
            r#"
            [game]
            preset = "expert"
            seed = 3

            [bot]
            games = 10
            flags = "Strict"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.game.preset, Some(Difficulty::Expert));
        assert_eq!(cfg.game.seed, Some(3));
        assert_eq!(cfg.bot.games, Some(10));
        assert_eq!(cfg.bot.flags, Some(FlagSemantics::Strict));
        assert_eq!(cfg.bot.delay_ms, None);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = FileConfig::parse("").unwrap();
        assert!(cfg.game.rows.is_none());
        assert!(cfg.bot.games.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::parse("[game]\nwidth = 3\n").is_err());
    }
}
