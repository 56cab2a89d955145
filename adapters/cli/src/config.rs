use std::{fs, path::Path};

use anyhow::{Context, Result};
use life_board_engine::{Conway, EdgeRule, Seeding};
use life_board_rendering::Glyphs;
use serde::Deserialize;

/// Settings that drive a single run, loaded from TOML and then overridden
/// from the command line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) board: BoardConfig,
    pub(crate) engine: EngineConfig,
    pub(crate) run: RunConfig,
    pub(crate) render: RenderConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BoardConfig {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 16,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct EngineConfig {
    pub(crate) edges: EdgeRule,
    /// Random seed; boards start empty when absent.
    pub(crate) seed: Option<u64>,
    pub(crate) density: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            edges: EdgeRule::Dead,
            seed: None,
            density: 0.35,
        }
    }
}

impl EngineConfig {
    /// Builds the engine described by this configuration.
    pub(crate) fn build(&self) -> Conway {
        let engine = Conway::new().with_edges(self.edges);
        match self.seed {
            Some(seed) => engine.with_seeding(Seeding::new(seed, self.density)),
            None => engine,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RunConfig {
    pub(crate) ticks: u64,
    pub(crate) interval_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 10,
            interval_ms: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RenderConfig {
    pub(crate) alive: char,
    pub(crate) dead: char,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let glyphs = Glyphs::default();
        Self {
            alive: glyphs.alive(),
            dead: glyphs.dead(),
        }
    }
}

impl RenderConfig {
    pub(crate) fn glyphs(&self) -> Result<Glyphs> {
        Glyphs::new(self.alive, self.dead).context("invalid render glyphs")
    }
}

impl Config {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load config at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use life_board_engine::{EdgeRule, Seeding};

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::parse("").expect("empty config parses");
        assert_eq!(config, Config::default());
        assert_eq!((config.board.width, config.board.height), (32, 16));
        assert_eq!(config.engine.build().seeding(), None);
    }

    #[test]
    fn tables_override_defaults() {
        let config = Config::parse(
            r#"
            [board]
            width = 8
            height = 6

            [engine]
            edges = "wrap"
            seed = 42
            density = 0.5

            [run]
            ticks = 3

            [render]
            alive = "O"
            dead = " "
            "#,
        )
        .expect("config parses");

        assert_eq!((config.board.width, config.board.height), (8, 6));
        assert_eq!(config.run.ticks, 3);
        assert_eq!(config.run.interval_ms, 0, "unset keys keep defaults");

        let engine = config.engine.build();
        assert_eq!(engine.edges(), EdgeRule::Wrap);
        assert_eq!(engine.seeding(), Some(Seeding::new(42, 0.5)));

        let glyphs = config.render.glyphs().expect("distinct glyphs");
        assert_eq!((glyphs.alive(), glyphs.dead()), ('O', ' '));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Config::parse("[board]\ndepth = 3\n").expect_err("unknown key");
        assert!(format!("{error:#}").contains("depth"), "{error:#}");
    }
}
