use thiserror::Error;

use crate::geometry::Tile;

/// Problems found while loading or validating a maze description or the
/// tuning tables. All of them are fatal before the first tick runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Maze has no rows")]
    EmptyMaze,

    #[error("Maze row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Unknown maze character {ch:?} at {tile}")]
    UnknownTile { ch: char, tile: Tile },

    #[error("Invalid portal {left} <-> {right}: {reason}")]
    InvalidPortal {
        left: Tile,
        right: Tile,
        reason: &'static str,
    },

    #[error("Invalid ghost house: {0}")]
    InvalidHouse(String),

    #[error("{what} at {tile} is not accessible")]
    Inaccessible { what: &'static str, tile: Tile },

    #[error("Level table is empty")]
    EmptyLevelTable,

    #[error("Invalid hunting table: {0}")]
    InvalidHunting(String),

    #[error("Invalid phase duration {0}")]
    InvalidPhaseDuration(i64),

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting {
        name: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
