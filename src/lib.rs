//! Deterministic arcade maze-chase engine.
//!
//! The simulation runs in whole 60 Hz ticks. [`Game::advance`] takes the
//! player's wish direction and returns a [`FrameResult`] describing what
//! changed; everything random comes from the [`Context`] passed in, so equal
//! seeds and inputs replay identically.

pub mod actor;
pub mod bonus;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;
pub mod geometry;
pub mod ghost;
pub mod house;
pub mod hunting;
pub mod layout;
pub mod level;
pub mod maze;

pub use clock::Context;
pub use config::GameConfig;
pub use error::{ConfigError, Result};
pub use game::{ActorFrame, FrameResult, Game, GameEvent, GameState};
pub use geometry::{Direction, Tile, Vector2};
pub use ghost::{GhostId, GhostMode};
pub use maze::Maze;
