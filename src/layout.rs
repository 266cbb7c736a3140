//! Maze descriptions: the ASCII tile grid plus the coordinates the engine
//! cannot derive from it (portals, ghost house, corners, start tiles).
//!
//! Characters: `#` wall, ` ` empty floor, `.` pellet, `*` energizer,
//! `t` tunnel, `-` ghost-house door.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::geometry::Tile;
use crate::maze::{FoodKind, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    pub left: Tile,
    pub right: Tile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseSpec {
    pub top_left: Tile,
    pub cols: i32,
    pub rows: i32,
    /// Tile above the left door; ghosts leave and return between it and its
    /// right neighbour.
    pub entry: Tile,
    /// Left, center and right seat.
    pub seats: [Tile; 3],
    pub doors: Vec<Tile>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLayout {
    pub rows: Vec<String>,
    pub portals: Vec<Portal>,
    pub house: HouseSpec,
    /// Blinky, Pinky, Inky, Clyde.
    pub scatter_tiles: [Tile; 4],
    pub player_start: Tile,
    pub bonus_tile: Tile,
    /// Tiles ghosts may not leave upwards while hunting.
    #[serde(default)]
    pub one_way_up: Vec<Tile>,
}

impl MazeLayout {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

pub(crate) fn parse_cell(ch: char, tile: Tile) -> Result<(TileKind, Option<FoodKind>)> {
    let cell = match ch {
        '#' => (TileKind::Wall, None),
        ' ' => (TileKind::Space, None),
        '.' => (TileKind::Space, Some(FoodKind::Pellet)),
        '*' => (TileKind::Space, Some(FoodKind::Energizer)),
        't' => (TileKind::Tunnel, None),
        '-' => (TileKind::Door, None),
        _ => return Err(ConfigError::UnknownTile { ch, tile }),
    };
    Ok(cell)
}

const CLASSIC_ROWS: [&str; 36] = [
    "############################",
    "############################",
    "############################",
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#*####.#####.##.#####.####*#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###--### ##.######",
    "######.## #      # ##.######",
    "tttttt.   #      #   .tttttt",
    "######.## #      # ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#*..##.......  .......##..*#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
    "############################",
    "############################",
];

/// The 28x36 arcade maze, three rows of score area on top and two below.
pub fn classic() -> MazeLayout {
    MazeLayout {
        rows: CLASSIC_ROWS.iter().map(|row| row.to_string()).collect(),
        portals: vec![Portal {
            left: Tile::new(-1, 17),
            right: Tile::new(28, 17),
        }],
        house: HouseSpec {
            top_left: Tile::new(10, 15),
            cols: 8,
            rows: 5,
            entry: Tile::new(13, 14),
            seats: [Tile::new(11, 17), Tile::new(13, 17), Tile::new(15, 17)],
            doors: vec![Tile::new(13, 15), Tile::new(14, 15)],
        },
        scatter_tiles: [
            Tile::new(25, 0),
            Tile::new(2, 0),
            Tile::new(27, 35),
            Tile::new(0, 35),
        ],
        player_start: Tile::new(13, 26),
        bonus_tile: Tile::new(13, 20),
        one_way_up: vec![
            Tile::new(12, 14),
            Tile::new(15, 14),
            Tile::new(12, 26),
            Tile::new(15, 26),
        ],
    }
}
