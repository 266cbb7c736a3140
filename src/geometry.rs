use std::fmt;

use serde::{Deserialize, Serialize};

pub const TILE_SIZE: f32 = 8.0;
pub const HALF_TILE: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// Order used to break ties between equally good moves.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn turn_left(self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    pub fn turn_right(self) -> Direction {
        self.turn_left().opposite()
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }

    pub fn vector(self) -> Vector2 {
        let (dx, dy) = self.delta();
        Vector2::new(dx as f32, dy as f32)
    }
}

/// Integer maze coordinate. Columns grow to the right, rows grow downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub col: i32,
    pub row: i32,
}

impl Tile {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn neighbor(self, dir: Direction) -> Tile {
        self.ahead(dir, 1)
    }

    pub fn ahead(self, dir: Direction, n: i32) -> Tile {
        let (dx, dy) = dir.delta();
        Tile::new(self.col + dx * n, self.row + dy * n)
    }

    pub fn dist_sq(self, other: Tile) -> i64 {
        let dx = i64::from(self.col - other.col);
        let dy = i64::from(self.row - other.row);
        dx * dx + dy * dy
    }

    pub fn euclidean(self, other: Tile) -> f64 {
        (self.dist_sq(other) as f64).sqrt()
    }

    pub fn center(self) -> Vector2 {
        Vector2::new(
            self.col as f32 * TILE_SIZE + HALF_TILE,
            self.row as f32 * TILE_SIZE + HALF_TILE,
        )
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn tile(self) -> Tile {
        Tile::new(
            (self.x / TILE_SIZE).floor() as i32,
            (self.y / TILE_SIZE).floor() as i32,
        )
    }

    /// Position relative to the center of the containing tile, in `[-4, 4)`.
    pub fn offset(self) -> Vector2 {
        self - self.tile().center()
    }

    pub fn scaled(self, factor: f32) -> Vector2 {
        Vector2::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Actors start between a tile and its right neighbour, like the arcade.
pub fn between_tiles(tile: Tile) -> Vector2 {
    tile.center() + Vector2::new(HALF_TILE, 0.0)
}
