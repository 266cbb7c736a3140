use crate::error::{ConfigError, Result};
use crate::geometry::{between_tiles, Direction, Tile, Vector2};
use crate::layout::{self, MazeLayout, Portal};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileKind {
    Wall,
    Space,
    Tunnel,
    Door,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Pellet,
    Energizer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BitSet {
    words: Vec<u64>,
    len: usize,
}

impl BitSet {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    pub(crate) fn get(&self, idx: usize) -> bool {
        idx < self.len && self.words[idx / 64] & (1 << (idx % 64)) != 0
    }

    pub(crate) fn set(&mut self, idx: usize) {
        if idx < self.len {
            self.words[idx / 64] |= 1 << (idx % 64);
        }
    }

    pub(crate) fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub(crate) fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&idx| self.get(idx))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct House {
    top_left: Tile,
    cols: i32,
    rows: i32,
    entry: Tile,
    seats: [Tile; 3],
    doors: Vec<Tile>,
}

impl House {
    pub fn contains(&self, tile: Tile) -> bool {
        tile.col >= self.top_left.col
            && tile.col < self.top_left.col + self.cols
            && tile.row >= self.top_left.row
            && tile.row < self.top_left.row + self.rows
    }

    pub fn entry_tile(&self) -> Tile {
        self.entry
    }

    /// Both tiles a ghost can occupy while standing at the entry position.
    pub fn is_entry(&self, tile: Tile) -> bool {
        tile == self.entry || tile == self.entry.neighbor(Direction::Right)
    }

    pub fn entry_position(&self) -> Vector2 {
        between_tiles(self.entry)
    }

    pub fn seat_position(&self, seat: usize) -> Vector2 {
        between_tiles(self.seats[seat.min(2)])
    }

    pub fn doors(&self) -> &[Tile] {
        &self.doors
    }
}

/// Static description of one maze. Built once, shared between levels.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    width: i32,
    height: i32,
    kinds: Vec<TileKind>,
    intersections: BitSet,
    one_way_up: BitSet,
    pellets: BitSet,
    energizers: BitSet,
    portals: Vec<Portal>,
    house: House,
    scatter_tiles: [Tile; 4],
    player_start: Tile,
    bonus_tile: Tile,
}

impl Maze {
    pub fn classic() -> Self {
        // The built-in description is validated by the test suite.
        match Self::from_layout(&layout::classic()) {
            Ok(maze) => maze,
            Err(err) => unreachable!("built-in maze is invalid: {err}"),
        }
    }

    pub fn from_layout(desc: &MazeLayout) -> Result<Self> {
        let height = desc.rows.len();
        if height == 0 {
            return Err(ConfigError::EmptyMaze);
        }
        let width = desc.rows[0].chars().count();
        if width == 0 {
            return Err(ConfigError::EmptyMaze);
        }

        let len = width * height;
        let mut kinds = Vec::with_capacity(len);
        let mut pellets = BitSet::new(len);
        let mut energizers = BitSet::new(len);
        for (row, line) in desc.rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(ConfigError::RaggedRow {
                    row,
                    found,
                    expected: width,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let tile = Tile::new(col as i32, row as i32);
                let (kind, food) = layout::parse_cell(ch, tile)?;
                let idx = row * width + col;
                kinds.push(kind);
                match food {
                    Some(FoodKind::Pellet) => pellets.set(idx),
                    Some(FoodKind::Energizer) => energizers.set(idx),
                    None => {}
                }
            }
        }

        let h = &desc.house;
        let mut maze = Maze {
            width: width as i32,
            height: height as i32,
            kinds,
            intersections: BitSet::new(len),
            one_way_up: BitSet::new(len),
            pellets,
            energizers,
            portals: desc.portals.clone(),
            house: House {
                top_left: h.top_left,
                cols: h.cols,
                rows: h.rows,
                entry: h.entry,
                seats: h.seats,
                doors: h.doors.clone(),
            },
            scatter_tiles: desc.scatter_tiles,
            player_start: desc.player_start,
            bonus_tile: desc.bonus_tile,
        };
        maze.validate()?;

        for &tile in &desc.one_way_up {
            if maze.is_wall(tile) {
                return Err(ConfigError::Inaccessible {
                    what: "one-way tile",
                    tile,
                });
            }
            if let Some(idx) = maze.index(tile) {
                maze.one_way_up.set(idx);
            }
        }
        maze.compute_intersections();
        Ok(maze)
    }

    fn validate(&self) -> Result<()> {
        for portal in &self.portals {
            let (left, right) = (portal.left, portal.right);
            if left.col != -1 || right.col != self.width {
                return Err(ConfigError::InvalidPortal {
                    left,
                    right,
                    reason: "portal tiles must lie just outside the left and right border",
                });
            }
            if left.row != right.row || left.row < 0 || left.row >= self.height {
                return Err(ConfigError::InvalidPortal {
                    left,
                    right,
                    reason: "portal tiles must share a row inside the maze",
                });
            }
            if self.is_wall(left.neighbor(Direction::Right))
                || self.is_wall(right.neighbor(Direction::Left))
            {
                return Err(ConfigError::InvalidPortal {
                    left,
                    right,
                    reason: "portal leads into a wall",
                });
            }
        }

        let house = &self.house;
        if house.cols < 1 || house.rows < 1 {
            return Err(ConfigError::InvalidHouse(format!(
                "size {}x{} is empty",
                house.cols, house.rows
            )));
        }
        if self.index(house.top_left).is_none()
            || self
                .index(Tile::new(
                    house.top_left.col + house.cols - 1,
                    house.top_left.row + house.rows - 1,
                ))
                .is_none()
        {
            return Err(ConfigError::InvalidHouse(
                "house rectangle exceeds the maze".to_string(),
            ));
        }
        for &door in &house.doors {
            if self.kind(door) != TileKind::Door {
                return Err(ConfigError::InvalidHouse(format!(
                    "door {door} is not a door tile"
                )));
            }
        }
        for &seat in &house.seats {
            if !house.contains(seat) || self.is_wall(seat) {
                return Err(ConfigError::InvalidHouse(format!(
                    "seat {seat} is not inside the house"
                )));
            }
        }

        let required = [
            ("house entry", house.entry),
            ("player start", self.player_start),
            ("bonus tile", self.bonus_tile),
        ];
        for (what, tile) in required {
            if matches!(self.kind(tile), TileKind::Wall | TileKind::Door) {
                return Err(ConfigError::Inaccessible { what, tile });
            }
        }
        Ok(())
    }

    fn compute_intersections(&mut self) {
        for row in 0..self.height {
            for col in 0..self.width {
                let tile = Tile::new(col, row);
                if matches!(self.kind(tile), TileKind::Wall | TileKind::Door) {
                    continue;
                }
                if self.house.contains(tile) || self.is_door(tile.neighbor(Direction::Down)) {
                    continue;
                }
                let open = Direction::PRIORITY
                    .iter()
                    .filter(|&&dir| !self.is_wall(tile.neighbor(dir)))
                    .count();
                if open > 2 {
                    if let Some(idx) = self.index(tile) {
                        self.intersections.set(idx);
                    }
                }
            }
        }
    }

    pub(crate) fn index(&self, tile: Tile) -> Option<usize> {
        if tile.col < 0 || tile.row < 0 || tile.col >= self.width || tile.row >= self.height {
            return None;
        }
        Some((tile.row * self.width + tile.col) as usize)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Classification of a tile. Anything outside the grid reads as a wall.
    pub fn kind(&self, tile: Tile) -> TileKind {
        self.index(tile)
            .map_or(TileKind::Wall, |idx| self.kinds[idx])
    }

    pub fn is_wall(&self, tile: Tile) -> bool {
        self.kind(tile) == TileKind::Wall
    }

    pub fn is_tunnel(&self, tile: Tile) -> bool {
        self.kind(tile) == TileKind::Tunnel
    }

    pub fn is_door(&self, tile: Tile) -> bool {
        self.kind(tile) == TileKind::Door
    }

    pub fn is_portal(&self, tile: Tile) -> bool {
        self.portals
            .iter()
            .any(|p| p.left == tile || p.right == tile)
    }

    pub fn is_accessible(&self, tile: Tile) -> bool {
        self.is_portal(tile) || !self.is_wall(tile)
    }

    pub fn is_intersection(&self, tile: Tile) -> bool {
        self.index(tile)
            .is_some_and(|idx| self.intersections.get(idx))
    }

    pub fn is_one_way_up(&self, tile: Tile) -> bool {
        self.index(tile).is_some_and(|idx| self.one_way_up.get(idx))
    }

    /// Where an actor reappears after stepping onto a portal tile while
    /// moving out of the maze.
    pub fn portal_exit(&self, tile: Tile, dir: Direction) -> Option<Tile> {
        self.portals.iter().find_map(|p| match dir {
            Direction::Left if p.left == tile => Some(p.right),
            Direction::Right if p.right == tile => Some(p.left),
            _ => None,
        })
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    pub fn house(&self) -> &House {
        &self.house
    }

    pub fn scatter_tile(&self, ghost: usize) -> Tile {
        self.scatter_tiles[ghost.min(3)]
    }

    pub fn player_start(&self) -> Tile {
        self.player_start
    }

    pub fn bonus_tile(&self) -> Tile {
        self.bonus_tile
    }

    pub fn initial_food(&self, tile: Tile) -> Option<FoodKind> {
        let idx = self.index(tile)?;
        if self.energizers.get(idx) {
            Some(FoodKind::Energizer)
        } else if self.pellets.get(idx) {
            Some(FoodKind::Pellet)
        } else {
            None
        }
    }
}

/// Per-level food bookkeeping. `remaining == total - eaten.count_ones()`
/// holds after every mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct FoodStore {
    width: i32,
    height: i32,
    food: BitSet,
    energizers: BitSet,
    eaten: BitSet,
    total: u32,
    remaining: u32,
}

impl FoodStore {
    pub fn new(maze: &Maze) -> Self {
        let mut food = maze.pellets.clone();
        for idx in maze.energizers.ones() {
            food.set(idx);
        }
        let total = food.count_ones();
        Self {
            width: maze.width,
            height: maze.height,
            eaten: BitSet::new(food.len),
            energizers: maze.energizers.clone(),
            food,
            total,
            remaining: total,
        }
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if tile.col < 0 || tile.row < 0 || tile.col >= self.width || tile.row >= self.height {
            return None;
        }
        Some((tile.row * self.width + tile.col) as usize)
    }

    pub fn has_food(&self, tile: Tile) -> bool {
        self.index(tile)
            .is_some_and(|idx| self.food.get(idx) && !self.eaten.get(idx))
    }

    pub fn is_energizer(&self, tile: Tile) -> bool {
        self.index(tile).is_some_and(|idx| self.energizers.get(idx))
    }

    /// Removes the food on `tile`, if any, and reports what it was.
    pub fn eat(&mut self, tile: Tile) -> Option<FoodKind> {
        let idx = self.index(tile)?;
        if !self.food.get(idx) || self.eaten.get(idx) {
            return None;
        }
        self.eaten.set(idx);
        self.remaining -= 1;
        if self.energizers.get(idx) {
            Some(FoodKind::Energizer)
        } else {
            Some(FoodKind::Pellet)
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn eaten_count(&self) -> u32 {
        self.eaten.count_ones()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tile, FoodKind)> + '_ {
        self.food
            .ones()
            .filter(move |&idx| !self.eaten.get(idx))
            .map(move |idx| {
                let tile = Tile::new(idx as i32 % self.width, idx as i32 / self.width);
                let kind = if self.energizers.get(idx) {
                    FoodKind::Energizer
                } else {
                    FoodKind::Pellet
                };
                (tile, kind)
            })
    }
}
