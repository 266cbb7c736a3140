use rand::seq::SliceRandom;
use rand::Rng;

use crate::actor::{can_enter, try_move, Actor, MoveRules};
use crate::geometry::{Direction, Tile, Vector2};
use crate::house;
use crate::level::LevelRow;
use crate::maze::Maze;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GhostId {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostId {
    /// Also the order in which ghosts are let out of the house.
    pub const ALL: [GhostId; 4] = [GhostId::Blinky, GhostId::Pinky, GhostId::Inky, GhostId::Clyde];

    pub fn index(self) -> usize {
        match self {
            GhostId::Blinky => 0,
            GhostId::Pinky => 1,
            GhostId::Inky => 2,
            GhostId::Clyde => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GhostId::Blinky => "blinky",
            GhostId::Pinky => "pinky",
            GhostId::Inky => "inky",
            GhostId::Clyde => "clyde",
        }
    }

    /// Seat inside the house: left, center or right.
    fn seat(self) -> usize {
        match self {
            GhostId::Blinky | GhostId::Pinky => 1,
            GhostId::Inky => 0,
            GhostId::Clyde => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostMode {
    Locked,
    LeavingHouse,
    Scatter,
    Chase,
    Frightened,
    Eaten,
    EnteringHouse,
}

impl GhostMode {
    pub fn is_hunting(self) -> bool {
        matches!(self, GhostMode::Scatter | GhostMode::Chase)
    }

    /// Eyes on their way home cannot hurt the player.
    pub fn is_harmless(self) -> bool {
        matches!(self, GhostMode::Eaten | GhostMode::EnteringHouse)
    }
}

/// What a ghost needs to know about the rest of the world for one update.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    pub maze: &'a Maze,
    pub player_tile: Tile,
    pub player_dir: Direction,
    pub blinky_tile: Tile,
    pub hunting_mode: GhostMode,
    pub frightened_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostTransition {
    LeftHouse,
    ReachedHouse,
    Revived,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ghost {
    pub id: GhostId,
    pub actor: Actor,
    pub mode: GhostMode,
    pub home: Vector2,
    pub revival: Vector2,
    pub scatter_tile: Tile,
    pub target: Option<Tile>,
    pub bounty: u32,
    pub dot_counter: u32,
    pub elroy: u8,
    pub reverse_pending: bool,
    pub frightened_on_exit: bool,
}

impl Ghost {
    pub fn new(id: GhostId, maze: &Maze) -> Self {
        let house = maze.house();
        let home = match id {
            GhostId::Blinky => house.entry_position(),
            _ => house.seat_position(id.seat()),
        };
        let dir = match id {
            GhostId::Blinky => Direction::Left,
            GhostId::Pinky => Direction::Down,
            _ => Direction::Up,
        };
        Self {
            id,
            actor: Actor::new(home, dir),
            mode: GhostMode::Locked,
            home,
            revival: house.seat_position(id.seat()),
            scatter_tile: maze.scatter_tile(id.index()),
            target: None,
            bounty: 0,
            dot_counter: 0,
            elroy: 0,
            reverse_pending: false,
            frightened_on_exit: false,
        }
    }

    /// Back to the start pose. Dot counters survive a lost life.
    pub fn reset(&mut self, maze: &Maze) {
        let dot_counter = self.dot_counter;
        *self = Self::new(self.id, maze);
        self.dot_counter = dot_counter;
    }

    pub fn tile(&self) -> Tile {
        self.actor.tile()
    }

    pub fn request_reversal(&mut self) {
        self.reverse_pending = true;
    }

    pub fn move_rules(&self) -> MoveRules {
        match self.mode {
            GhostMode::Eaten | GhostMode::EnteringHouse => MoveRules::EATEN_GHOST,
            GhostMode::Frightened => MoveRules::FRIGHTENED_GHOST,
            _ => MoveRules::HUNTING_GHOST,
        }
    }

    /// Target tile of the current mode; `None` while steering randomly or
    /// following the house script.
    pub fn current_target(&self, s: &Surroundings<'_>) -> Option<Tile> {
        match self.mode {
            GhostMode::Scatter if self.elroy > 0 => Some(s.player_tile),
            GhostMode::Scatter => Some(self.scatter_tile),
            GhostMode::Chase => Some(chase_target(
                self.id,
                self.tile(),
                self.scatter_tile,
                s.player_tile,
                s.player_dir,
                s.blinky_tile,
            )),
            GhostMode::Eaten => Some(s.maze.house().entry_tile()),
            GhostMode::Frightened
            | GhostMode::Locked
            | GhostMode::LeavingHouse
            | GhostMode::EnteringHouse => None,
        }
    }

    pub fn speed_percent(&self, maze: &Maze, level: &LevelRow, house_speed: u32, eaten_speed: u32) -> u32 {
        let in_tunnel = maze.is_tunnel(self.tile());
        match self.mode {
            GhostMode::Locked | GhostMode::LeavingHouse => house_speed,
            GhostMode::Eaten | GhostMode::EnteringHouse => eaten_speed,
            GhostMode::Frightened if in_tunnel => level.ghost_tunnel_speed,
            GhostMode::Frightened => level.ghost_frightened_speed,
            GhostMode::Scatter | GhostMode::Chase if in_tunnel => level.ghost_tunnel_speed,
            GhostMode::Scatter | GhostMode::Chase => match self.elroy {
                2 => level.elroy2_speed,
                1 => level.elroy1_speed,
                _ => level.ghost_speed,
            },
        }
    }

    pub fn update<R: Rng>(
        &mut self,
        s: &Surroundings<'_>,
        speed: f32,
        rng: &mut R,
    ) -> Option<GhostTransition> {
        let house = s.maze.house();
        match self.mode {
            GhostMode::Locked => {
                if house.contains(self.tile()) {
                    house::bounce(&mut self.actor, self.revival, speed);
                }
                None
            }
            GhostMode::LeavingHouse => {
                if !house::leave(&mut self.actor, house, speed) {
                    return None;
                }
                self.mode = if self.frightened_on_exit && s.frightened_active {
                    GhostMode::Frightened
                } else {
                    s.hunting_mode
                };
                self.frightened_on_exit = false;
                self.actor.place_at(house.entry_position(), Direction::Left);
                self.actor.changed_tile = true;
                Some(GhostTransition::LeftHouse)
            }
            GhostMode::EnteringHouse => {
                if !house::enter(&mut self.actor, house, self.revival, speed) {
                    return None;
                }
                self.mode = GhostMode::Locked;
                self.actor.place_at(self.revival, Direction::Up);
                Some(GhostTransition::Revived)
            }
            GhostMode::Eaten if house.is_entry(self.tile()) => {
                if !house::move_toward(&mut self.actor, house.entry_position(), speed) {
                    return None;
                }
                self.mode = GhostMode::EnteringHouse;
                self.actor.place_at(house.entry_position(), Direction::Down);
                Some(GhostTransition::ReachedHouse)
            }
            GhostMode::Eaten | GhostMode::Scatter | GhostMode::Chase | GhostMode::Frightened => {
                self.roam(s, speed, rng);
                None
            }
        }
    }

    fn roam<R: Rng>(&mut self, s: &Surroundings<'_>, speed: f32, rng: &mut R) {
        let rules = self.move_rules();
        let tile = self.tile();
        if self.reverse_pending {
            self.reverse_pending = false;
            self.actor.wish_dir = self.actor.move_dir.opposite();
        } else if self.actor.changed_tile || !self.actor.could_move {
            self.target = self.current_target(s);
            self.actor.wish_dir = match self.target {
                Some(target) => choose_direction(s.maze, tile, self.actor.move_dir, target, rules),
                None => {
                    debug_assert_eq!(self.mode, GhostMode::Frightened);
                    random_direction(s.maze, tile, self.actor.move_dir, rules, rng)
                }
            };
        }
        try_move(&mut self.actor, s.maze, speed, rules);
    }
}

/// Blinky aims at the player, Pinky four tiles ahead of it, Inky at the
/// point two tiles ahead of the player mirrored through Blinky, and Clyde at
/// the player only while more than eight tiles away.
pub fn chase_target(
    id: GhostId,
    ghost_tile: Tile,
    scatter_tile: Tile,
    player_tile: Tile,
    player_dir: Direction,
    blinky_tile: Tile,
) -> Tile {
    match id {
        GhostId::Blinky => player_tile,
        GhostId::Pinky => player_tile.ahead(player_dir, 4),
        GhostId::Inky => {
            let pivot = player_tile.ahead(player_dir, 2);
            Tile::new(
                2 * pivot.col - blinky_tile.col,
                2 * pivot.row - blinky_tile.row,
            )
        }
        GhostId::Clyde => {
            if ghost_tile.dist_sq(player_tile) > 64 {
                player_tile
            } else {
                scatter_tile
            }
        }
    }
}

fn options(maze: &Maze, tile: Tile, current: Direction, rules: MoveRules) -> Vec<Direction> {
    Direction::PRIORITY
        .into_iter()
        .filter(|&dir| dir != current.opposite() && can_enter(maze, tile, dir, rules))
        .collect()
}

/// Direction leading closest to `target`. Ghosts never reverse by choice
/// unless the tile is a dead end; ties go Up, Left, Down, Right.
pub fn choose_direction(
    maze: &Maze,
    tile: Tile,
    current: Direction,
    target: Tile,
    rules: MoveRules,
) -> Direction {
    if !maze.is_intersection(tile) && can_enter(maze, tile, current, rules) {
        return current;
    }
    let mut best: Option<(i64, Direction)> = None;
    for dir in options(maze, tile, current, rules) {
        let dist = tile.neighbor(dir).dist_sq(target);
        if best.map_or(true, |(d, _)| dist < d) {
            best = Some((dist, dir));
        }
    }
    best.map_or(current.opposite(), |(_, dir)| dir)
}

/// Frightened steering: a random legal turn at crossings, otherwise follow
/// the corridor.
pub fn random_direction<R: Rng>(
    maze: &Maze,
    tile: Tile,
    current: Direction,
    rules: MoveRules,
    rng: &mut R,
) -> Direction {
    let options = options(maze, tile, current, rules);
    if !maze.is_intersection(tile) && options.contains(&current) {
        return current;
    }
    if !maze.is_intersection(tile) {
        return options.first().copied().unwrap_or(current.opposite());
    }
    options.choose(rng).copied().unwrap_or(current.opposite())
}
