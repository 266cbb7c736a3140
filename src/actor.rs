use crate::clock::TickTimer;
use crate::geometry::{between_tiles, Direction, Tile, Vector2, TILE_SIZE};
use crate::maze::{Maze, TileKind};

/// Which restricted tiles an actor may pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRules {
    pub can_enter_doors: bool,
    pub respects_one_way: bool,
}

impl MoveRules {
    pub const PLAYER: MoveRules = MoveRules {
        can_enter_doors: false,
        respects_one_way: false,
    };
    pub const HUNTING_GHOST: MoveRules = MoveRules {
        can_enter_doors: false,
        respects_one_way: true,
    };
    pub const FRIGHTENED_GHOST: MoveRules = MoveRules {
        can_enter_doors: false,
        respects_one_way: false,
    };
    pub const EATEN_GHOST: MoveRules = MoveRules {
        can_enter_doors: true,
        respects_one_way: false,
    };
}

/// Pose and movement state shared by the player and the ghosts.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    /// Center of the actor in pixels.
    pub position: Vector2,
    pub move_dir: Direction,
    pub wish_dir: Direction,
    pub visible: bool,
    pub changed_tile: bool,
    pub could_move: bool,
}

impl Actor {
    pub fn new(position: Vector2, dir: Direction) -> Self {
        Self {
            position,
            move_dir: dir,
            wish_dir: dir,
            visible: true,
            changed_tile: false,
            could_move: true,
        }
    }

    pub fn tile(&self) -> Tile {
        self.position.tile()
    }

    pub fn offset(&self) -> Vector2 {
        self.position.offset()
    }

    pub fn place_at(&mut self, position: Vector2, dir: Direction) {
        self.position = position;
        self.move_dir = dir;
        self.wish_dir = dir;
        self.changed_tile = false;
        self.could_move = true;
    }

    pub fn place_at_tile(&mut self, tile: Tile, dir: Direction) {
        self.place_at(tile.center(), dir);
    }

    pub fn place_between(&mut self, tile: Tile, dir: Direction) {
        self.place_at(between_tiles(tile), dir);
    }

    /// Offset from the tile center measured along `dir`: negative before the
    /// center, positive past it.
    fn offset_along(&self, dir: Direction) -> f32 {
        let off = self.offset();
        match dir {
            Direction::Right => off.x,
            Direction::Left => -off.x,
            Direction::Down => off.y,
            Direction::Up => -off.y,
        }
    }

    pub fn is_centered(&self) -> bool {
        self.offset() == Vector2::default()
    }
}

/// Whether an actor standing on `from` may step onto the neighbour in `dir`.
pub fn can_enter(maze: &Maze, from: Tile, dir: Direction, rules: MoveRules) -> bool {
    if rules.respects_one_way && dir == Direction::Up && maze.is_one_way_up(from) {
        return false;
    }
    let to = from.neighbor(dir);
    if maze.is_portal(to) {
        return true;
    }
    match maze.kind(to) {
        TileKind::Wall => false,
        TileKind::Door => rules.can_enter_doors,
        TileKind::Space | TileKind::Tunnel => true,
    }
}

/// Moves `actor` by `speed` pixels, honouring walls, doors, one-way tiles,
/// portals and the turn rules. Refused moves are silent and leave
/// `could_move == false`.
pub fn try_move(actor: &mut Actor, maze: &Maze, speed: f32, rules: MoveRules) {
    let tile_before = actor.tile();
    actor.changed_tile = false;

    if actor.wish_dir == actor.move_dir.opposite() {
        actor.move_dir = actor.wish_dir;
    } else if actor.wish_dir != actor.move_dir {
        try_turn(actor, maze, speed, rules);
    }

    step(actor, maze, speed, rules);

    let tile_after = actor.tile();
    if let Some(exit) = maze.portal_exit(tile_after, actor.move_dir) {
        actor.position.x += (exit.col - tile_after.col) as f32 * TILE_SIZE;
        actor.position.y += (exit.row - tile_after.row) as f32 * TILE_SIZE;
    }
    actor.changed_tile = actor.tile() != tile_before;
}

fn try_turn(actor: &mut Actor, maze: &Maze, speed: f32, rules: MoveRules) {
    let tile = actor.tile();
    // a blocked actor may snap back to the center to turn
    if actor.could_move && actor.offset_along(actor.move_dir).abs() > speed / 2.0 {
        return;
    }
    if !can_enter(maze, tile, actor.wish_dir, rules) {
        return;
    }
    actor.position = tile.center();
    actor.move_dir = actor.wish_dir;
}

fn step(actor: &mut Actor, maze: &Maze, speed: f32, rules: MoveRules) {
    let tile = actor.tile();
    let dir = actor.move_dir;
    let along = actor.offset_along(dir);
    // one-way tiles only restrict turning, never a move already under way
    let rules = MoveRules {
        respects_one_way: false,
        ..rules
    };

    let distance = if can_enter(maze, tile, dir, rules) {
        speed
    } else if along < 0.0 {
        speed.min(-along)
    } else {
        actor.could_move = false;
        return;
    };

    // keep actors on the corridor axis
    let center = tile.center();
    if dir.is_horizontal() {
        actor.position.y = center.y;
    } else {
        actor.position.x = center.x;
    }
    actor.position = actor.position + dir.vector().scaled(distance);
    actor.could_move = true;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub actor: Actor,
    /// Ticks the player pauses after eating.
    pub rest_ticks: u32,
    /// Ticks since the player last ate anything.
    pub starving_ticks: u32,
    pub immunity: TickTimer,
}

impl Player {
    pub fn new(maze: &Maze) -> Self {
        Self {
            actor: Actor::new(between_tiles(maze.player_start()), Direction::Left),
            rest_ticks: 0,
            starving_ticks: 0,
            immunity: TickTimer::stopped(),
        }
    }

    pub fn reset(&mut self, maze: &Maze) {
        let immunity = self.immunity;
        *self = Self::new(maze);
        self.immunity = immunity;
    }

    pub fn tile(&self) -> Tile {
        self.actor.tile()
    }

    pub fn is_immune(&self) -> bool {
        self.immunity.is_running()
    }

    pub fn update(&mut self, maze: &Maze, speed: f32) {
        if self.rest_ticks > 0 {
            self.rest_ticks -= 1;
            self.actor.changed_tile = false;
            return;
        }
        try_move(&mut self.actor, maze, speed, MoveRules::PLAYER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_at(tile: Tile, dir: Direction) -> Actor {
        Actor::new(tile.center(), dir)
    }

    #[test]
    fn test_moves_along_corridor() {
        let maze = Maze::classic();
        let mut actor = actor_at(Tile::new(3, 8), Direction::Right);
        for _ in 0..8 {
            try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
        }
        assert_eq!(actor.tile(), Tile::new(4, 8));
        assert!(actor.is_centered());
        assert!(actor.could_move);
    }

    #[test]
    fn test_stops_at_wall_center() {
        let maze = Maze::classic();
        let mut actor = actor_at(Tile::new(2, 4), Direction::Left);
        for _ in 0..20 {
            try_move(&mut actor, &maze, 1.25, MoveRules::PLAYER);
        }
        assert_eq!(actor.tile(), Tile::new(1, 4));
        assert!(actor.is_centered());
        assert!(!actor.could_move);
    }

    #[test]
    fn test_turn_requires_alignment() {
        let maze = Maze::classic();
        // (6, 8) is a crossing; start half a tile before its center
        let mut actor = Actor::new(Tile::new(6, 8).center() - Vector2::new(3.0, 0.0), Direction::Right);
        actor.wish_dir = Direction::Down;
        try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
        assert_eq!(actor.move_dir, Direction::Right);
        try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
        assert_eq!(actor.move_dir, Direction::Right);
        try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
        // now within half a step of the center
        try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
        assert_eq!(actor.move_dir, Direction::Down);
        assert_eq!(actor.position.x, Tile::new(6, 8).center().x);
    }

    #[test]
    fn test_wish_into_wall_is_deferred() {
        let maze = Maze::classic();
        let mut actor = actor_at(Tile::new(3, 8), Direction::Right);
        actor.wish_dir = Direction::Up;
        try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
        assert_eq!(actor.move_dir, Direction::Right);
        assert_eq!(actor.wish_dir, Direction::Up);
        assert!(actor.could_move);
    }

    #[test]
    fn test_reversal_is_immediate_between_centers() {
        let maze = Maze::classic();
        let mut actor = Actor::new(Tile::new(3, 8).center() + Vector2::new(2.0, 0.0), Direction::Right);
        actor.wish_dir = Direction::Left;
        try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
        assert_eq!(actor.move_dir, Direction::Left);
        assert_eq!(actor.offset().x, 1.0);
    }

    #[test]
    fn test_direction_holds_between_centers() {
        let maze = Maze::classic();
        let mut actor = Actor::new(Tile::new(6, 8).center() - Vector2::new(3.5, 0.0), Direction::Right);
        actor.wish_dir = Direction::Up;
        let mut seen = Vec::new();
        for _ in 0..3 {
            try_move(&mut actor, &maze, 1.0, MoveRules::PLAYER);
            seen.push(actor.move_dir);
        }
        assert!(seen.iter().all(|&d| d == Direction::Right));
    }

    #[test]
    fn test_portal_preserves_offset_and_direction() {
        let maze = Maze::classic();
        let mut actor = actor_at(Tile::new(0, 17), Direction::Left);
        let mut teleported = false;
        for _ in 0..4 {
            try_move(&mut actor, &maze, 1.25, MoveRules::PLAYER);
            teleported |= actor.tile() == Tile::new(28, 17);
        }
        assert!(teleported);
        assert_eq!(actor.tile(), Tile::new(28, 17));
        assert_eq!(actor.offset().x, 3.0);
        assert_eq!(actor.move_dir, Direction::Left);
        assert!(actor.changed_tile);
    }

    #[test]
    fn test_doors_and_one_way_rules() {
        let maze = Maze::classic();
        let above_door = Tile::new(13, 14);
        assert!(!can_enter(&maze, above_door, Direction::Down, MoveRules::HUNTING_GHOST));
        assert!(can_enter(&maze, above_door, Direction::Down, MoveRules::EATEN_GHOST));
        assert!(!can_enter(&maze, above_door, Direction::Down, MoveRules::PLAYER));

        let one_way = Tile::new(12, 26);
        assert!(!can_enter(&maze, one_way, Direction::Up, MoveRules::HUNTING_GHOST));
        assert!(can_enter(&maze, one_way, Direction::Up, MoveRules::PLAYER));
        assert!(can_enter(&maze, one_way, Direction::Up, MoveRules::FRIGHTENED_GHOST));
    }

    #[test]
    fn test_move_past_one_way_center_continues() {
        let maze = Maze::classic();
        // turned Up on (12, 14) while frightened, now hunting again
        let mut actor = Actor::new(Vector2::new(100.0, 114.125), Direction::Up);
        try_move(&mut actor, &maze, 1.0, MoveRules::HUNTING_GHOST);
        assert!(actor.could_move);
        assert_eq!(actor.position, Vector2::new(100.0, 113.125));

        let mut actor = Actor::new(Vector2::new(100.0, 114.125), Direction::Up);
        actor.wish_dir = Direction::Right;
        try_move(&mut actor, &maze, 1.0, MoveRules::HUNTING_GHOST);
        assert!(actor.could_move);
        assert_ne!(actor.position, Vector2::new(100.0, 114.125));
    }

    #[test]
    fn test_blocked_actor_snaps_back_to_turn() {
        let maze = Maze::classic();
        let mut actor = Actor::new(Vector2::new(100.0, 114.125), Direction::Up);
        actor.could_move = false;
        actor.wish_dir = Direction::Right;
        try_move(&mut actor, &maze, 1.0, MoveRules::HUNTING_GHOST);
        assert_eq!(actor.move_dir, Direction::Right);
        assert_eq!(actor.position, Vector2::new(101.0, 116.0));
    }

    #[test]
    fn test_resting_player_does_not_move() {
        let maze = Maze::classic();
        let mut player = Player::new(&maze);
        let start = player.actor.position;
        player.rest_ticks = 2;
        player.update(&maze, 1.0);
        player.update(&maze, 1.0);
        assert_eq!(player.actor.position, start);
        player.update(&maze, 1.0);
        assert_ne!(player.actor.position, start);
    }
}
