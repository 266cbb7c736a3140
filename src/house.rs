//! Ghost house: scripted movement inside it and the rules deciding when a
//! ghost may leave.

use tracing::debug;

use crate::actor::Actor;
use crate::geometry::{Direction, Vector2, HALF_TILE};
use crate::ghost::{Ghost, GhostId, GhostMode};
use crate::maze::House;

/// Moves straight toward `target`, horizontally first. Returns `true` once
/// the target is reached.
pub fn move_toward(actor: &mut Actor, target: Vector2, speed: f32) -> bool {
    let pos = actor.position;
    if pos.x != target.x {
        let dx = target.x - pos.x;
        actor.move_dir = if dx < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        };
        actor.position.x += dx.signum() * speed.min(dx.abs());
    } else if pos.y != target.y {
        let dy = target.y - pos.y;
        actor.move_dir = if dy < 0.0 {
            Direction::Up
        } else {
            Direction::Down
        };
        actor.position.y += dy.signum() * speed.min(dy.abs());
    }
    actor.wish_dir = actor.move_dir;
    actor.position == target
}

/// Idle up-and-down movement around `seat`.
pub fn bounce(actor: &mut Actor, seat: Vector2, speed: f32) {
    let top = seat.y - HALF_TILE;
    let bottom = seat.y + HALF_TILE;
    if actor.position.y <= top {
        actor.move_dir = Direction::Down;
    } else if actor.position.y >= bottom {
        actor.move_dir = Direction::Up;
    } else if actor.move_dir.is_horizontal() {
        actor.move_dir = Direction::Up;
    }
    let y = match actor.move_dir {
        Direction::Up => (actor.position.y - speed).max(top),
        _ => (actor.position.y + speed).min(bottom),
    };
    actor.position.y = y;
    actor.wish_dir = actor.move_dir;
}

/// Walks to the house's center line, then up through the door.
pub fn leave(actor: &mut Actor, house: &House, speed: f32) -> bool {
    let exit = house.entry_position();
    let pos = actor.position;
    if pos.x != exit.x && pos.y != exit.y {
        let lane = Vector2::new(exit.x, pos.y);
        move_toward(actor, lane, speed);
        return false;
    }
    move_toward(actor, exit, speed)
}

/// Drops from the entry position to the seat row, then walks to `seat`.
pub fn enter(actor: &mut Actor, house: &House, seat: Vector2, speed: f32) -> bool {
    let center_x = house.entry_position().x;
    if actor.position.y != seat.y {
        move_toward(actor, Vector2::new(center_x, seat.y), speed);
        return false;
    }
    move_toward(actor, seat, speed)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseReason {
    PrivateDotCounter,
    GlobalDotCounter,
    Starving,
}

/// Per-level limits for letting ghosts out, indexed by [`GhostId::index`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReleaseLimits {
    pub private_dots: [u32; 4],
    pub global_dots: [u32; 4],
    pub starving_ticks: u32,
}

/// Dot counters deciding which ghost leaves the house next.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HouseRelease {
    global_counter: u32,
    global_enabled: bool,
}

impl HouseRelease {
    pub fn new() -> Self {
        Self::default()
    }

    /// After a life is lost the shared counter takes over.
    pub fn enable_global_counter(&mut self) {
        self.global_counter = 0;
        self.global_enabled = true;
    }

    pub fn disable_global_counter(&mut self) {
        self.global_counter = 0;
        self.global_enabled = false;
    }

    pub fn global_counter(&self) -> Option<u32> {
        self.global_enabled.then_some(self.global_counter)
    }

    /// First ghost still locked, in release order.
    pub fn preferred(ghosts: &[Ghost]) -> Option<usize> {
        GhostId::ALL
            .iter()
            .map(|id| id.index())
            .find(|&idx| ghosts[idx].mode == GhostMode::Locked)
    }

    pub fn on_food_eaten(&mut self, ghosts: &mut [Ghost], limits: &ReleaseLimits) {
        if self.global_enabled {
            self.global_counter += 1;
            let clyde = GhostId::Clyde.index();
            if ghosts[clyde].mode == GhostMode::Locked
                && self.global_counter == limits.global_dots[clyde]
            {
                debug!("global dot counter reached clyde's limit, switching back to private counters");
                self.disable_global_counter();
            }
        } else if let Some(idx) = Self::preferred(ghosts) {
            ghosts[idx].dot_counter += 1;
        }
    }

    /// The ghost that may leave this tick, if any. A starving release resets
    /// the caller's starvation count.
    pub fn check(
        &self,
        ghosts: &[Ghost],
        starving_ticks: u32,
        limits: &ReleaseLimits,
    ) -> Option<(GhostId, ReleaseReason)> {
        let idx = Self::preferred(ghosts)?;
        let ghost = &ghosts[idx];
        if self.global_enabled {
            if self.global_counter >= limits.global_dots[idx] {
                return Some((ghost.id, ReleaseReason::GlobalDotCounter));
            }
        } else if ghost.dot_counter >= limits.private_dots[idx] {
            return Some((ghost.id, ReleaseReason::PrivateDotCounter));
        }
        if starving_ticks >= limits.starving_ticks {
            return Some((ghost.id, ReleaseReason::Starving));
        }
        None
    }
}
