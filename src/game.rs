//! The level/lives state machine and the per-tick update that ties the maze,
//! the actors and the timers together.

use std::rc::Rc;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::actor::Player;
use crate::bonus::{Bonus, BonusChange};
use crate::clock::{sec_to_ticks, Context, Pulse, TickTimer};
use crate::config::GameConfig;
use crate::error::Result;
use crate::geometry::{Direction, Tile, Vector2};
use crate::ghost::{Ghost, GhostId, GhostMode, GhostTransition, Surroundings};
use crate::house::{HouseRelease, ReleaseReason};
use crate::hunting::HuntingScheduler;
use crate::level::{BonusSymbol, LevelRow};
use crate::maze::{FoodKind, FoodStore, Maze};

const ENERGIZER_BLINK_TICKS: u32 = 10;
const MAZE_FLASH_TICKS: u32 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Ready,
    Hunting,
    GhostDying,
    PacmanDying,
    LevelComplete,
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    PelletEaten { tile: Tile },
    EnergizerEaten { tile: Tile },
    BonusAppeared { symbol: BonusSymbol },
    BonusEaten { symbol: BonusSymbol, points: u32 },
    BonusExpired { symbol: BonusSymbol },
    GhostEaten { ghost: GhostId, points: u32 },
    GhostReleased { ghost: GhostId, reason: ReleaseReason },
    GhostReturned { ghost: GhostId },
    PlayerDied,
    ExtraLife,
    AllGhostsEaten { points: u32 },
    LevelComplete { level: u32 },
    LevelStarted { level: u32 },
    HuntingPhaseChanged { phase: usize, mode: GhostMode },
    FrightenedEnded,
    StateChanged { from: GameState, to: GameState },
    GameOver { score: u32 },
}

/// Snapshot of one actor after a tick. `mode` is `None` for the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorFrame {
    pub tile: Tile,
    pub position: Vector2,
    pub direction: Direction,
    pub visible: bool,
    pub mode: Option<GhostMode>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    pub tick: u64,
    pub state: GameState,
    pub player: ActorFrame,
    pub ghosts: [ActorFrame; 4],
    pub bonus_tile: Tile,
    pub bonus_visible: bool,
    pub score_delta: u32,
    pub lives_delta: i32,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Default)]
struct Pending {
    score_delta: u32,
    lives_delta: i32,
    events: Vec<GameEvent>,
}

#[derive(Debug)]
pub struct Game {
    maze: Rc<Maze>,
    config: GameConfig,
    food: FoodStore,
    player: Player,
    ghosts: [Ghost; 4],
    bonus: Bonus,
    hunting: HuntingScheduler,
    release: HouseRelease,
    state: GameState,
    state_timer: TickTimer,
    frightened: TickTimer,
    level: u32,
    score: u32,
    high_score: u32,
    lives: u32,
    extra_life_awarded: bool,
    /// Ghosts eaten since the last energizer.
    bounty_index: usize,
    ghosts_eaten_in_level: u32,
    elroy_enabled: bool,
    killed: Vec<GhostId>,
    energizer_blink: Pulse,
    ghost_flash: Pulse,
    maze_flash: Pulse,
    pending: Pending,
}

impl Game {
    /// Fails if `config` does not validate.
    pub fn new(maze: Maze, config: GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(Rc::new(maze), config))
    }

    pub fn classic() -> Self {
        Self::build(Rc::new(Maze::classic()), GameConfig::default())
    }

    fn build(maze: Rc<Maze>, config: GameConfig) -> Self {
        let level = config.level(1);
        let flash = config.timers.flash_ticks;
        let mut game = Self {
            food: FoodStore::new(&maze),
            player: Player::new(&maze),
            ghosts: GhostId::ALL.map(|id| Ghost::new(id, &maze)),
            bonus: Bonus::new(level.bonus, level.bonus_points, maze.bonus_tile()),
            hunting: HuntingScheduler::new(config.hunting_phases(1)),
            release: HouseRelease::new(),
            state: GameState::Ready,
            state_timer: TickTimer::new(config.timers.ready_ticks),
            frightened: TickTimer::stopped(),
            level: 1,
            score: 0,
            high_score: 0,
            lives: config.lives,
            extra_life_awarded: false,
            bounty_index: 0,
            ghosts_eaten_in_level: 0,
            elroy_enabled: true,
            killed: Vec::new(),
            energizer_blink: Pulse::new(ENERGIZER_BLINK_TICKS),
            ghost_flash: Pulse::new(flash),
            maze_flash: Pulse::new(MAZE_FLASH_TICKS),
            pending: Pending::default(),
            maze,
            config,
        };
        game.start_level(1);
        game.pending = Pending::default();
        game
    }

    /// Starts a new game at level one. The high score survives.
    pub fn reset(&mut self) {
        info!("new game");
        self.score = 0;
        self.lives = self.config.lives;
        self.extra_life_awarded = false;
        self.start_level(1);
    }

    /// Collisions with dangerous ghosts are ignored for the next `ticks`.
    pub fn grant_immunity(&mut self, ticks: i64) {
        self.player.immunity = TickTimer::new(ticks);
    }

    pub fn set_high_score(&mut self, points: u32) {
        self.high_score = self.high_score.max(points);
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn food(&self) -> &FoodStore {
        &self.food
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghost(&self, id: GhostId) -> &Ghost {
        &self.ghosts[id.index()]
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn bonus(&self) -> &Bonus {
        &self.bonus
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn state_ticks_remaining(&self) -> i64 {
        self.state_timer.remaining()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level_number(&self) -> u32 {
        self.level
    }

    pub fn level(&self) -> &LevelRow {
        self.config.level(self.level)
    }

    pub fn hunting(&self) -> &HuntingScheduler {
        &self.hunting
    }

    pub fn frightened_ticks_remaining(&self) -> i64 {
        if self.frightened.is_running() {
            self.frightened.remaining()
        } else {
            0
        }
    }

    /// Ghosts eaten during the current freeze, for drawing their bounty.
    pub fn ghosts_being_killed(&self) -> &[GhostId] {
        &self.killed
    }

    pub fn ghost_flashing(&self) -> bool {
        self.ghost_flash.is_running() && !self.ghost_flash.is_on()
    }

    pub fn energizers_blink_on(&self) -> bool {
        self.energizer_blink.is_on()
    }

    pub fn maze_flash_on(&self) -> bool {
        self.maze_flash.is_on()
    }

    pub fn advance<R: Rng>(&mut self, ctx: &mut Context<R>, intent: Option<Direction>) -> FrameResult {
        ctx.clock.tick();
        if let Some(dir) = intent {
            if matches!(self.state, GameState::Ready | GameState::Hunting) {
                self.player.actor.wish_dir = dir;
            }
        }

        match self.state {
            GameState::Ready => self.update_ready(),
            GameState::Hunting => self.update_hunting(&mut ctx.rng),
            GameState::GhostDying => self.update_ghost_dying(&mut ctx.rng),
            GameState::PacmanDying => self.update_pacman_dying(),
            GameState::LevelComplete => self.update_level_complete(),
            GameState::GameOver => {}
        }

        let pending = std::mem::take(&mut self.pending);
        FrameResult {
            tick: ctx.clock.ticks(),
            state: self.state,
            player: ActorFrame {
                tile: self.player.tile(),
                position: self.player.actor.position,
                direction: self.player.actor.move_dir,
                visible: self.player.actor.visible,
                mode: None,
            },
            ghosts: self.ghosts.each_ref().map(|g| ActorFrame {
                tile: g.tile(),
                position: g.actor.position,
                direction: g.actor.move_dir,
                visible: g.actor.visible,
                mode: Some(g.mode),
            }),
            bonus_tile: self.bonus.tile(),
            bonus_visible: self.bonus.is_active(),
            score_delta: pending.score_delta,
            lives_delta: pending.lives_delta,
            events: pending.events,
        }
    }

    fn enter_state(&mut self, state: GameState, duration: i64) {
        debug!(from = ?self.state, to = ?state, duration, "game state changed");
        self.pending.events.push(GameEvent::StateChanged {
            from: self.state,
            to: state,
        });
        self.state = state;
        self.state_timer = TickTimer::new(duration);
    }

    fn start_level(&mut self, number: u32) {
        info!(level = number, "level started");
        self.level = number;
        self.food = FoodStore::new(&self.maze);
        let row = self.config.level(number);
        self.bonus = Bonus::new(row.bonus, row.bonus_points, self.maze.bonus_tile());
        self.hunting = HuntingScheduler::new(self.config.hunting_phases(number));
        self.release = HouseRelease::new();
        self.ghosts = GhostId::ALL.map(|id| Ghost::new(id, &self.maze));
        self.ghosts_eaten_in_level = 0;
        self.pending.events.push(GameEvent::LevelStarted { level: number });
        self.prepare_round();
    }

    /// Puts everybody back at the start for a new round of the same level.
    fn prepare_round(&mut self) {
        self.player.reset(&self.maze);
        for ghost in &mut self.ghosts {
            ghost.reset(&self.maze);
        }
        self.bonus.deactivate();
        self.frightened = TickTimer::stopped();
        self.bounty_index = 0;
        self.killed.clear();
        self.energizer_blink.stop();
        self.ghost_flash.stop();
        self.maze_flash.stop();
        self.enter_state(GameState::Ready, self.config.timers.ready_ticks);
    }

    fn add_score(&mut self, points: u32) {
        self.score += points;
        self.pending.score_delta += points;
        self.high_score = self.high_score.max(self.score);
        if !self.extra_life_awarded && self.score >= self.config.extra_life_score {
            self.extra_life_awarded = true;
            self.lives += 1;
            self.pending.lives_delta += 1;
            self.pending.events.push(GameEvent::ExtraLife);
            debug!(score = self.score, "extra life");
        }
    }

    fn update_ready(&mut self) {
        if self.state_timer.tick() {
            self.hunting.start();
            self.energizer_blink.restart();
            self.enter_state(GameState::Hunting, TickTimer::INDEFINITE);
        }
    }

    fn update_hunting<R: Rng>(&mut self, rng: &mut R) {
        self.player.immunity.tick();
        self.energizer_blink.tick();

        if let Some(mode) = self.hunting.update(&mut self.ghosts) {
            self.pending.events.push(GameEvent::HuntingPhaseChanged {
                phase: self.hunting.phase(),
                mode,
            });
        }

        self.update_player();
        if self.state != GameState::Hunting {
            return;
        }
        self.update_bonus();
        self.update_frightened();
        self.release_ghosts();
        self.update_elroy();
        self.move_ghosts(rng, |_| true);
        self.check_collisions();
    }

    fn update_player(&mut self) {
        let row = self.config.level(self.level);
        let percent = if self.frightened.is_running() {
            row.player_power_speed
        } else {
            row.player_speed
        };
        let speed = self.config.speed(percent);
        self.player.update(&self.maze, speed);

        let tile = self.player.tile();
        match self.food.eat(tile) {
            Some(kind) => self.on_food_eaten(tile, kind),
            None => self.player.starving_ticks += 1,
        }
    }

    fn on_food_eaten(&mut self, tile: Tile, kind: FoodKind) {
        trace!(%tile, ?kind, remaining = self.food.remaining(), "food eaten");
        self.player.starving_ticks = 0;
        let limits = self.config.release_limits(self.level);
        self.release.on_food_eaten(&mut self.ghosts, &limits);
        match kind {
            FoodKind::Pellet => {
                self.player.rest_ticks = self.config.pellet_rest_ticks;
                self.add_score(self.config.pellet_points);
                self.pending.events.push(GameEvent::PelletEaten { tile });
            }
            FoodKind::Energizer => {
                self.player.rest_ticks = self.config.energizer_rest_ticks;
                self.add_score(self.config.energizer_points);
                self.pending.events.push(GameEvent::EnergizerEaten { tile });
                self.energize();
            }
        }

        if self.config.bonus_triggers.contains(&self.food.eaten_count()) {
            self.bonus.activate(self.config.timers.bonus_edible_ticks);
            self.pending.events.push(GameEvent::BonusAppeared {
                symbol: self.bonus.symbol,
            });
        }

        if self.food.remaining() == 0 {
            info!(level = self.level, score = self.score, "level complete");
            self.pending.events.push(GameEvent::LevelComplete { level: self.level });
            self.frightened.stop();
            self.bonus.deactivate();
            for ghost in &mut self.ghosts {
                ghost.actor.visible = false;
            }
            self.energizer_blink.stop();
            self.ghost_flash.stop();
            self.maze_flash.restart();
            self.enter_state(GameState::LevelComplete, self.config.timers.level_complete_ticks);
        }
    }

    fn energize(&mut self) {
        self.bounty_index = 0;
        let seconds = self.config.level(self.level).frightened_seconds;
        for ghost in &mut self.ghosts {
            if matches!(ghost.mode, GhostMode::Scatter | GhostMode::Chase | GhostMode::Frightened) {
                ghost.request_reversal();
            }
        }
        if seconds == 0 {
            return;
        }
        debug!(seconds, "ghosts frightened");
        self.frightened = TickTimer::new(sec_to_ticks(f64::from(seconds)));
        self.hunting.pause();
        self.ghost_flash.stop();
        for ghost in &mut self.ghosts {
            match ghost.mode {
                GhostMode::Scatter | GhostMode::Chase => ghost.mode = GhostMode::Frightened,
                GhostMode::Locked | GhostMode::LeavingHouse => ghost.frightened_on_exit = true,
                GhostMode::Frightened | GhostMode::Eaten | GhostMode::EnteringHouse => {}
            }
        }
    }

    fn update_bonus(&mut self) {
        if self.bonus.is_edible() && self.bonus.covers(self.player.tile()) {
            if let Some(points) = self.bonus.eat(self.config.timers.bonus_eaten_ticks) {
                debug!(symbol = self.bonus.symbol.name(), points, "bonus eaten");
                self.add_score(points);
                self.pending.events.push(GameEvent::BonusEaten {
                    symbol: self.bonus.symbol,
                    points,
                });
            }
        }
        if let Some(BonusChange::Expired) = self.bonus.update() {
            self.pending.events.push(GameEvent::BonusExpired {
                symbol: self.bonus.symbol,
            });
        }
    }

    fn update_frightened(&mut self) {
        if !self.frightened.is_running() {
            return;
        }
        if self.frightened.tick() {
            self.end_frightened();
            return;
        }
        let flashes = self.config.level(self.level).flashes;
        let flash_ticks = 2 * i64::from(flashes) * i64::from(self.config.timers.flash_ticks);
        if !self.ghost_flash.is_running() && self.frightened.remaining() <= flash_ticks {
            self.ghost_flash.restart();
        }
        self.ghost_flash.tick();
    }

    fn end_frightened(&mut self) {
        let mode = self.hunting.mode();
        debug!(?mode, "frightened phase over");
        for ghost in &mut self.ghosts {
            ghost.frightened_on_exit = false;
            if ghost.mode == GhostMode::Frightened {
                ghost.mode = mode;
            }
        }
        self.frightened.stop();
        self.ghost_flash.stop();
        self.hunting.resume();
        self.pending.events.push(GameEvent::FrightenedEnded);
    }

    fn release_ghosts(&mut self) {
        let limits = self.config.release_limits(self.level);
        let Some((id, reason)) = self.release.check(&self.ghosts, self.player.starving_ticks, &limits) else {
            return;
        };
        debug!(ghost = id.name(), ?reason, "ghost released");
        self.ghosts[id.index()].mode = GhostMode::LeavingHouse;
        if reason == ReleaseReason::Starving {
            self.player.starving_ticks = 0;
        }
        if id == GhostId::Clyde && !self.elroy_enabled {
            debug!("elroy resumed");
            self.elroy_enabled = true;
        }
        self.pending.events.push(GameEvent::GhostReleased { ghost: id, reason });
    }

    fn update_elroy(&mut self) {
        let row = self.config.level(self.level);
        let remaining = self.food.remaining();
        let elroy = if !self.elroy_enabled {
            0
        } else if remaining <= row.elroy2_dots {
            2
        } else if remaining <= row.elroy1_dots {
            1
        } else {
            0
        };
        let blinky = &mut self.ghosts[GhostId::Blinky.index()];
        if blinky.elroy != elroy {
            debug!(elroy, remaining, "elroy level changed");
            blinky.elroy = elroy;
        }
    }

    fn move_ghosts<R: Rng>(&mut self, rng: &mut R, moving: impl Fn(&Ghost) -> bool) {
        let row = self.config.level(self.level);
        let surroundings = Surroundings {
            maze: &self.maze,
            player_tile: self.player.tile(),
            player_dir: self.player.actor.move_dir,
            blinky_tile: self.ghosts[GhostId::Blinky.index()].tile(),
            hunting_mode: self.hunting.mode(),
            frightened_active: self.frightened.is_running(),
        };
        for ghost in self.ghosts.iter_mut().filter(|g| moving(g)) {
            let percent = ghost.speed_percent(
                &self.maze,
                row,
                self.config.house_speed,
                self.config.eaten_speed,
            );
            match ghost.update(&surroundings, self.config.speed(percent), rng) {
                Some(GhostTransition::Revived) => {
                    debug!(ghost = ghost.id.name(), "ghost revived");
                    ghost.mode = GhostMode::LeavingHouse;
                    self.pending.events.push(GameEvent::GhostReturned { ghost: ghost.id });
                }
                Some(transition) => trace!(ghost = ghost.id.name(), ?transition),
                None => {}
            }
        }
    }

    fn check_collisions(&mut self) {
        let tile = self.player.tile();
        let deadly = self.ghosts.iter().any(|g| {
            g.tile() == tile
                && matches!(
                    g.mode,
                    GhostMode::Scatter | GhostMode::Chase | GhostMode::LeavingHouse | GhostMode::Locked
                )
        });
        if deadly && !self.player.is_immune() {
            self.kill_player();
            return;
        }

        let victims: Vec<usize> = self
            .ghosts
            .iter()
            .filter(|g| g.tile() == tile && g.mode == GhostMode::Frightened)
            .map(|g| g.id.index())
            .collect();
        if victims.is_empty() {
            return;
        }
        for idx in victims {
            let points = self.config.ghost_bounties[self.bounty_index.min(3)];
            self.bounty_index += 1;
            self.ghosts_eaten_in_level += 1;
            let ghost = &mut self.ghosts[idx];
            ghost.mode = GhostMode::Eaten;
            ghost.bounty = points;
            ghost.frightened_on_exit = false;
            let id = ghost.id;
            self.killed.push(id);
            debug!(ghost = id.name(), points, "ghost eaten");
            self.add_score(points);
            self.pending.events.push(GameEvent::GhostEaten { ghost: id, points });
            if self.ghosts_eaten_in_level == 16 {
                let bonus = self.config.all_ghosts_bonus;
                self.add_score(bonus);
                self.pending.events.push(GameEvent::AllGhostsEaten { points: bonus });
            }
        }
        self.player.actor.visible = false;
        self.enter_state(GameState::GhostDying, self.config.timers.ghost_dying_ticks);
    }

    fn kill_player(&mut self) {
        info!(lives = self.lives - 1, level = self.level, "player died");
        self.lives -= 1;
        self.pending.lives_delta -= 1;
        self.pending.events.push(GameEvent::PlayerDied);
        self.release.enable_global_counter();
        self.elroy_enabled = false;
        self.frightened.stop();
        self.ghost_flash.stop();
        self.energizer_blink.stop();
        self.bonus.deactivate();
        self.enter_state(GameState::PacmanDying, self.config.timers.pacman_dying_ticks);
    }

    fn update_ghost_dying<R: Rng>(&mut self, rng: &mut R) {
        // only eyes keep moving during the freeze
        self.move_ghosts(rng, |g| g.mode.is_harmless() && g.bounty == 0);
        if self.state_timer.tick() {
            for ghost in &mut self.ghosts {
                ghost.bounty = 0;
            }
            self.killed.clear();
            self.player.actor.visible = true;
            self.enter_state(GameState::Hunting, TickTimer::INDEFINITE);
        }
    }

    fn update_pacman_dying(&mut self) {
        self.state_timer.tick();
        if self.state_timer.elapsed() == self.config.timers.hide_ghosts_after_ticks {
            for ghost in &mut self.ghosts {
                ghost.actor.visible = false;
            }
        }
        if !self.state_timer.has_expired() {
            return;
        }
        if self.lives == 0 {
            info!(score = self.score, level = self.level, "game over");
            self.pending.events.push(GameEvent::GameOver { score: self.score });
            self.enter_state(GameState::GameOver, TickTimer::INDEFINITE);
        } else {
            self.prepare_round();
        }
    }

    fn update_level_complete(&mut self) {
        self.maze_flash.tick();
        if self.state_timer.tick() {
            self.start_level(self.level + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_hunting(game: &mut Game, ctx: &mut Context) {
        while game.state() == GameState::Ready {
            game.advance(ctx, None);
        }
        assert_eq!(game.state(), GameState::Hunting);
    }

    /// Puts Blinky on the player's spot, heading the same way.
    fn blinky_on_player(game: &mut Game, mode: GhostMode) {
        let position = game.player.actor.position;
        let blinky = &mut game.ghosts[GhostId::Blinky.index()];
        blinky.mode = mode;
        blinky.actor.place_at(position, Direction::Left);
        blinky.reverse_pending = false;
    }

    #[test]
    fn test_new_game_is_ready() {
        let game = Game::classic();
        assert_eq!(game.state(), GameState::Ready);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.level_number(), 1);
        assert_eq!(game.state_ticks_remaining(), 120);
        assert!(game.ghosts().iter().all(|g| g.mode == GhostMode::Locked));
    }

    #[test]
    fn test_frame_reports_bonus_tile() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(1);
        let frame = game.advance(&mut ctx, None);
        assert_eq!(frame.bonus_tile, Tile::new(14, 20));
        assert!(game.bonus().covers(game.maze().bonus_tile()));
        assert!(!frame.bonus_visible);
    }

    #[test]
    fn test_ready_lasts_two_seconds() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(1);
        for _ in 0..119 {
            game.advance(&mut ctx, None);
        }
        assert_eq!(game.state(), GameState::Ready);
        let frame = game.advance(&mut ctx, None);
        assert_eq!(frame.state, GameState::Hunting);
        assert!(frame.events.contains(&GameEvent::StateChanged {
            from: GameState::Ready,
            to: GameState::Hunting,
        }));
    }

    #[test]
    fn test_collision_kills_player_in_same_tick() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(2);
        start_hunting(&mut game, &mut ctx);
        blinky_on_player(&mut game, GhostMode::Chase);
        let score = game.score();

        let frame = game.advance(&mut ctx, None);
        assert_eq!(frame.state, GameState::PacmanDying);
        assert_eq!(frame.lives_delta, -1);
        assert_eq!(frame.score_delta, 0);
        assert!(frame.events.contains(&GameEvent::PlayerDied));
        assert_eq!(game.lives(), 2);
        assert_eq!(game.score(), score);
    }

    #[test]
    fn test_immunity_prevents_death() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(2);
        start_hunting(&mut game, &mut ctx);
        game.grant_immunity(10);
        blinky_on_player(&mut game, GhostMode::Chase);
        let frame = game.advance(&mut ctx, None);
        assert_eq!(frame.state, GameState::Hunting);
        assert_eq!(game.lives(), 3);
    }

    #[test]
    fn test_round_restarts_after_death() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(3);
        start_hunting(&mut game, &mut ctx);
        blinky_on_player(&mut game, GhostMode::Chase);
        game.advance(&mut ctx, None);
        let mut hidden = false;
        while game.state() == GameState::PacmanDying {
            game.advance(&mut ctx, None);
            hidden |= game.ghosts().iter().all(|g| !g.actor.visible);
        }
        assert!(hidden);
        assert_eq!(game.state(), GameState::Ready);
        assert_eq!(game.player().tile(), Tile::new(14, 26));
        assert!(game.ghosts().iter().all(|g| g.mode == GhostMode::Locked && g.actor.visible));
        assert_eq!(game.release.global_counter(), Some(0));
    }

    #[test]
    fn test_last_life_ends_the_game() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(4);
        game.lives = 1;
        start_hunting(&mut game, &mut ctx);
        blinky_on_player(&mut game, GhostMode::Scatter);
        game.advance(&mut ctx, None);
        let mut events = Vec::new();
        while game.state() == GameState::PacmanDying {
            events.extend(game.advance(&mut ctx, None).events);
        }
        assert_eq!(game.state(), GameState::GameOver);
        assert!(events.contains(&GameEvent::GameOver { score: 0 }));
        // nothing happens until reset
        game.advance(&mut ctx, Some(Direction::Up));
        assert_eq!(game.state(), GameState::GameOver);
        game.reset();
        assert_eq!(game.state(), GameState::Ready);
        assert_eq!(game.lives(), 3);
    }

    #[test]
    fn test_eating_last_food_completes_level() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(5);
        let last = Tile::new(12, 26);
        let others: Vec<Tile> = game.food.iter().map(|(t, _)| t).filter(|&t| t != last).collect();
        for tile in others {
            game.food.eat(tile);
        }
        assert_eq!(game.food().remaining(), 1);
        start_hunting(&mut game, &mut ctx);
        game.grant_immunity(TickTimer::INDEFINITE);

        let mut frame = game.advance(&mut ctx, None);
        for _ in 0..30 {
            if frame.state != GameState::Hunting {
                break;
            }
            frame = game.advance(&mut ctx, None);
        }
        assert_eq!(frame.state, GameState::LevelComplete);
        assert!(frame.events.contains(&GameEvent::LevelComplete { level: 1 }));
        assert!(frame.events.contains(&GameEvent::PelletEaten { tile: last }));
        assert_eq!(game.food().remaining(), 0);

        while game.state() == GameState::LevelComplete {
            game.advance(&mut ctx, None);
        }
        assert_eq!(game.level_number(), 2);
        assert_eq!(game.food().remaining(), game.food().total());
    }

    #[test]
    fn test_frightened_ghost_is_eaten_for_bounty() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(6);
        start_hunting(&mut game, &mut ctx);
        game.ghosts[GhostId::Blinky.index()].mode = GhostMode::Scatter;
        game.energize();
        assert_eq!(game.ghost(GhostId::Blinky).mode, GhostMode::Frightened);
        assert!(game.hunting().is_paused());
        blinky_on_player(&mut game, GhostMode::Frightened);

        let frame = game.advance(&mut ctx, None);
        assert_eq!(frame.state, GameState::GhostDying);
        assert!(frame.events.contains(&GameEvent::GhostEaten {
            ghost: GhostId::Blinky,
            points: 200,
        }));
        assert_eq!(frame.score_delta, 200);
        assert!(!frame.player.visible);
        assert_eq!(game.ghost(GhostId::Blinky).mode, GhostMode::Eaten);
        assert_eq!(game.ghosts_being_killed(), &[GhostId::Blinky]);

        let frozen = game.ghost(GhostId::Blinky).actor.position;
        for _ in 0..60 {
            game.advance(&mut ctx, None);
        }
        assert_eq!(game.ghost(GhostId::Blinky).actor.position, frozen);
        assert_eq!(game.state(), GameState::Hunting);
        assert!(game.player().actor.visible);
    }

    #[test]
    fn test_bounty_escalates() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(7);
        start_hunting(&mut game, &mut ctx);
        for ghost in &mut game.ghosts {
            ghost.mode = GhostMode::Scatter;
        }
        game.energize();
        let position = game.player.actor.position;
        for ghost in &mut game.ghosts {
            ghost.actor.place_at(position, Direction::Left);
            ghost.reverse_pending = false;
        }
        let frame = game.advance(&mut ctx, None);
        let points: Vec<u32> = frame
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::GhostEaten { points, .. } => Some(*points),
                _ => None,
            })
            .collect();
        assert_eq!(points, vec![200, 400, 800, 1600]);
        assert_eq!(frame.score_delta, 3000);
    }

    #[test]
    fn test_frightened_expiry_returns_to_current_phase() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(8);
        start_hunting(&mut game, &mut ctx);
        let mut none: [Ghost; 0] = [];
        while game.hunting.mode() == GhostMode::Scatter {
            game.hunting.update(&mut none);
        }
        game.ghosts[GhostId::Blinky.index()].mode = GhostMode::Chase;
        game.energize();
        assert_eq!(game.ghost(GhostId::Blinky).mode, GhostMode::Frightened);
        assert!(game.ghost(GhostId::Pinky).frightened_on_exit);
        game.frightened = TickTimer::new(1);

        let frame = game.advance(&mut ctx, None);
        assert!(frame.events.contains(&GameEvent::FrightenedEnded));
        assert_eq!(game.ghost(GhostId::Blinky).mode, GhostMode::Chase);
        assert!(!game.hunting().is_paused());
        assert!(game.ghosts().iter().all(|g| !g.frightened_on_exit));
    }

    #[test]
    fn test_energizer_without_fright_still_reverses() {
        let mut game = Game::classic();
        game.level = 17;
        let mut ctx = Context::seeded(9);
        start_hunting(&mut game, &mut ctx);
        game.ghosts[GhostId::Blinky.index()].mode = GhostMode::Scatter;
        game.energize();
        let blinky = game.ghost(GhostId::Blinky);
        assert_eq!(blinky.mode, GhostMode::Scatter);
        assert!(blinky.reverse_pending);
        assert_eq!(game.frightened_ticks_remaining(), 0);
    }

    #[test]
    fn test_extra_life_awarded_once() {
        let mut game = Game::classic();
        game.add_score(9_990);
        assert_eq!(game.lives(), 3);
        game.add_score(10);
        assert_eq!(game.lives(), 4);
        game.add_score(10_000);
        assert_eq!(game.lives(), 4);
        assert_eq!(game.high_score(), 20_000);
    }

    #[test]
    fn test_first_release_is_blinky() {
        let mut game = Game::classic();
        let mut ctx = Context::seeded(10);
        start_hunting(&mut game, &mut ctx);
        let frame = game.advance(&mut ctx, None);
        assert!(frame.events.contains(&GameEvent::GhostReleased {
            ghost: GhostId::Blinky,
            reason: ReleaseReason::PrivateDotCounter,
        }));
        assert_eq!(game.ghost(GhostId::Blinky).mode, GhostMode::Scatter);
    }

    #[test]
    fn test_elroy_follows_remaining_food() {
        let mut game = Game::classic();
        let tiles: Vec<Tile> = game.food.iter().map(|(t, _)| t).collect();
        for &tile in tiles.iter().skip(20) {
            game.food.eat(tile);
        }
        game.update_elroy();
        assert_eq!(game.ghost(GhostId::Blinky).elroy, 1);
        for &tile in &tiles[..10] {
            game.food.eat(tile);
        }
        game.update_elroy();
        assert_eq!(game.ghost(GhostId::Blinky).elroy, 2);
        game.elroy_enabled = false;
        game.update_elroy();
        assert_eq!(game.ghost(GhostId::Blinky).elroy, 0);
    }
}
