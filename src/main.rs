mod highscore;

use std::fs::File;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use pacman_engine::clock::TICKS_PER_SECOND;
use pacman_engine::game::GameEvent;
use pacman_engine::layout::MazeLayout;
use pacman_engine::maze::TileKind;
use pacman_engine::{Context, Direction, Game, GameConfig, GameState, GhostId, GhostMode, Maze, Tile};
use tracing::info;
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

use crate::highscore::HighScore;

const CELL_W: usize = 2;
const DEFAULT_RENDER_FPS: u64 = 60;
const INPUT_HOLD_MS: u64 = 160;
const DEFAULT_HISCORE_FILE: &str = "pacman-hiscore.toml";
const DEFAULT_LOG_FILE: &str = "pacman.log";

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Eyes,
    Wall,
    Empty,
    Pellet,
    Power,
    Gate,
    Bonus,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
    /// Rows drawn; all-wall rows at the top and bottom are skipped.
    first_row: i32,
    rows: i32,
    cols: i32,
}

impl Renderer {
    fn new(maze: &Maze) -> Self {
        let full_wall = |row: i32| (0..maze.width()).all(|col| maze.is_wall(Tile::new(col, row)));
        let first_row = (0..maze.height()).find(|&row| !full_wall(row)).unwrap_or(0);
        let last_row = (0..maze.height())
            .rev()
            .find(|&row| !full_wall(row))
            .unwrap_or(maze.height() - 1);
        let rows = (last_row - first_row + 1).max(1);
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                (rows * maze.width()) as usize
            ],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
            first_row,
            rows,
            cols: maze.width(),
        }
    }
}

fn main() -> Result<()> {
    init_logging()?;

    let game = load_game()?;
    let hiscore_path = std::env::var_os("PACMAN_HISCORE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISCORE_FILE));
    let mut best = HighScore::load(&hiscore_path)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, game, &mut best, &hiscore_path);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Logs go to a file since the terminal belongs to the renderer. Nothing is
/// logged unless `PACMAN_LOG` is set.
fn init_logging() -> Result<()> {
    let Ok(filter) = EnvFilter::try_from_env("PACMAN_LOG") else {
        return Ok(());
    };
    let path = std::env::var("PACMAN_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let file = File::create(&path).with_context(|| format!("creating log file {path}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    info!("pacman v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn load_game() -> Result<Game> {
    let config = match std::env::var_os("PACMAN_CONFIG") {
        Some(path) => GameConfig::load(&path)
            .with_context(|| format!("loading config {}", PathBuf::from(&path).display()))?,
        None => GameConfig::default(),
    };
    let maze = match std::env::var_os("PACMAN_MAZE") {
        Some(path) => {
            let desc = MazeLayout::load(&path)
                .with_context(|| format!("loading maze {}", PathBuf::from(&path).display()))?;
            Maze::from_layout(&desc)?
        }
        None => Maze::classic(),
    };
    Ok(Game::new(maze, config)?)
}

fn run(stdout: &mut Stdout, mut game: Game, best: &mut HighScore, hiscore_path: &Path) -> Result<()> {
    game.set_high_score(best.points);
    let mut ctx = Context::seeded(seed_from_clock());
    let mut renderer = Renderer::new(game.maze());
    let mut last_tick = Instant::now();
    let mut last_seen: [Option<Instant>; 4] = [None, None, None, None];
    let mut last_pressed: Option<Direction> = None;
    let mut message = String::new();
    let (tick_time, render_fps) = read_speed_settings();
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                let dir = match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => {
                        game.reset();
                        message.clear();
                        renderer.needs_full = true;
                        None
                    }
                    KeyCode::Char('k') | KeyCode::Up => Some(Direction::Up),
                    KeyCode::Char('j') | KeyCode::Down => Some(Direction::Down),
                    KeyCode::Char('h') | KeyCode::Left => Some(Direction::Left),
                    KeyCode::Char('l') | KeyCode::Right => Some(Direction::Right),
                    _ => None,
                };
                if let Some(dir) = dir {
                    last_seen[idx_for_dir(dir)] = Some(Instant::now());
                    last_pressed = Some(dir);
                }
            }
        }

        while last_tick.elapsed() >= tick_time {
            last_tick += tick_time;
            let intent = active_dir_recent(&last_seen, last_pressed);
            let frame = game.advance(&mut ctx, intent);
            for event in &frame.events {
                match event {
                    GameEvent::GhostEaten { points, .. } => message = format!("+{points}"),
                    GameEvent::BonusEaten { symbol, points } => {
                        message = format!("{} +{points}", symbol.name())
                    }
                    GameEvent::ExtraLife => message = "extra life!".to_string(),
                    GameEvent::LevelStarted { level } => message = format!("level {level}"),
                    GameEvent::GameOver { score } => {
                        message = format!("GAME OVER - Final Score: {score} (r to restart, q to quit)");
                        let name = std::env::var("USER").unwrap_or_else(|_| "PLAYER".to_string());
                        if best.submit(*score, game.level_number(), &name) {
                            best.save(hiscore_path)?;
                        }
                    }
                    _ => {}
                }
            }
        }

        render(stdout, &game, &mut renderer, &message)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn seed_from_clock() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn read_speed_settings() -> (Duration, u64) {
    let tick_time = std::env::var("PACMAN_TICK_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_micros(1_000_000 / u64::from(TICKS_PER_SECOND)));
    let render_fps = std::env::var("PACMAN_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    (tick_time, render_fps)
}

fn render(stdout: &mut Stdout, game: &Game, renderer: &mut Renderer, message: &str) -> io::Result<()> {
    let needed_h = (renderer.rows + 2) as u16;
    let needed_w = (renderer.cols as usize * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "Score: {}  High: {}  Lives: {}  Level: {}  {}",
        game.score(),
        game.high_score(),
        game.lives(),
        game.level_number(),
        match game.state() {
            GameState::Ready => "READY!",
            _ => message,
        }
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for y in 0..renderer.rows {
        for x in 0..renderer.cols {
            let tile = Tile::new(x, y + renderer.first_row);
            let cell = cell_for(game, tile);
            let idx = (y * renderer.cols + x) as usize;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x as usize, y as usize, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn ghost_color(id: GhostId) -> Color {
    match id {
        GhostId::Blinky => Color::Red,
        GhostId::Pinky => Color::Magenta,
        GhostId::Inky => Color::Cyan,
        GhostId::Clyde => Color::DarkYellow,
    }
}

fn cell_for(game: &Game, tile: Tile) -> Cell {
    let player = game.player();
    if player.actor.visible && player.tile() == tile {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if let Some(ghost) = game
        .ghosts()
        .iter()
        .find(|g| g.actor.visible && g.tile() == tile)
    {
        return match ghost.mode {
            GhostMode::Frightened => Cell {
                glyph: Glyph::Frightened,
                color: if game.ghost_flashing() {
                    Color::White
                } else {
                    Color::Blue
                },
            },
            GhostMode::Eaten | GhostMode::EnteringHouse => Cell {
                glyph: Glyph::Eyes,
                color: Color::White,
            },
            _ => Cell {
                glyph: Glyph::Ghost,
                color: ghost_color(ghost.id),
            },
        };
    }
    let bonus = game.bonus();
    if bonus.is_edible() && tile == bonus.tile() {
        return Cell {
            glyph: Glyph::Bonus,
            color: Color::Green,
        };
    }

    let maze = game.maze();
    match maze.kind(tile) {
        TileKind::Wall if is_inner_wall(maze, tile) => Cell {
            glyph: Glyph::Empty,
            color: Color::Reset,
        },
        TileKind::Wall => Cell {
            glyph: Glyph::Wall,
            color: if game.state() == GameState::LevelComplete && !game.maze_flash_on() {
                Color::White
            } else {
                Color::Blue
            },
        },
        TileKind::Door => Cell {
            glyph: Glyph::Gate,
            color: Color::Cyan,
        },
        TileKind::Space | TileKind::Tunnel if !game.food().has_food(tile) => Cell {
            glyph: Glyph::Empty,
            color: Color::Reset,
        },
        TileKind::Space | TileKind::Tunnel if !game.food().is_energizer(tile) => Cell {
            glyph: Glyph::Pellet,
            color: Color::White,
        },
        TileKind::Space | TileKind::Tunnel if game.energizers_blink_on() => Cell {
            glyph: Glyph::Power,
            color: Color::Magenta,
        },
        TileKind::Space | TileKind::Tunnel => Cell {
            glyph: Glyph::Empty,
            color: Color::Reset,
        },
    }
}

/// Walls surrounded by walls are left blank so only outlines show.
fn is_inner_wall(maze: &Maze, tile: Tile) -> bool {
    (-1..=1).all(|dy| (-1..=1).all(|dx| maze.is_wall(Tile::new(tile.col + dx, tile.row + dy))))
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let (text, color) = match cell.glyph {
        Glyph::Player => ("😃", cell.color),
        Glyph::Ghost => ("👻", cell.color),
        Glyph::Frightened => ("😱", cell.color),
        Glyph::Eyes => ("👀", cell.color),
        Glyph::Wall => ("██", cell.color),
        Glyph::Empty => ("  ", cell.color),
        Glyph::Pellet => ("· ", cell.color),
        Glyph::Power => ("● ", cell.color),
        Glyph::Gate => ("==", cell.color),
        Glyph::Bonus => ("🍒", cell.color),
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn active_dir_recent(last_seen: &[Option<Instant>; 4], last_pressed: Option<Direction>) -> Option<Direction> {
    let now = Instant::now();
    if let Some(dir) = last_pressed {
        if let Some(t) = last_seen[idx_for_dir(dir)] {
            if now.duration_since(t) <= Duration::from_millis(INPUT_HOLD_MS) {
                return Some(dir);
            }
        }
    }
    let mut best: Option<(Direction, Instant)> = None;
    for (idx, dir) in Direction::PRIORITY.iter().enumerate() {
        if let Some(t) = last_seen[idx] {
            if now.duration_since(t) <= Duration::from_millis(INPUT_HOLD_MS) {
                match best {
                    None => best = Some((*dir, t)),
                    Some((_, bt)) if t > bt => best = Some((*dir, t)),
                    _ => {}
                }
            }
        }
    }
    best.map(|(dir, _)| dir)
}

/// Slot of `dir` in [`Direction::PRIORITY`].
fn idx_for_dir(dir: Direction) -> usize {
    match dir {
        Direction::Up => 0,
        Direction::Left => 1,
        Direction::Down => 2,
        Direction::Right => 3,
    }
}
