//! Tuning loaded from TOML. Every field has an arcade default, so a config
//! file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clock::{sec_to_ticks, TickTimer};
use crate::error::{ConfigError, Result};
use crate::house::ReleaseLimits;
use crate::hunting::PHASES;
use crate::level::{arcade_levels, level_row, LevelRow};

/// Length of one hunting phase. In TOML: a tick count, `-1` for a single
/// tick, or `"forever"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDuration", into = "RawDuration")]
pub enum PhaseDuration {
    Ticks(i64),
    OneTick,
    Forever,
}

impl PhaseDuration {
    pub fn seconds(seconds: f64) -> Self {
        PhaseDuration::Ticks(sec_to_ticks(seconds))
    }

    /// Value understood by [`TickTimer::new`].
    pub fn ticks(self) -> i64 {
        match self {
            PhaseDuration::Ticks(ticks) => ticks,
            PhaseDuration::OneTick => TickTimer::ONE_TICK,
            PhaseDuration::Forever => TickTimer::INDEFINITE,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Ticks(i64),
    Word(String),
}

impl TryFrom<RawDuration> for PhaseDuration {
    type Error = ConfigError;

    fn try_from(raw: RawDuration) -> Result<Self> {
        match raw {
            RawDuration::Ticks(-1) => Ok(PhaseDuration::OneTick),
            RawDuration::Ticks(ticks) if ticks > 0 => Ok(PhaseDuration::Ticks(ticks)),
            RawDuration::Ticks(ticks) => Err(ConfigError::InvalidPhaseDuration(ticks)),
            RawDuration::Word(word) if word == "forever" => Ok(PhaseDuration::Forever),
            RawDuration::Word(word) => Err(ConfigError::InvalidHunting(format!(
                "unknown phase duration {word:?}"
            ))),
        }
    }
}

impl From<PhaseDuration> for RawDuration {
    fn from(duration: PhaseDuration) -> Self {
        match duration {
            PhaseDuration::Ticks(ticks) => RawDuration::Ticks(ticks),
            PhaseDuration::OneTick => RawDuration::Ticks(-1),
            PhaseDuration::Forever => RawDuration::Word("forever".to_string()),
        }
    }
}

/// Scatter/chase timetable used from `from_level` on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntingTier {
    pub from_level: u32,
    pub phases: [PhaseDuration; PHASES],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timers {
    pub ready_ticks: i64,
    pub ghost_dying_ticks: i64,
    pub pacman_dying_ticks: i64,
    /// Ghosts disappear this long into the death animation.
    pub hide_ghosts_after_ticks: i64,
    pub level_complete_ticks: i64,
    pub bonus_edible_ticks: i64,
    pub bonus_eaten_ticks: i64,
    /// Half period of a frightened ghost's flashing.
    pub flash_ticks: u32,
}

impl Timers {
    fn durations(&self) -> impl Iterator<Item = (&'static str, i64)> {
        [
            ("timers.ready_ticks", self.ready_ticks),
            ("timers.ghost_dying_ticks", self.ghost_dying_ticks),
            ("timers.pacman_dying_ticks", self.pacman_dying_ticks),
            ("timers.hide_ghosts_after_ticks", self.hide_ghosts_after_ticks),
            ("timers.level_complete_ticks", self.level_complete_ticks),
            ("timers.bonus_edible_ticks", self.bonus_edible_ticks),
            ("timers.bonus_eaten_ticks", self.bonus_eaten_ticks),
        ]
        .into_iter()
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self {
            ready_ticks: sec_to_ticks(2.0),
            ghost_dying_ticks: sec_to_ticks(1.0),
            pacman_dying_ticks: sec_to_ticks(3.0),
            hide_ghosts_after_ticks: sec_to_ticks(1.0),
            level_complete_ticks: sec_to_ticks(3.0),
            bonus_edible_ticks: sec_to_ticks(9.5),
            bonus_eaten_ticks: sec_to_ticks(2.0),
            flash_ticks: 14,
        }
    }
}

/// House release limits. Per-level lists reuse their last entry for later
/// levels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub private_dots: Vec<[u32; 4]>,
    pub global_dots: [u32; 4],
    pub starving_ticks: Vec<u32>,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            private_dots: vec![[0, 0, 30, 60], [0, 0, 0, 50], [0, 0, 0, 0]],
            global_dots: [0, 7, 17, 32],
            starving_ticks: vec![240, 240, 240, 240, 180],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub lives: u32,
    pub extra_life_score: u32,
    pub pellet_points: u32,
    pub energizer_points: u32,
    pub ghost_bounties: [u32; 4],
    /// Awarded once all sixteen ghosts of a level were eaten.
    pub all_ghosts_bonus: u32,
    /// Pixels per tick at 100% speed.
    pub base_speed: f32,
    pub house_speed: u32,
    pub eaten_speed: u32,
    pub pellet_rest_ticks: u32,
    pub energizer_rest_ticks: u32,
    /// Eaten-food counts at which the bonus appears.
    pub bonus_triggers: Vec<u32>,
    pub timers: Timers,
    pub release: ReleaseConfig,
    pub hunting: Vec<HuntingTier>,
    pub levels: Vec<LevelRow>,
}

impl Default for GameConfig {
    fn default() -> Self {
        use PhaseDuration::{Forever, OneTick};
        let s = PhaseDuration::seconds;
        Self {
            lives: 3,
            extra_life_score: 10_000,
            pellet_points: 10,
            energizer_points: 50,
            ghost_bounties: [200, 400, 800, 1600],
            all_ghosts_bonus: 12_000,
            base_speed: 1.25,
            house_speed: 50,
            eaten_speed: 150,
            pellet_rest_ticks: 1,
            energizer_rest_ticks: 3,
            bonus_triggers: vec![70, 170],
            timers: Timers::default(),
            release: ReleaseConfig::default(),
            hunting: vec![
                HuntingTier {
                    from_level: 1,
                    phases: [s(7.0), s(20.0), s(7.0), s(20.0), s(5.0), s(20.0), s(5.0), Forever],
                },
                HuntingTier {
                    from_level: 2,
                    phases: [s(7.0), s(20.0), s(7.0), s(20.0), s(5.0), s(1033.0), OneTick, Forever],
                },
                HuntingTier {
                    from_level: 5,
                    phases: [s(5.0), s(20.0), s(5.0), s(20.0), s(5.0), s(1037.0), OneTick, Forever],
                },
            ],
            levels: arcade_levels(),
        }
    }
}

fn pick<T: Copy>(table: &[T], level: u32) -> Option<T> {
    let idx = (level.max(1) as usize - 1).min(table.len().checked_sub(1)?);
    table.get(idx).copied()
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyLevelTable);
        }
        if self.lives == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "lives",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.base_speed.is_nan() || self.base_speed <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                name: "base_speed",
                reason: format!("{} is not a positive speed", self.base_speed),
            });
        }
        if self.bonus_triggers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::InvalidSetting {
                name: "bonus_triggers",
                reason: "triggers must be strictly increasing".to_string(),
            });
        }
        if let Some((name, ticks)) = self.timers.durations().find(|&(_, ticks)| ticks <= 0) {
            return Err(ConfigError::InvalidSetting {
                name,
                reason: format!("{ticks} is not a positive tick count"),
            });
        }
        if self.timers.flash_ticks == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "timers.flash_ticks",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.release.private_dots.is_empty() || self.release.starving_ticks.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "release",
                reason: "per-level release lists must not be empty".to_string(),
            });
        }

        match self.hunting.first() {
            None => return Err(ConfigError::InvalidHunting("no tiers".to_string())),
            Some(tier) if tier.from_level != 1 => {
                return Err(ConfigError::InvalidHunting(format!(
                    "first tier starts at level {}, expected 1",
                    tier.from_level
                )))
            }
            Some(_) => {}
        }
        if self
            .hunting
            .windows(2)
            .any(|w| w[0].from_level >= w[1].from_level)
        {
            return Err(ConfigError::InvalidHunting(
                "tiers must be ordered by level".to_string(),
            ));
        }
        for phase in self.hunting.iter().flat_map(|tier| tier.phases) {
            if let PhaseDuration::Ticks(ticks @ ..=0) = phase {
                return Err(ConfigError::InvalidPhaseDuration(ticks));
            }
        }
        Ok(())
    }

    pub fn level(&self, number: u32) -> &LevelRow {
        level_row(&self.levels, number)
    }

    pub fn hunting_phases(&self, number: u32) -> [i64; PHASES] {
        let tier = self
            .hunting
            .iter()
            .rev()
            .find(|tier| tier.from_level <= number.max(1))
            .or_else(|| self.hunting.first());
        match tier {
            Some(tier) => tier.phases.map(PhaseDuration::ticks),
            None => [TickTimer::INDEFINITE; PHASES],
        }
    }

    pub fn release_limits(&self, number: u32) -> ReleaseLimits {
        ReleaseLimits {
            private_dots: pick(&self.release.private_dots, number).unwrap_or_default(),
            global_dots: self.release.global_dots,
            starving_ticks: pick(&self.release.starving_ticks, number).unwrap_or_default(),
        }
    }

    /// Pixels per tick for a speed percentage.
    pub fn speed(&self, percent: u32) -> f32 {
        self.base_speed * percent as f32 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.hunting_phases(1)[0], 420);
        assert_eq!(config.hunting_phases(1)[7], TickTimer::INDEFINITE);
        assert_eq!(config.hunting_phases(3)[5], 1033 * 60);
        assert_eq!(config.hunting_phases(3)[6], TickTimer::ONE_TICK);
        assert_eq!(config.hunting_phases(9)[0], 300);
    }

    #[test]
    fn test_release_limits_by_level() {
        let config = GameConfig::default();
        assert_eq!(config.release_limits(1).private_dots, [0, 0, 30, 60]);
        assert_eq!(config.release_limits(2).private_dots, [0, 0, 0, 50]);
        assert_eq!(config.release_limits(7).private_dots, [0, 0, 0, 0]);
        assert_eq!(config.release_limits(4).starving_ticks, 240);
        assert_eq!(config.release_limits(5).starving_ticks, 180);
    }

    #[test]
    fn test_speed_is_exact_for_multiples_of_five() {
        let config = GameConfig::default();
        assert_eq!(config.speed(100), 1.25);
        assert_eq!(config.speed(80), 1.0);
        assert_eq!(config.speed(75), 0.9375);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            lives = 5

            [timers]
            ready_ticks = 30

            [[hunting]]
            from_level = 1
            phases = [60, 60, 60, 60, 60, 60, -1, "forever"]
            "#,
        )
        .unwrap();
        assert_eq!(config.lives, 5);
        assert_eq!(config.timers.ready_ticks, 30);
        assert_eq!(config.timers.pacman_dying_ticks, 180);
        assert_eq!(config.hunting.len(), 1);
        assert_eq!(config.hunting_phases(12)[6], TickTimer::ONE_TICK);
        assert_eq!(config.levels.len(), 21);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let err = GameConfig::from_toml_str(
            r#"
            [[hunting]]
            from_level = 1
            phases = [60, 0, 60, 60, 60, 60, -1, "forever"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));

        let err = GameConfig::from_toml_str("lives = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { name: "lives", .. }));

        let err = GameConfig::from_toml_str("levels = []").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyLevelTable));
    }

    #[test]
    fn test_timers_must_be_positive() {
        for name in [
            "ready_ticks",
            "ghost_dying_ticks",
            "pacman_dying_ticks",
            "hide_ghosts_after_ticks",
            "level_complete_ticks",
            "bonus_edible_ticks",
            "bonus_eaten_ticks",
        ] {
            for ticks in [0, -1, -30] {
                let err = GameConfig::from_toml_str(&format!("[timers]\n{name} = {ticks}")).unwrap_err();
                match err {
                    ConfigError::InvalidSetting { name: field, .. } => {
                        assert_eq!(field, format!("timers.{name}"))
                    }
                    other => panic!("unexpected error for {name} = {ticks}: {other}"),
                }
            }
        }
        let err = GameConfig::from_toml_str("[timers]\nflash_ticks = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { name: "timers.flash_ticks", .. }));
    }
}
