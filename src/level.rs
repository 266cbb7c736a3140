use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusSymbol {
    Cherries,
    Strawberry,
    Peach,
    Apple,
    Grapes,
    Galaxian,
    Bell,
    Key,
}

impl BonusSymbol {
    pub fn name(self) -> &'static str {
        match self {
            BonusSymbol::Cherries => "cherries",
            BonusSymbol::Strawberry => "strawberry",
            BonusSymbol::Peach => "peach",
            BonusSymbol::Apple => "apple",
            BonusSymbol::Grapes => "grapes",
            BonusSymbol::Galaxian => "galaxian",
            BonusSymbol::Bell => "bell",
            BonusSymbol::Key => "key",
        }
    }
}

/// Tuning for one level. Speeds are percentages of the base speed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelRow {
    pub bonus: BonusSymbol,
    pub bonus_points: u32,
    pub player_speed: u32,
    pub ghost_speed: u32,
    pub ghost_tunnel_speed: u32,
    pub elroy1_dots: u32,
    pub elroy1_speed: u32,
    pub elroy2_dots: u32,
    pub elroy2_speed: u32,
    pub player_power_speed: u32,
    pub ghost_frightened_speed: u32,
    pub frightened_seconds: u32,
    pub flashes: u32,
}

#[allow(clippy::too_many_arguments)]
const fn row(
    bonus: BonusSymbol,
    bonus_points: u32,
    player_speed: u32,
    ghost_speed: u32,
    ghost_tunnel_speed: u32,
    elroy1_dots: u32,
    elroy1_speed: u32,
    elroy2_dots: u32,
    elroy2_speed: u32,
    player_power_speed: u32,
    ghost_frightened_speed: u32,
    frightened_seconds: u32,
    flashes: u32,
) -> LevelRow {
    LevelRow {
        bonus,
        bonus_points,
        player_speed,
        ghost_speed,
        ghost_tunnel_speed,
        elroy1_dots,
        elroy1_speed,
        elroy2_dots,
        elroy2_speed,
        player_power_speed,
        ghost_frightened_speed,
        frightened_seconds,
        flashes,
    }
}

/// Arcade table for levels 1 to 21; level 21 repeats forever.
pub fn arcade_levels() -> Vec<LevelRow> {
    use BonusSymbol::*;
    vec![
        row(Cherries, 100, 80, 75, 40, 20, 80, 10, 85, 90, 50, 6, 5),
        row(Strawberry, 300, 90, 85, 45, 30, 90, 15, 95, 95, 55, 5, 5),
        row(Peach, 500, 90, 85, 45, 40, 90, 20, 95, 95, 55, 4, 5),
        row(Peach, 500, 90, 85, 45, 40, 90, 20, 95, 95, 55, 3, 5),
        row(Apple, 700, 100, 95, 50, 40, 100, 20, 105, 100, 60, 2, 5),
        row(Apple, 700, 100, 95, 50, 50, 100, 25, 105, 100, 60, 5, 5),
        row(Grapes, 1000, 100, 95, 50, 50, 100, 25, 105, 100, 60, 2, 5),
        row(Grapes, 1000, 100, 95, 50, 50, 100, 25, 105, 100, 60, 2, 5),
        row(Galaxian, 2000, 100, 95, 50, 60, 100, 30, 105, 100, 60, 1, 3),
        row(Galaxian, 2000, 100, 95, 50, 60, 100, 30, 105, 100, 60, 5, 5),
        row(Bell, 3000, 100, 95, 50, 60, 100, 30, 105, 100, 60, 2, 5),
        row(Bell, 3000, 100, 95, 50, 80, 100, 40, 105, 100, 60, 1, 3),
        row(Key, 5000, 100, 95, 50, 80, 100, 40, 105, 100, 60, 1, 3),
        row(Key, 5000, 100, 95, 50, 80, 100, 40, 105, 100, 60, 3, 5),
        row(Key, 5000, 100, 95, 50, 100, 100, 50, 105, 100, 60, 1, 3),
        row(Key, 5000, 100, 95, 50, 100, 100, 50, 105, 100, 60, 1, 3),
        row(Key, 5000, 100, 95, 50, 100, 100, 50, 105, 0, 0, 0, 0),
        row(Key, 5000, 100, 95, 50, 100, 100, 50, 105, 100, 60, 1, 3),
        row(Key, 5000, 100, 95, 50, 120, 100, 60, 105, 0, 0, 0, 0),
        row(Key, 5000, 100, 95, 50, 120, 100, 60, 105, 0, 0, 0, 0),
        row(Key, 5000, 90, 95, 50, 120, 100, 60, 105, 0, 0, 0, 0),
    ]
}

/// Row for a 1-based level number; levels past the table reuse its last row.
pub fn level_row(levels: &[LevelRow], number: u32) -> &LevelRow {
    let idx = (number.max(1) as usize - 1).min(levels.len().saturating_sub(1));
    &levels[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_level() {
        let levels = arcade_levels();
        let first = level_row(&levels, 1);
        assert_eq!(first.bonus, BonusSymbol::Cherries);
        assert_eq!(first.frightened_seconds, 6);
        assert_eq!(first.ghost_speed, 75);
    }

    #[test]
    fn test_levels_past_table_repeat_last_row() {
        let levels = arcade_levels();
        assert_eq!(levels.len(), 21);
        assert_eq!(level_row(&levels, 21), level_row(&levels, 255));
        assert_eq!(level_row(&levels, 0), level_row(&levels, 1));
    }

    #[test]
    fn test_speeds_are_multiples_of_five() {
        for row in arcade_levels() {
            for speed in [
                row.player_speed,
                row.ghost_speed,
                row.ghost_tunnel_speed,
                row.elroy1_speed,
                row.elroy2_speed,
                row.player_power_speed,
                row.ghost_frightened_speed,
            ] {
                assert_eq!(speed % 5, 0);
            }
        }
    }
}
