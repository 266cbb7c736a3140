use crate::clock::TickTimer;
use crate::geometry::{between_tiles, Tile, Vector2};
use crate::level::BonusSymbol;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BonusState {
    Inactive,
    /// On the maze and edible until the timer runs out.
    Edible(TickTimer),
    /// Eaten; its points stay on screen until the timer runs out.
    Eaten(TickTimer),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BonusChange {
    Expired,
    Vanished,
}

/// The fruit (or other symbol) that shows up twice per level.
#[derive(Clone, Debug, PartialEq)]
pub struct Bonus {
    pub symbol: BonusSymbol,
    pub points: u32,
    pub position: Vector2,
    pub state: BonusState,
}

impl Bonus {
    pub fn new(symbol: BonusSymbol, points: u32, tile: Tile) -> Self {
        Self {
            symbol,
            points,
            position: between_tiles(tile),
            state: BonusState::Inactive,
        }
    }

    pub fn tile(&self) -> Tile {
        self.position.tile()
    }

    /// Both tiles under the symbol, since it sits between two tiles.
    pub fn covers(&self, tile: Tile) -> bool {
        let right = self.position.tile();
        tile == right || tile == Tile::new(right.col - 1, right.row)
    }

    pub fn is_edible(&self) -> bool {
        matches!(self.state, BonusState::Edible(_))
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, BonusState::Inactive)
    }

    pub fn activate(&mut self, edible_ticks: i64) {
        self.state = BonusState::Edible(TickTimer::new(edible_ticks));
    }

    /// Returns the points earned, or `None` if nothing was edible.
    pub fn eat(&mut self, shown_ticks: i64) -> Option<u32> {
        if !self.is_edible() {
            return None;
        }
        self.state = BonusState::Eaten(TickTimer::new(shown_ticks));
        Some(self.points)
    }

    pub fn deactivate(&mut self) {
        self.state = BonusState::Inactive;
    }

    pub fn update(&mut self) -> Option<BonusChange> {
        let (timer, change) = match &mut self.state {
            BonusState::Inactive => return None,
            BonusState::Edible(timer) => (timer, BonusChange::Expired),
            BonusState::Eaten(timer) => (timer, BonusChange::Vanished),
        };
        if !timer.tick() {
            return None;
        }
        self.state = BonusState::Inactive;
        Some(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cherries() -> Bonus {
        Bonus::new(BonusSymbol::Cherries, 100, Tile::new(13, 20))
    }

    #[test]
    fn test_uneaten_bonus_expires() {
        let mut bonus = cherries();
        bonus.activate(3);
        assert_eq!(bonus.update(), None);
        assert_eq!(bonus.update(), None);
        assert_eq!(bonus.update(), Some(BonusChange::Expired));
        assert!(!bonus.is_active());
    }

    #[test]
    fn test_eaten_bonus_shows_points_then_vanishes() {
        let mut bonus = cherries();
        assert_eq!(bonus.eat(2), None);
        bonus.activate(100);
        assert_eq!(bonus.eat(2), Some(100));
        assert!(bonus.is_active());
        assert!(!bonus.is_edible());
        assert_eq!(bonus.eat(2), None);
        bonus.update();
        assert_eq!(bonus.update(), Some(BonusChange::Vanished));
    }

    #[test]
    fn test_covers_both_tiles() {
        let bonus = cherries();
        assert_eq!(bonus.tile(), Tile::new(14, 20));
        assert!(bonus.covers(Tile::new(13, 20)));
        assert!(bonus.covers(Tile::new(14, 20)));
        assert!(!bonus.covers(Tile::new(12, 20)));
    }
}
