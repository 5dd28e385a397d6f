use rand::Rng;
use serde::{Deserialize, Serialize};

/// Health is not simulated yet; every cell reports full health.
pub const FULL_HEALTH: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: u32,
    pub moisture: u8,
    pub health: u8,
}

impl Cell {
    pub fn new(id: u32, moisture: u8) -> Self {
        Self {
            id,
            moisture: moisture.min(Field::MAX_MOISTURE),
            health: FULL_HEALTH,
        }
    }

    /// Lower moisture by `amount`, floored at 0.
    pub fn dry(&mut self, amount: u8) {
        self.moisture = self.moisture.saturating_sub(amount);
    }

    /// Raise moisture by `amount`, capped at 100.
    pub fn wet(&mut self, amount: u8) {
        self.moisture = self
            .moisture
            .saturating_add(amount)
            .min(Field::MAX_MOISTURE);
    }
}

/// Display band for a cell's moisture, matching the tile colours of the
/// original dashboard (green / yellow / red).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoistureBand {
    Wet,
    Moderate,
    Dry,
}

impl MoistureBand {
    pub fn classify(moisture: u8) -> Self {
        if moisture > 50 {
            MoistureBand::Wet
        } else if moisture > 30 {
            MoistureBand::Moderate
        } else {
            MoistureBand::Dry
        }
    }
}

/// Fixed-size plot of cells, indexed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Field {
    cells: Vec<Cell>,
}

impl Field {
    pub const MAX_MOISTURE: u8 = 100;

    /// Seed `count` cells with moisture drawn uniformly from `min..=max`.
    pub fn initialize<R: Rng + ?Sized>(count: usize, min: u8, max: u8, rng: &mut R) -> Self {
        debug_assert!(min <= max, "initial moisture bounds must be ordered");
        let cells = (0..count)
            .map(|i| Cell::new(i as u32, rng.random_range(min..=max)))
            .collect();
        Self { cells }
    }

    /// Build a field from explicit moisture values, ids assigned in order.
    pub fn from_moistures(moistures: &[u8]) -> Self {
        let cells = moistures
            .iter()
            .enumerate()
            .map(|(i, &m)| Cell::new(i as u32, m))
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, id: u32) -> Option<&Cell> {
        self.cells.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn moistures(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.moisture).collect()
    }

    /// Mean moisture rounded half-up; `None` for an empty field.
    pub fn average_moisture(&self) -> Option<u32> {
        if self.cells.is_empty() {
            return None;
        }
        let n = self.cells.len() as u64;
        let sum: u64 = self.cells.iter().map(|c| c.moisture as u64).sum();
        Some(((2 * sum + n) / (2 * n)) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn initialize_assigns_dense_ids_and_bounded_moisture() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let field = Field::initialize(100, 30, 70, &mut rng);
        assert_eq!(field.len(), 100);
        for (i, cell) in field.cells().iter().enumerate() {
            assert_eq!(cell.id, i as u32);
            assert!((30..=70).contains(&cell.moisture));
            assert_eq!(cell.health, FULL_HEALTH);
        }
    }

    #[test]
    fn initialize_is_deterministic_for_a_seed() {
        let a = Field::initialize(25, 30, 70, &mut ChaCha12Rng::seed_from_u64(3));
        let b = Field::initialize(25, 30, 70, &mut ChaCha12Rng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn average_of_uniform_field() {
        let field = Field::from_moistures(&[50; 100]);
        assert_eq!(field.average_moisture(), Some(50));
    }

    #[test]
    fn average_rounds_half_up() {
        assert_eq!(Field::from_moistures(&[0, 100]).average_moisture(), Some(50));
        assert_eq!(Field::from_moistures(&[0, 1]).average_moisture(), Some(1));
        assert_eq!(Field::from_moistures(&[0, 0, 1]).average_moisture(), Some(0));
        assert_eq!(Field::from_moistures(&[1, 2, 2]).average_moisture(), Some(2));
    }

    #[test]
    fn average_of_empty_field_is_none() {
        assert_eq!(Field::default().average_moisture(), None);
    }

    #[test]
    fn cell_clamps_both_ends() {
        let mut cell = Cell::new(0, 3);
        cell.dry(5);
        assert_eq!(cell.moisture, 0);
        cell.wet(250);
        assert_eq!(cell.moisture, 100);
        assert_eq!(Cell::new(1, 200).moisture, 100);
    }

    #[test]
    fn bands_follow_tile_thresholds() {
        assert_eq!(MoistureBand::classify(51), MoistureBand::Wet);
        assert_eq!(MoistureBand::classify(50), MoistureBand::Moderate);
        assert_eq!(MoistureBand::classify(31), MoistureBand::Moderate);
        assert_eq!(MoistureBand::classify(30), MoistureBand::Dry);
        assert_eq!(MoistureBand::classify(0), MoistureBand::Dry);
    }
}
