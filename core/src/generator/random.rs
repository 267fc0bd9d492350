use ndarray::Array2;

use super::*;

/// Places mines by repeated uniform coordinate sampling, resampling on
/// collision until the requested count is reached. Sampling without
/// replacement, so the result is uniform over all possible placements.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        let (width, height) = config.size;
        let total_cells = config.total_cells();

        // degenerate full boards would make the rejection loop spin forever
        if config.mines >= total_cells {
            if config.mines > total_cells {
                log::warn!(
                    "Minefield already full, generated anyway, requested {} but only fits {}",
                    config.mines,
                    total_cells
                );
            }
            return MineLayout::from_mine_mask(Array2::from_elem(config.size.to_nd_index(), true));
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut planted: CellCount = 0;

        while planted < config.mines {
            let coords: Coord2 = (rng.gen_range(0..width), rng.gen_range(0..height));
            let cell = &mut mine_mask[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                planted += 1;
            }
        }

        log::debug!(
            "Generated {}x{} minefield with {} mines (seed {})",
            width,
            height,
            planted,
            self.seed
        );
        MineLayout::from_mine_mask(mine_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_exactly_the_requested_mine_count() {
        for seed in 0..32 {
            let layout =
                RandomMinefieldGenerator::new(seed).generate(GameConfig::classic());
            assert_eq!(layout.mine_count(), 10);
            assert_eq!(layout.size(), (10, 10));
            assert_eq!(layout.safe_cell_count(), 90);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_layout() {
        let config = GameConfig::classic();
        let a = RandomMinefieldGenerator::new(42).generate(config);
        let b = RandomMinefieldGenerator::new(42).generate(config);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_vary_the_layout() {
        let config = GameConfig::classic();
        let layouts: Vec<_> = (0..8)
            .map(|seed| RandomMinefieldGenerator::new(seed).generate(config))
            .collect();
        assert!(layouts.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn full_board_config_short_circuits() {
        let config = GameConfig::new_unchecked((3, 3), 9);
        let layout = RandomMinefieldGenerator::new(7).generate(config);
        assert_eq!(layout.mine_count(), 9);
        assert_eq!(layout.safe_cell_count(), 0);
    }

    #[test]
    fn tight_board_still_terminates() {
        // one safe cell left, collisions are almost certain
        let config = GameConfig::new_unchecked((4, 4), 15);
        let layout = RandomMinefieldGenerator::new(3).generate(config);
        assert_eq!(layout.mine_count(), 15);
        assert_eq!(layout.safe_cell_count(), 1);
    }
}
