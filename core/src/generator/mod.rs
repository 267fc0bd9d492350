use crate::*;
pub use random::*;

mod random;

/// Seam for mine-placement strategies. Placement happens exactly once, when
/// a game is initialized; the produced layout is immutable afterwards.
pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}
