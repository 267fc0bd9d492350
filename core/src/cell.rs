use serde::{Deserialize, Serialize};

/// Canonical player-visible state stored by the engine for each cell.
///
/// A revealed cell carries its adjacent mine count; a flagged cell is still
/// hidden underneath. Whether a cell is a mine lives in the `MineLayout`,
/// not here.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed(u8),
    Flagged,
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Read projection the presentation layer renders.
///
/// Identical to `CellState` while a game is running; once the game has
/// ended, mine cells are shown cosmetically and the mine that ended a lost
/// game is distinguished.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DisplayCell {
    Hidden,
    Revealed(u8),
    Flagged,
    Mine,
    TriggeredMine,
}
