use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::*;

/// Session lifecycle. A game is born `Active` (mines are placed at
/// initialization, there is no pre-start phase) and only leaves it through
/// one of the two terminal states. No pause, no resume; replay means
/// constructing a fresh engine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// How the primary action is interpreted. The alternate action always
/// toggles a flag regardless of mode.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputMode {
    Dig,
    Flag,
}

impl Default for InputMode {
    fn default() -> Self {
        Self::Dig
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Outcome of a mode-dispatched primary action.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Reveal(RevealOutcome),
    Flag(FlagOutcome),
}

impl ActionOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Reveal(outcome) => outcome.has_update(),
            Self::Flag(outcome) => outcome.has_update(),
        }
    }
}

/// Zero-padded `MM:SS` clock text.
pub fn format_clock(elapsed_seconds: u32) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

/// The whole game: board, flag budget, input mode, session state, and
/// elapsed-time bookkeeping. Invalid input during play is silently ignored
/// and surfaces as a `NoChange` outcome, never as an error.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    mine_layout: MineLayout,
    board: Array2<CellState>,
    revealed_count: CellCount,
    flags_remaining: CellCount,
    mode: InputMode,
    state: GameState,
    elapsed_seconds: u32,
    triggered_mine: Option<Coord2>,
}

impl GameEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        let flags_remaining = mine_layout.mine_count();
        Self {
            mine_layout,
            board: Array2::default(size.to_nd_index()),
            revealed_count: 0,
            flags_remaining,
            mode: Default::default(),
            state: GameState::Active,
            elapsed_seconds: 0,
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    /// Flags still available for placement, always within `0..=total_mines`.
    pub fn flags_remaining(&self) -> CellCount {
        self.flags_remaining
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    /// Elapsed time as zero-padded `MM:SS`.
    pub fn clock(&self) -> String {
        format_clock(self.elapsed_seconds)
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switch input interpretation. Never touches the board.
    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    pub fn cell_at(&self, coords: Coord2) -> CellState {
        self.board[coords.to_nd_index()]
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mine_layout.contains_mine(coords)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// One second of game time. Only counts while the session is active, so
    /// a tick that races a game-ending move is harmless.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.elapsed_seconds += 1;
        true
    }

    /// Dispatches the primary input (e.g. a left click) through the current
    /// mode: reveal in `Dig`, flag toggle in `Flag`.
    pub fn primary_action(&mut self, coords: Coord2) -> ActionOutcome {
        match self.mode {
            InputMode::Dig => ActionOutcome::Reveal(self.reveal(coords)),
            InputMode::Flag => ActionOutcome::Flag(self.toggle_flag(coords)),
        }
    }

    /// The alternate input (e.g. a context click) always toggles a flag.
    pub fn alternate_action(&mut self, coords: Coord2) -> FlagOutcome {
        self.toggle_flag(coords)
    }

    /// Toggle a flag. Removing always succeeds and returns budget; placing
    /// requires remaining budget. Revealed cells cannot be flagged.
    pub fn toggle_flag(&mut self, coords: Coord2) -> FlagOutcome {
        use CellState::*;
        use FlagOutcome::*;

        if !self.state.is_active() || !self.mine_layout.in_bounds(coords) {
            return NoChange;
        }

        match self.board[coords.to_nd_index()] {
            Hidden if self.flags_remaining > 0 => {
                self.board[coords.to_nd_index()] = Flagged;
                self.flags_remaining -= 1;
                Changed
            }
            Hidden => {
                log::debug!("Flag budget exhausted, ignoring flag at {:?}", coords);
                NoChange
            }
            Flagged => {
                self.board[coords.to_nd_index()] = Hidden;
                self.flags_remaining += 1;
                Changed
            }
            Revealed(_) => NoChange,
        }
    }

    /// Reveal a cell. No-op on an inactive session, out-of-bounds
    /// coordinates, and already-revealed or flagged cells. A mine loses the
    /// game; a zero-count cell flood-fills its region; every successful
    /// reveal is followed by the win check.
    pub fn reveal(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.state.is_active() || !self.mine_layout.in_bounds(coords) {
            return RevealOutcome::NoChange;
        }

        let cell = self.board[coords.to_nd_index()];
        let has_mine = self.mine_layout[coords];

        match (cell, has_mine) {
            (CellState::Hidden, true) => {
                self.triggered_mine = Some(coords);
                self.end_game(false);
                RevealOutcome::HitMine
            }
            (CellState::Hidden, false) => {
                let adjacent_mines = self.mine_layout.adjacent_mine_count(coords);
                self.board[coords.to_nd_index()] = CellState::Revealed(adjacent_mines);
                self.revealed_count += 1;
                log::debug!("Revealed {:?}, adjacent mines: {}", coords, adjacent_mines);

                if adjacent_mines == 0 {
                    self.flood_fill_from(coords);
                }

                if self.revealed_count == self.mine_layout.safe_cell_count() {
                    self.end_game(true);
                    RevealOutcome::Won
                } else {
                    RevealOutcome::Revealed
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    /// Iterative flood fill from a freshly revealed zero-count cell: opens
    /// every connected zero-count cell plus the numbered border. Flagged
    /// cells stop propagation the same way an explicit guard call would.
    fn flood_fill_from(&mut self, origin: Coord2) {
        let mut visited = BTreeSet::from([origin]);
        let mut to_visit: VecDeque<_> = self
            .mine_layout
            .iter_neighbors(origin)
            .filter(|&pos| matches!(self.board[pos.to_nd_index()], CellState::Hidden))
            .collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) {
                continue;
            }

            if matches!(
                self.board[visit_coords.to_nd_index()],
                CellState::Revealed(_) | CellState::Flagged
            ) {
                continue;
            }

            let visit_adjacent_mines = self.mine_layout.adjacent_mine_count(visit_coords);
            self.board[visit_coords.to_nd_index()] = CellState::Revealed(visit_adjacent_mines);
            self.revealed_count += 1;
            log::trace!(
                "Flood revealed {:?}, adjacent mines: {}",
                visit_coords,
                visit_adjacent_mines
            );

            if visit_adjacent_mines == 0 {
                to_visit.extend(
                    self.mine_layout
                        .iter_neighbors(visit_coords)
                        .filter(|&pos| matches!(self.board[pos.to_nd_index()], CellState::Hidden))
                        .filter(|pos| !visited.contains(pos)),
                );
            }
        }
    }

    /// What the presentation should draw at `coords`. While the game is
    /// running this is the board as-is; after it ends every mine is shown,
    /// with the mine that lost the game singled out.
    pub fn display_cell(&self, coords: Coord2) -> DisplayCell {
        let cell = self.board[coords.to_nd_index()];

        if self.state.is_finished() && self.has_mine_at(coords) {
            return if self.triggered_mine == Some(coords) {
                DisplayCell::TriggeredMine
            } else {
                DisplayCell::Mine
            };
        }

        match cell {
            CellState::Hidden => DisplayCell::Hidden,
            CellState::Revealed(count) => DisplayCell::Revealed(count),
            CellState::Flagged => DisplayCell::Flagged,
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }
        self.state = if won { GameState::Won } else { GameState::Lost };
        log::debug!(
            "Game over after {}s: {}",
            self.elapsed_seconds,
            if won { "won" } else { "lost" }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    fn engine(size: Coord2, mines: &[Coord2]) -> GameEngine {
        GameEngine::new(layout(size, mines))
    }

    #[test]
    fn new_engine_is_active_with_full_flag_budget() {
        let engine = engine((10, 10), &[(0, 0), (9, 9)]);
        assert!(engine.is_active());
        assert_eq!(engine.flags_remaining(), 2);
        assert_eq!(engine.revealed_count(), 0);
        assert_eq!(engine.clock(), "00:00");
        assert_eq!(engine.mode(), InputMode::Dig);
    }

    #[test]
    fn reveal_mine_loses_and_records_triggered_cell() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        assert_eq!(engine.reveal((0, 0)), RevealOutcome::HitMine);
        assert_eq!(engine.state(), GameState::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
    }

    #[test]
    fn lost_game_displays_every_mine() {
        let mut engine = engine((3, 3), &[(0, 0), (2, 2)]);

        engine.reveal((0, 0));

        assert_eq!(engine.display_cell((0, 0)), DisplayCell::TriggeredMine);
        assert_eq!(engine.display_cell((2, 2)), DisplayCell::Mine);
        assert_eq!(engine.display_cell((1, 1)), DisplayCell::Hidden);

        // the projection agrees with the layout query it is built from
        for x in 0..3u8 {
            for y in 0..3u8 {
                let shown_as_mine = matches!(
                    engine.display_cell((x, y)),
                    DisplayCell::Mine | DisplayCell::TriggeredMine
                );
                assert_eq!(shown_as_mine, engine.has_mine_at((x, y)));
            }
        }
    }

    #[test]
    fn won_game_also_displays_mines_cosmetically() {
        let mut engine = engine((2, 1), &[(0, 0)]);

        assert_eq!(engine.reveal((1, 0)), RevealOutcome::Won);
        assert_eq!(engine.display_cell((0, 0)), DisplayCell::Mine);
    }

    #[test]
    fn flood_fill_opens_zero_region_up_to_numbered_border() {
        // single mine in a corner: everything else is one zero region
        let mut engine = engine((3, 3), &[(2, 2)]);

        assert_eq!(engine.reveal((0, 0)), RevealOutcome::Won);
        assert_eq!(engine.cell_at((0, 0)), CellState::Revealed(0));
        assert_eq!(engine.cell_at((1, 1)), CellState::Revealed(1));
        assert_eq!(engine.cell_at((2, 2)), CellState::Hidden);
    }

    #[test]
    fn flood_fill_never_reveals_a_mine() {
        let mines = [(4, 4), (5, 4), (4, 5)];
        let mut engine = engine((10, 10), &mines);

        engine.reveal((0, 0));

        assert!(engine.is_active() || engine.state() == GameState::Won);
        for coords in mines {
            assert_eq!(engine.cell_at(coords), CellState::Hidden);
        }
    }

    #[test]
    fn flood_fill_handles_a_fully_connected_ninety_cell_board() {
        // 10 mines packed into one corner block, 90 connected safe cells
        let mines: Vec<Coord2> = (0..2u8)
            .flat_map(|x| (0..5u8).map(move |y| (x, y)))
            .collect();
        let mut engine = engine((10, 10), &mines);

        assert_eq!(engine.reveal((9, 9)), RevealOutcome::Won);
        assert_eq!(engine.revealed_count(), 90);
        assert_eq!(engine.state(), GameState::Won);
    }

    #[test]
    fn flood_fill_stops_at_flagged_cells() {
        // 5x1 strip, one mine far right so there is flag budget to spend
        let mut engine = engine((5, 1), &[(4, 0)]);

        assert_eq!(engine.toggle_flag((2, 0)), FlagOutcome::Changed);
        assert_eq!(engine.reveal((0, 0)), RevealOutcome::Revealed);

        // the flag blocked propagation; cells past it stay hidden
        assert_eq!(engine.cell_at((1, 0)), CellState::Revealed(0));
        assert_eq!(engine.cell_at((2, 0)), CellState::Flagged);
        assert_eq!(engine.cell_at((3, 0)), CellState::Hidden);
    }

    #[test]
    fn revealing_all_safe_cells_wins_in_any_order() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        assert_eq!(engine.reveal((1, 0)), RevealOutcome::Revealed);
        assert_eq!(engine.reveal((0, 1)), RevealOutcome::Revealed);
        assert_eq!(engine.reveal((1, 1)), RevealOutcome::Won);
        assert_eq!(engine.state(), GameState::Won);
    }

    #[test]
    fn reveal_guards_are_silent_noops() {
        let mut engine = engine((2, 2), &[(0, 0)]);

        assert_eq!(engine.reveal((5, 5)), RevealOutcome::NoChange);

        engine.reveal((1, 1));
        assert_eq!(engine.reveal((1, 1)), RevealOutcome::NoChange);

        engine.toggle_flag((0, 1));
        assert_eq!(engine.reveal((0, 1)), RevealOutcome::NoChange);
        assert_eq!(engine.cell_at((0, 1)), CellState::Flagged);
    }

    #[test]
    fn no_actions_after_game_end() {
        let mut engine = engine((2, 2), &[(0, 0)]);
        engine.reveal((0, 0));

        assert_eq!(engine.reveal((1, 1)), RevealOutcome::NoChange);
        assert_eq!(engine.toggle_flag((1, 1)), FlagOutcome::NoChange);
        assert!(!engine.tick());
        assert_eq!(engine.elapsed_seconds(), 0);
    }

    #[test]
    fn flag_budget_stays_within_bounds() {
        let mut engine = engine((3, 3), &[(0, 0), (1, 0)]);

        assert_eq!(engine.toggle_flag((0, 1)), FlagOutcome::Changed);
        assert_eq!(engine.toggle_flag((1, 1)), FlagOutcome::Changed);
        assert_eq!(engine.flags_remaining(), 0);

        // budget exhausted: placement is ignored
        assert_eq!(engine.toggle_flag((2, 2)), FlagOutcome::NoChange);
        assert_eq!(engine.cell_at((2, 2)), CellState::Hidden);

        // removal always succeeds and returns budget
        assert_eq!(engine.toggle_flag((0, 1)), FlagOutcome::Changed);
        assert_eq!(engine.flags_remaining(), 1);
    }

    #[test]
    fn flag_on_revealed_cell_is_a_noop() {
        let mut engine = engine((3, 3), &[(0, 0)]);

        assert_eq!(engine.reveal((1, 1)), RevealOutcome::Revealed);
        let flags_before = engine.flags_remaining();

        assert_eq!(engine.toggle_flag((1, 1)), FlagOutcome::NoChange);
        assert!(engine.is_active());
        assert_eq!(engine.cell_at((1, 1)), CellState::Revealed(1));
        assert_eq!(engine.flags_remaining(), flags_before);
    }

    #[test]
    fn primary_action_follows_mode_and_alternate_always_flags() {
        let mut engine = engine((3, 3), &[(0, 0)]);

        assert_eq!(
            engine.primary_action((1, 1)),
            ActionOutcome::Reveal(RevealOutcome::Revealed)
        );

        engine.set_mode(InputMode::Flag);
        assert_eq!(
            engine.primary_action((0, 1)),
            ActionOutcome::Flag(FlagOutcome::Changed)
        );
        assert_eq!(engine.cell_at((0, 1)), CellState::Flagged);

        // alternate action flags even in dig mode
        engine.set_mode(InputMode::Dig);
        assert_eq!(engine.alternate_action((1, 0)), FlagOutcome::Changed);
        assert_eq!(engine.cell_at((1, 0)), CellState::Flagged);
    }

    #[test]
    fn mode_switch_leaves_the_board_untouched() {
        let mut engine = engine((3, 3), &[(0, 0)]);
        engine.reveal((1, 1));
        let snapshot = engine.clone();

        engine.set_mode(InputMode::Flag);
        engine.set_mode(InputMode::Dig);

        assert_eq!(engine.cell_at((2, 2)), snapshot.cell_at((2, 2)));
        assert_eq!(engine.revealed_count(), snapshot.revealed_count());
        assert_eq!(engine.flags_remaining(), snapshot.flags_remaining());
    }

    #[test]
    fn tick_counts_only_while_active() {
        let mut engine = engine((2, 1), &[(0, 0)]);

        assert!(engine.tick());
        assert!(engine.tick());
        assert_eq!(engine.elapsed_seconds(), 2);

        engine.reveal((1, 0)); // wins
        assert!(!engine.tick());
        assert_eq!(engine.elapsed_seconds(), 2);
    }

    #[test]
    fn clock_is_zero_padded_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(3600), "60:00");
    }
}
