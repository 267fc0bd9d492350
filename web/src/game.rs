use clap::Args;
use gloo::timers::callback::{Interval, Timeout};
use minegrid_core as game;
use yew::prelude::*;

use crate::utils::js_random_seed;

/// Delay between showing the end-of-game board (mines revealed) and tearing
/// the game panel down. Gives the final render time to land before the
/// start overlay comes back.
const TEARDOWN_DELAY_MS: u32 = 400;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Start,
    SetMode(game::InputMode),
    Primary(game::Coord2),
    Alternate(game::Coord2),
    Tick,
    Teardown,
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,
}

fn end_message(state: game::GameState) -> Option<&'static str> {
    match state {
        game::GameState::Active => None,
        game::GameState::Won => Some("🏆 You Win!"),
        game::GameState::Lost => Some("💥 Game Over!"),
    }
}

fn cell_classes(cell: game::DisplayCell, locked: bool) -> Classes {
    use game::DisplayCell::*;

    let mut class = classes!(
        "cell",
        match cell {
            Hidden => classes!(),
            Revealed(count) => classes!("revealed", format!("num-{}", count)),
            Flagged => classes!("flag"),
            Mine => classes!("revealed", "mine"),
            TriggeredMine => classes!("revealed", "mine", "oops"),
        }
    );
    if locked {
        class.push("locked");
    }
    class
}

fn cell_text(cell: game::DisplayCell) -> Option<String> {
    use game::DisplayCell::*;

    match cell {
        Hidden | Revealed(0) => None,
        Revealed(count) => Some(count.to_string()),
        Flagged => Some("🚩".to_string()),
        Mine | TriggeredMine => Some("💣".to_string()),
    }
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    x: game::Coord,
    y: game::Coord,
    cell: game::DisplayCell,
    #[prop_or_default]
    locked: bool,
    callback: Callback<Msg>,
}

#[function_component(CellView)]
fn cell_component(props: &CellProps) -> Html {
    let CellProps {
        x,
        y,
        cell,
        locked,
        callback,
    } = props.clone();

    let class = cell_classes(cell, locked);
    let text = cell_text(cell);

    let onclick = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            log::trace!("({}, {}) primary", x, y);
            callback.emit(Msg::Primary((x, y)));
        })
    };

    let oncontextmenu = {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            log::trace!("({}, {}) alternate", x, y);
            callback.emit(Msg::Alternate((x, y)));
        })
    };

    html! {
        <td {class} {onclick} {oncontextmenu}>{text}</td>
    }
}

/// Thin adapter between the engine and the DOM: renders the engine's read
/// projection, feeds pointer events back in, and owns the two timers (the
/// 1s clock interval and the deferred teardown).
pub(crate) struct GameView {
    engine: Option<game::GameEngine>,
    mode: game::InputMode,
    seed: u64,
    timer: Option<Interval>,
}

/// Builds the engine for a fresh game: classic board, seeded layout, and
/// the mode remembered from the previous game applied to the new session.
fn create_engine(seed: u64, mode: game::InputMode) -> game::GameEngine {
    use game::MinefieldGenerator;

    let mine_layout =
        game::RandomMinefieldGenerator::new(seed).generate(game::GameConfig::classic());
    let mut engine = game::GameEngine::new(mine_layout);
    engine.set_mode(mode);
    engine
}

impl GameView {
    fn start_game(&mut self, ctx: &Context<Self>) {
        log::debug!("New game, seed {}", self.seed);
        self.engine = Some(create_engine(self.seed, self.mode));

        // idempotent restart: dropping the previous interval cancels it
        let link = ctx.link().clone();
        self.timer = Some(Interval::new(1000, move || link.send_message(Msg::Tick)));
    }

    /// Stops the clock and schedules the fire-and-forget teardown. The final
    /// board (all mines shown) stays on screen for the delay, then the
    /// message is presented and the panel collapses back to the overlay.
    fn finish_game(&mut self, ctx: &Context<Self>) {
        // a second call during the teardown window must not re-schedule
        if self.timer.is_none() {
            return;
        }
        let Some(state) = self.engine.as_ref().map(|engine| engine.state()) else {
            return;
        };
        let Some(message) = end_message(state) else {
            return;
        };

        self.timer = None;

        let link = ctx.link().clone();
        Timeout::new(TEARDOWN_DELAY_MS, move || {
            gloo::dialogs::alert(message);
            link.send_message(Msg::Teardown);
        })
        .forget();
    }

    fn flags_remaining(&self) -> game::CellCount {
        self.engine
            .as_ref()
            .map_or(game::GameConfig::classic().mines, |engine| {
                engine.flags_remaining()
            })
    }

    fn clock(&self) -> String {
        self.engine
            .as_ref()
            .map_or_else(|| game::format_clock(0), |engine| engine.clock())
    }

    fn mode_button(&self, ctx: &Context<Self>, mode: game::InputMode, label: &str) -> Html {
        let active = self.mode == mode;
        let onclick = ctx.link().callback(move |_| Msg::SetMode(mode));
        html! {
            <button class={classes!(active.then_some("active-btn"))} {onclick}>{label}</button>
        }
    }

    fn view_board(&self, ctx: &Context<Self>, engine: &game::GameEngine) -> Html {
        let (cols, rows) = engine.size();
        let locked = engine.is_finished();
        let callback = ctx.link().callback(|msg| msg);

        html! {
            <table class="minesweeper-board">
                {
                    for (0..rows).map(|y| html! {
                        <tr>
                            {
                                for (0..cols).map(|x| {
                                    let cell = engine.display_cell((x, y));
                                    let callback = callback.clone();
                                    html! {
                                        <CellView {x} {y} {cell} {locked} {callback}/>
                                    }
                                })
                            }
                        </tr>
                    })
                }
            </table>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            engine: None,
            mode: Default::default(),
            seed: ctx.props().seed.unwrap_or_else(js_random_seed),
            timer: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Start => {
                self.start_game(ctx);
                true
            }
            SetMode(mode) => {
                if self.mode == mode {
                    return false;
                }
                self.mode = mode;
                if let Some(engine) = self.engine.as_mut() {
                    engine.set_mode(mode);
                }
                true
            }
            Primary(pos) => {
                let Some(engine) = self.engine.as_mut() else {
                    return false;
                };
                log::debug!("primary action at {:?}", pos);
                let updated = engine.primary_action(pos).has_update();
                if engine.is_finished() {
                    self.finish_game(ctx);
                }
                updated
            }
            Alternate(pos) => {
                let Some(engine) = self.engine.as_mut() else {
                    return false;
                };
                log::debug!("alternate action at {:?}", pos);
                engine.alternate_action(pos).has_update()
            }
            Tick => self
                .engine
                .as_mut()
                .map_or(false, |engine| engine.tick()),
            Teardown => {
                // board cleared, fresh seed for the next game, mode kept
                self.engine = None;
                self.timer = None;
                self.seed = js_random_seed();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use game::InputMode::*;
        use Msg::*;

        let Some(engine) = self.engine.as_ref() else {
            let onclick = ctx.link().callback(|_| Start);
            return html! {
                <div class="minesweeper-overlay">
                    <button {onclick}>{"Start Game"}</button>
                </div>
            };
        };

        let oncontextmenu = Callback::from(move |e: MouseEvent| e.prevent_default());

        html! {
            <div class="minesweeper-ui" {oncontextmenu}>
                <nav>
                    <aside class="mine-count">{self.flags_remaining()}</aside>
                    <span>
                        {self.mode_button(ctx, Dig, "⛏ Dig")}
                        {self.mode_button(ctx, Flag, "🚩 Flag")}
                    </span>
                    <aside class="minesweeper-timer">{self.clock()}</aside>
                </nav>
                {self.view_board(ctx, engine)}
            </div>
        }
    }
}
