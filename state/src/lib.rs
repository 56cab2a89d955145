#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Life Board.
//!
//! [`reduce`] is the only path by which a [`BoardState`] changes: it maps the
//! current state and an [`Action`] to a brand new state, consulting an
//! [`Engine`] for board creation and generation advances. The
//! [`GameStateProvider`] owns one state per scope and serializes dispatch
//! through the reducer, while [`GameStateHandle`] is the explicit accessor
//! threaded to every consumer.

mod store;

pub use store::{GameStateHandle, GameStateProvider, StoreError, SubscriptionId};

use life_board_core::{Action, BoardInput, CellCoord, Engine, Event, Grid, GridError};

/// Snapshot of the board: generation counter, dimensions and cells.
///
/// Whenever `width` and `height` are both non-zero, `cells` holds exactly
/// `width` columns of `height` cells each.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BoardState {
    tick: u64,
    width: u32,
    height: u32,
    cells: Grid,
}

impl BoardState {
    /// Number of generations advanced since the board was created.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of columns on the board.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows on the board.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cells of the board indexed `[x][y]`.
    #[must_use]
    pub const fn cells(&self) -> &Grid {
        &self.cells
    }
}

/// State every provider starts from and every reset returns to.
#[must_use]
pub const fn initial_state() -> BoardState {
    BoardState {
        tick: 0,
        width: 0,
        height: 0,
        cells: Grid::empty(),
    }
}

/// Errors raised when an action cannot be applied to the board.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReducerError {
    /// An initialization request carried a zero width or height.
    #[error("width and height must be provided")]
    MissingDimensions,
    /// A click addressed a cell outside the board.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// The engine produced a board whose size differs from the request.
    #[error("engine produced a {found_width}x{found_height} board, expected {width}x{height}")]
    EngineDimensionMismatch {
        /// Expected number of columns.
        width: u32,
        /// Expected number of rows.
        height: u32,
        /// Number of columns the engine produced.
        found_width: u32,
        /// Number of rows the engine produced.
        found_height: u32,
    },
}

/// Computes the state that follows `state` once `action` is applied.
///
/// The input is never modified. A click shares every untouched column of the
/// previous board with the returned one and copies only the toggled column.
pub fn reduce<E>(engine: &E, state: &BoardState, action: Action) -> Result<BoardState, ReducerError>
where
    E: Engine + ?Sized,
{
    match action {
        Action::Init { width, height } => {
            if width == 0 || height == 0 {
                return Err(ReducerError::MissingDimensions);
            }
            let cells = engine.initiate_board(width, height);
            ensure_dimensions(&cells, width, height)?;
            Ok(BoardState {
                tick: state.tick,
                width,
                height,
                cells,
            })
        }
        Action::Click { idx, idy } => {
            let cells = state.cells.toggled(CellCoord::new(idx, idy))?;
            Ok(BoardState {
                tick: state.tick,
                width: state.width,
                height: state.height,
                cells,
            })
        }
        Action::Tick => {
            let cells = engine.tick(BoardInput {
                width: state.width,
                height: state.height,
                cells: &state.cells,
            });
            ensure_dimensions(&cells, state.width, state.height)?;
            Ok(BoardState {
                tick: state.tick.saturating_add(1),
                width: state.width,
                height: state.height,
                cells,
            })
        }
        Action::Reset => Ok(initial_state()),
    }
}

/// Reduces `action` and reports the resulting transition as an [`Event`].
pub fn apply<E>(
    engine: &E,
    state: &BoardState,
    action: Action,
    out_events: &mut Vec<Event>,
) -> Result<BoardState, ReducerError>
where
    E: Engine + ?Sized,
{
    let next = reduce(engine, state, action)?;
    let event = match action {
        Action::Init { width, height } => Event::BoardInitialized { width, height },
        Action::Click { idx, idy } => {
            let cell = CellCoord::new(idx, idy);
            Event::CellToggled {
                cell,
                alive: next.cells.get(cell).unwrap_or(false),
            }
        }
        Action::Tick => Event::TimeAdvanced { tick: next.tick },
        Action::Reset => Event::BoardReset,
    };
    out_events.push(event);
    Ok(next)
}

fn ensure_dimensions(cells: &Grid, width: u32, height: u32) -> Result<(), ReducerError> {
    let (found_width, found_height) = cells.dimensions();
    // An empty grid reports zero height regardless of the requested rows.
    let matches = found_width == width && (width == 0 || found_height == height);
    if matches {
        Ok(())
    } else {
        Err(ReducerError::EngineDimensionMismatch {
            width,
            height,
            found_width,
            found_height,
        })
    }
}
