#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Life Board workspace.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative board state, and the simulation engine. Adapters submit
//! [`Action`] values describing desired transitions, the state crate reduces
//! them into a new board through an [`Engine`], and then broadcasts [`Event`]
//! values so observers can react. Boards are stored as copy-on-write [`Grid`]
//! values so that successive states share every column they did not touch.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Location of a single board cell expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Two-dimensional boolean board indexed `[x][y]`.
///
/// The outer dimension holds one buffer per column and every column holds one
/// flag per row. Columns are reference counted: cloning a grid only clones the
/// column pointers, and writing a cell clones exactly the column that contains
/// it when that column is shared with another grid. Sibling columns are never
/// copied, so a toggle costs one column rather than the whole board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<bool>>", into = "Vec<Vec<bool>>")]
pub struct Grid {
    columns: Vec<Arc<Vec<bool>>>,
}

impl Grid {
    /// Creates an empty grid with no columns.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Creates a grid of the provided size with every cell dead.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_| false)
    }

    /// Creates a grid of the provided size whose cells are produced by `cell`.
    ///
    /// The closure is invoked column by column, visiting rows in increasing
    /// order within each column.
    #[must_use]
    pub fn from_fn<F>(width: u32, height: u32, mut cell: F) -> Self
    where
        F: FnMut(CellCoord) -> bool,
    {
        let columns = (0..width)
            .map(|x| {
                let column: Vec<bool> = (0..height).map(|y| cell(CellCoord::new(x, y))).collect();
                Arc::new(column)
            })
            .collect();
        Self { columns }
    }

    /// Builds a grid from explicit columns, rejecting ragged input.
    pub fn from_columns(columns: Vec<Vec<bool>>) -> Result<Self, GridError> {
        let expected = columns.first().map_or(0, Vec::len);
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != expected)
        {
            return Err(GridError::Ragged {
                column: index,
                expected,
                found: column.len(),
            });
        }
        if u32::try_from(columns.len()).is_err() || u32::try_from(expected).is_err() {
            return Err(GridError::TooLarge);
        }

        Ok(Self {
            columns: columns.into_iter().map(Arc::new).collect(),
        })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub fn width(&self) -> u32 {
        u32::try_from(self.columns.len()).unwrap_or(u32::MAX)
    }

    /// Number of rows contained in every column of the grid.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.columns
            .first()
            .map_or(0, |column| u32::try_from(column.len()).unwrap_or(u32::MAX))
    }

    /// Provides the grid dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Reports whether the grid contains no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|column| column.is_empty())
    }

    /// Returns the state of the provided cell, or `None` when it lies off the board.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<bool> {
        let column = self.columns.get(usize::try_from(cell.x()).ok()?)?;
        column.get(usize::try_from(cell.y()).ok()?).copied()
    }

    /// Returns the cells of a single column.
    #[must_use]
    pub fn column(&self, x: u32) -> Option<&[bool]> {
        let column = self.columns.get(usize::try_from(x).ok()?)?;
        Some(column.as_slice())
    }

    /// Writes the provided cell, cloning its column first if it is shared.
    pub fn set(&mut self, cell: CellCoord, alive: bool) -> Result<(), GridError> {
        let (width, height) = self.dimensions();
        if cell.x() >= width || cell.y() >= height {
            return Err(GridError::OutOfBounds {
                cell,
                width,
                height,
            });
        }
        let (Ok(x), Ok(y)) = (usize::try_from(cell.x()), usize::try_from(cell.y())) else {
            return Err(GridError::TooLarge);
        };
        Arc::make_mut(&mut self.columns[x])[y] = alive;
        Ok(())
    }

    /// Produces a new grid with the provided cell inverted.
    ///
    /// Only the column containing `cell` is copied; every other column of the
    /// returned grid is shared with `self`.
    pub fn toggled(&self, cell: CellCoord) -> Result<Self, GridError> {
        let current = self.get(cell).ok_or(GridError::OutOfBounds {
            cell,
            width: self.width(),
            height: self.height(),
        })?;
        let mut next = self.clone();
        next.set(cell, !current)?;
        Ok(next)
    }

    /// Reports whether column `x` is backed by the same buffer in both grids.
    #[must_use]
    pub fn shares_column_with(&self, other: &Grid, x: u32) -> bool {
        let Ok(index) = usize::try_from(x) else {
            return false;
        };
        match (self.columns.get(index), other.columns.get(index)) {
            (Some(left), Some(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Counts the live cells on the board.
    #[must_use]
    pub fn population(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.iter().filter(|alive| **alive).count())
            .sum()
    }

    /// Iterates over the coordinates of live cells in column-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.columns.iter().zip(0u32..).flat_map(|(column, x)| {
            column
                .iter()
                .zip(0u32..)
                .filter(|(alive, _)| **alive)
                .map(move |(_, y)| CellCoord::new(x, y))
        })
    }
}

impl TryFrom<Vec<Vec<bool>>> for Grid {
    type Error = GridError;

    fn try_from(columns: Vec<Vec<bool>>) -> Result<Self, Self::Error> {
        Self::from_columns(columns)
    }
}

impl From<Grid> for Vec<Vec<bool>> {
    fn from(grid: Grid) -> Self {
        grid.columns
            .into_iter()
            .map(|column| Arc::try_unwrap(column).unwrap_or_else(|shared| (*shared).clone()))
            .collect()
    }
}

/// Errors raised by grid construction and cell access.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The requested cell lies outside the board.
    #[error("cell {cell} is outside the {width}x{height} board")]
    OutOfBounds {
        /// Cell that was addressed.
        cell: CellCoord,
        /// Width of the addressed board.
        width: u32,
        /// Height of the addressed board.
        height: u32,
    },
    /// Columns of differing lengths were supplied.
    #[error("column {column} holds {found} cells, expected {expected}")]
    Ragged {
        /// Index of the first offending column.
        column: usize,
        /// Length shared by the first column.
        expected: usize,
        /// Length of the offending column.
        found: usize,
    },
    /// The supplied columns exceed the addressable board size.
    #[error("board dimensions exceed u32::MAX")]
    TooLarge,
}

/// Board description handed to an [`Engine`] when advancing a generation.
#[derive(Clone, Copy, Debug)]
pub struct BoardInput<'a> {
    /// Number of columns on the board.
    pub width: u32,
    /// Number of rows on the board.
    pub height: u32,
    /// Current cells of the board.
    pub cells: &'a Grid,
}

/// Simulation core that creates boards and computes their transitions.
///
/// Implementations must be pure and deterministic, and `tick` must return a
/// grid with the same dimensions as its input.
pub trait Engine {
    /// Produces the starting board for the provided dimensions.
    fn initiate_board(&self, width: u32, height: u32) -> Grid;

    /// Computes the next generation of the provided board.
    fn tick(&self, input: BoardInput<'_>) -> Grid;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn initiate_board(&self, width: u32, height: u32) -> Grid {
        (**self).initiate_board(width, height)
    }

    fn tick(&self, input: BoardInput<'_>) -> Grid {
        (**self).tick(input)
    }
}

/// Actions that express all permissible board transitions.
///
/// The JSON wire form is adjacently tagged, for example
/// `{"type":"click","payload":{"idx":2,"idy":3}}` or `{"type":"tick"}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum Action {
    /// Replaces the board with a freshly initiated one of the given size.
    Init {
        /// Number of columns on the new board.
        width: u32,
        /// Number of rows on the new board.
        height: u32,
    },
    /// Inverts a single cell.
    Click {
        /// Column of the cell to invert.
        idx: u32,
        /// Row of the cell to invert.
        idy: u32,
    },
    /// Advances the simulation by one generation.
    Tick,
    /// Restores the initial, empty state.
    Reset,
}

impl Action {
    /// Wire tag identifying the action variant.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Click { .. } => "click",
            Self::Tick => "tick",
            Self::Reset => "reset",
        }
    }

    /// Encodes the action into its JSON wire form.
    pub fn to_json(&self) -> Result<String, ActionError> {
        serde_json::to_string(self).map_err(ActionError::Malformed)
    }
}

#[derive(Deserialize)]
struct WireAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<Value>,
}

#[derive(Deserialize)]
struct InitPayload {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
struct ClickPayload {
    idx: Option<u32>,
    idy: Option<u32>,
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let wire: WireAction = serde_json::from_str(text).map_err(ActionError::Malformed)?;
        let payload = match wire.payload {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(payload) => payload,
        };

        match wire.kind.as_str() {
            "init" => {
                let InitPayload { width, height } =
                    serde_json::from_value(payload).map_err(ActionError::Malformed)?;
                match (width, height) {
                    (Some(width), Some(height)) if width != 0 && height != 0 => {
                        Ok(Self::Init { width, height })
                    }
                    _ => Err(ActionError::MissingDimensions),
                }
            }
            "click" => {
                let ClickPayload { idx, idy } =
                    serde_json::from_value(payload).map_err(ActionError::Malformed)?;
                match (idx, idy) {
                    (Some(idx), Some(idy)) => Ok(Self::Click { idx, idy }),
                    _ => Err(ActionError::MissingCoordinates),
                }
            }
            "tick" => Ok(Self::Tick),
            "reset" => Ok(Self::Reset),
            _ => Err(ActionError::UnhandledActionType(wire.kind)),
        }
    }
}

/// Errors raised while decoding actions from their wire form.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// An `init` action lacked a non-zero width or height.
    #[error("width and height must be provided")]
    MissingDimensions,
    /// A `click` action lacked one of its coordinates.
    #[error("idx and idy must be provided")]
    MissingCoordinates,
    /// The action tag does not name a known transition.
    #[error("Unhandled action type: {0}")]
    UnhandledActionType(String),
    /// The text was not a well-formed action document.
    #[error("malformed action: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Events broadcast after an action has been applied to the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new board was initiated.
    BoardInitialized {
        /// Number of columns on the new board.
        width: u32,
        /// Number of rows on the new board.
        height: u32,
    },
    /// Confirms that a single cell was inverted.
    CellToggled {
        /// Cell that changed.
        cell: CellCoord,
        /// State of the cell after the toggle.
        alive: bool,
    },
    /// Indicates that the simulation advanced one generation.
    TimeAdvanced {
        /// Generation counter after advancing.
        tick: u64,
    },
    /// Announces that the board returned to its initial state.
    BoardReset,
}
