#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure Conway engine that initiates boards and advances generations.

use life_board_core::{BoardInput, CellCoord, Engine, Grid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const NEIGHBOUR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Describes how neighbours are resolved beyond the board edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRule {
    /// Cells beyond the edge are permanently dead.
    #[default]
    Dead,
    /// The board wraps around both axes like a torus.
    Wrap,
}

/// Deterministic random population applied when a board is initiated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Seeding {
    seed: u64,
    density: f64,
}

impl Seeding {
    /// Creates a seeding descriptor.
    ///
    /// `density` is the probability of a cell starting alive. Values outside
    /// `0.0..=1.0` are clamped and non-finite values are treated as zero.
    #[must_use]
    pub fn new(seed: u64, density: f64) -> Self {
        let density = if density.is_finite() {
            density.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { seed, density }
    }

    /// Seed fed into the random number generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Probability that a cell starts alive.
    #[must_use]
    pub const fn density(&self) -> f64 {
        self.density
    }
}

/// Conway's Game of Life (birth on three neighbours, survival on two or three).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Conway {
    edges: EdgeRule,
    seeding: Option<Seeding>,
}

impl Conway {
    /// Creates an engine with dead edges and empty starting boards.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edges: EdgeRule::Dead,
            seeding: None,
        }
    }

    /// Returns a copy of the engine using the provided edge rule.
    #[must_use]
    pub const fn with_edges(mut self, edges: EdgeRule) -> Self {
        self.edges = edges;
        self
    }

    /// Returns a copy of the engine that populates new boards randomly.
    #[must_use]
    pub const fn with_seeding(mut self, seeding: Seeding) -> Self {
        self.seeding = Some(seeding);
        self
    }

    /// Edge rule applied while counting neighbours.
    #[must_use]
    pub const fn edges(&self) -> EdgeRule {
        self.edges
    }

    /// Seeding applied when boards are initiated, if any.
    #[must_use]
    pub const fn seeding(&self) -> Option<Seeding> {
        self.seeding
    }

    fn live_neighbours(&self, input: &BoardInput<'_>, cell: CellCoord) -> u8 {
        let width = i64::from(input.width);
        let height = i64::from(input.height);
        let x = i64::from(cell.x());
        let y = i64::from(cell.y());

        // Narrow wrapped boards resolve several offsets onto one cell.
        let mut distinct: [Option<CellCoord>; 8] = [None; 8];
        let mut count = 0;
        for (slot, (dx, dy)) in NEIGHBOUR_OFFSETS.into_iter().enumerate() {
            let Some(neighbour) = self.resolve(x + dx, y + dy, width, height) else {
                continue;
            };
            if neighbour == cell || distinct[..slot].contains(&Some(neighbour)) {
                continue;
            }
            distinct[slot] = Some(neighbour);
            if input.cells.get(neighbour) == Some(true) {
                count += 1;
            }
        }
        count
    }

    fn resolve(&self, x: i64, y: i64, width: i64, height: i64) -> Option<CellCoord> {
        let (x, y) = match self.edges {
            EdgeRule::Dead => {
                if !(0..width).contains(&x) || !(0..height).contains(&y) {
                    return None;
                }
                (x, y)
            }
            EdgeRule::Wrap => (x.rem_euclid(width), y.rem_euclid(height)),
        };
        Some(CellCoord::new(
            u32::try_from(x).ok()?,
            u32::try_from(y).ok()?,
        ))
    }
}

impl Engine for Conway {
    fn initiate_board(&self, width: u32, height: u32) -> Grid {
        match self.seeding {
            None => Grid::new(width, height),
            Some(seeding) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seeding.seed);
                Grid::from_fn(width, height, |_| rng.gen_bool(seeding.density))
            }
        }
    }

    fn tick(&self, input: BoardInput<'_>) -> Grid {
        if input.width == 0 || input.height == 0 {
            return Grid::new(input.width, input.height);
        }

        Grid::from_fn(input.width, input.height, |cell| {
            let alive = input.cells.get(cell) == Some(true);
            matches!(
                (alive, self.live_neighbours(&input, cell)),
                (true, 2) | (_, 3)
            )
        })
    }
}
