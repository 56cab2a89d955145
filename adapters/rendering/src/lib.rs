#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Life Board adapters.

use std::{error::Error, fmt, io::Write};

use anyhow::{Context, Result as AnyResult};
use life_board_core::{CellCoord, Grid};

/// Characters used to draw live and dead cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    alive: char,
    dead: char,
}

impl Glyphs {
    /// Creates a glyph pair, rejecting pairs that cannot be told apart.
    pub fn new(alive: char, dead: char) -> Result<Self, RenderingError> {
        if alive == dead {
            return Err(RenderingError::IndistinctGlyphs { glyph: alive });
        }
        for glyph in [alive, dead] {
            if glyph.is_control() {
                return Err(RenderingError::ControlGlyph { glyph });
            }
        }
        Ok(Self { alive, dead })
    }

    /// Glyph drawn for a live cell.
    #[must_use]
    pub const fn alive(&self) -> char {
        self.alive
    }

    /// Glyph drawn for a dead cell.
    #[must_use]
    pub const fn dead(&self) -> char {
        self.dead
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            alive: '#',
            dead: '.',
        }
    }
}

/// Board snapshot prepared for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    tick: u64,
    population: usize,
    cells: Grid,
}

impl Scene {
    /// Captures a scene for the provided generation and cells.
    #[must_use]
    pub fn new(tick: u64, cells: Grid) -> Self {
        Self {
            tick,
            population: cells.population(),
            cells,
        }
    }

    /// Generation counter of the captured board.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of live cells on the captured board.
    #[must_use]
    pub const fn population(&self) -> usize {
        self.population
    }

    /// Cells of the captured board.
    #[must_use]
    pub const fn cells(&self) -> &Grid {
        &self.cells
    }
}

/// Draws the scene as text, one line per board row, top row first.
#[must_use]
pub fn render_text(scene: &Scene, glyphs: Glyphs) -> String {
    let (width, height) = scene.cells.dimensions();
    let capacity = (width as usize + 1) * height as usize;
    let mut text = String::with_capacity(capacity);
    for y in 0..height {
        for x in 0..width {
            let alive = scene.cells.get(CellCoord::new(x, y)).unwrap_or(false);
            text.push(if alive { glyphs.alive } else { glyphs.dead });
        }
        text.push('\n');
    }
    text
}

/// Sink that displays successive scenes.
pub trait Presenter {
    /// Presents a single scene.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Presenter that writes text frames to any [`Write`] implementation.
#[derive(Debug)]
pub struct TextPresenter<W> {
    out: W,
    glyphs: Glyphs,
}

impl<W: Write> TextPresenter<W> {
    /// Creates a presenter writing to `out` with the provided glyphs.
    #[must_use]
    pub fn new(out: W, glyphs: Glyphs) -> Self {
        Self { out, glyphs }
    }

    /// Consumes the presenter, returning the underlying writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        let frame = render_text(scene, self.glyphs);
        write!(
            self.out,
            "generation {} population {}\n{frame}\n",
            scene.tick, scene.population
        )
        .context("failed to write text frame")?;
        self.out.flush().context("failed to flush text frame")
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Live and dead cells would be drawn with the same glyph.
    IndistinctGlyphs {
        /// Glyph supplied for both states.
        glyph: char,
    },
    /// A glyph would corrupt the line layout of a frame.
    ControlGlyph {
        /// Offending glyph.
        glyph: char,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndistinctGlyphs { glyph } => {
                write!(f, "live and dead cells both use glyph {glyph:?}")
            }
            Self::ControlGlyph { glyph } => {
                write!(f, "glyph {glyph:?} is a control character")
            }
        }
    }
}

impl Error for RenderingError {}
