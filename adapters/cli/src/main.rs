#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a Life Board through its state handle.

mod board_transfer;
mod config;

use std::{io, path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use life_board_core::{Action, CellCoord};
use life_board_engine::EdgeRule;
use life_board_rendering::{Presenter, Scene, TextPresenter};
use life_board_state::{GameStateHandle, GameStateProvider};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{board_transfer::BoardSnapshot, config::Config};

#[derive(Debug, Parser)]
#[command(name = "life-board", version, about = "Runs a Game of Life board in the terminal")]
struct CliArgs {
    /// TOML configuration file; command-line flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of board columns.
    #[arg(long)]
    width: Option<u32>,
    /// Number of board rows.
    #[arg(long)]
    height: Option<u32>,
    /// Number of generations to advance.
    #[arg(long)]
    ticks: Option<u64>,
    /// Seed for the random starting population.
    #[arg(long)]
    seed: Option<u64>,
    /// Probability of a cell starting alive when seeded.
    #[arg(long)]
    density: Option<f64>,
    /// Edge handling: `dead` or `wrap`.
    #[arg(long, value_parser = parse_edges)]
    edges: Option<EdgeRule>,
    /// Cell to invert before the first generation, as `X,Y`. Repeatable.
    #[arg(long = "toggle", value_parser = parse_cell)]
    toggles: Vec<CellCoord>,
    /// Board transfer string to start from instead of a fresh board.
    ///
    /// The string carries its own dimensions and live cells, so board size
    /// and seeding flags cannot be combined with it.
    #[arg(long, conflicts_with_all = ["width", "height", "seed", "density"])]
    load: Option<String>,
    /// Print the final board as a transfer string.
    #[arg(long)]
    export: bool,
    /// Delay between generations in milliseconds.
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Glyph drawn for live cells.
    #[arg(long)]
    alive: Option<char>,
    /// Glyph drawn for dead cells.
    #[arg(long)]
    dead: Option<char>,
}

impl CliArgs {
    fn settings(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(width) = self.width {
            config.board.width = width;
        }
        if let Some(height) = self.height {
            config.board.height = height;
        }
        if let Some(ticks) = self.ticks {
            config.run.ticks = ticks;
        }
        if let Some(seed) = self.seed {
            config.engine.seed = Some(seed);
        }
        if let Some(density) = self.density {
            config.engine.density = density;
        }
        if let Some(edges) = self.edges {
            config.engine.edges = edges;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.run.interval_ms = interval_ms;
        }
        if let Some(alive) = self.alive {
            config.render.alive = alive;
        }
        if let Some(dead) = self.dead {
            config.render.dead = dead;
        }

        Ok(config)
    }
}

fn parse_edges(value: &str) -> Result<EdgeRule, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "dead" => Ok(EdgeRule::Dead),
        "wrap" => Ok(EdgeRule::Wrap),
        other => Err(format!("unknown edge rule '{other}', expected dead or wrap")),
    }
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("cell '{value}' must be written as X,Y"))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column in '{value}': {error}"))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row in '{value}': {error}"))?;
    Ok(CellCoord::new(x, y))
}

/// Entry point for the Life Board command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let mut config = args.settings()?;
    let snapshot = args
        .load
        .as_deref()
        .map(BoardSnapshot::decode)
        .transpose()
        .context("failed to load board transfer string")?;
    if let Some(snapshot) = &snapshot {
        let configured = (config.board.width, config.board.height);
        if args.config.is_some() && configured != (snapshot.width, snapshot.height) {
            warn!(
                configured_width = config.board.width,
                configured_height = config.board.height,
                width = snapshot.width,
                height = snapshot.height,
                "configured board size ignored, using the loaded board"
            );
        }
        if let Some(seed) = config.engine.seed.take() {
            // Loaded boards are reproduced cell by cell on top of an empty board.
            warn!(seed, "configured seed ignored, using the loaded board");
        }
    }

    let provider = GameStateProvider::new(config.engine.build());
    let handle = provider.handle();
    let _ = handle.subscribe(|state, event| {
        debug!(
            ?event,
            tick = state.tick(),
            population = state.cells().population(),
            "board event"
        );
    })?;

    let mut presenter = TextPresenter::new(io::stdout().lock(), config.render.glyphs()?);
    let start = Start {
        snapshot,
        toggles: &args.toggles,
    };
    run(&handle, &config, start, &mut presenter)?;

    if args.export {
        let state = handle.state()?;
        println!("{}", BoardSnapshot::capture(&state).encode()?);
    }
    Ok(())
}

struct Start<'a> {
    snapshot: Option<BoardSnapshot>,
    toggles: &'a [CellCoord],
}

fn run<P: Presenter>(
    handle: &GameStateHandle,
    config: &Config,
    start: Start<'_>,
    presenter: &mut P,
) -> Result<()> {
    let (width, height, live) = match start.snapshot {
        Some(snapshot) => (snapshot.width, snapshot.height, snapshot.live),
        None => (config.board.width, config.board.height, Vec::new()),
    };
    handle
        .dispatch(Action::Init { width, height })
        .with_context(|| format!("failed to initiate a {width}x{height} board"))?;
    info!(width, height, "board initiated");

    for cell in live.iter().chain(start.toggles) {
        handle
            .dispatch(Action::Click {
                idx: cell.x(),
                idy: cell.y(),
            })
            .with_context(|| format!("failed to toggle cell {cell}"))?;
    }

    present(handle, presenter)?;
    let interval = Duration::from_millis(config.run.interval_ms);
    for _ in 0..config.run.ticks {
        if !interval.is_zero() {
            thread::sleep(interval);
        }
        handle.dispatch(Action::Tick).context("failed to advance the board")?;
        present(handle, presenter)?;
    }

    let state = handle.state()?;
    info!(
        tick = state.tick(),
        population = state.cells().population(),
        "run finished"
    );
    Ok(())
}

fn present<P: Presenter>(handle: &GameStateHandle, presenter: &mut P) -> Result<()> {
    let state = handle.state()?;
    presenter.present(&Scene::new(state.tick(), state.cells().clone()))
}
