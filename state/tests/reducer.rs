use life_board_core::{Action, BoardInput, CellCoord, Engine, Event, Grid, GridError};
use life_board_engine::{Conway, Seeding};
use life_board_state::{apply, initial_state, reduce, BoardState, ReducerError};

fn initiated(engine: &dyn Engine, width: u32, height: u32) -> BoardState {
    reduce(engine, &initial_state(), Action::Init { width, height }).expect("valid dimensions")
}

#[test]
fn init_adopts_engine_board() {
    let engine = Conway::new().with_seeding(Seeding::new(7, 0.5));
    let state = initiated(&engine, 12, 5);

    assert_eq!(state.width(), 12);
    assert_eq!(state.height(), 5);
    assert_eq!(state.cells().dimensions(), (12, 5));
    assert_eq!(
        *state.cells(),
        engine.initiate_board(12, 5),
        "cells must come from the engine initializer",
    );
    assert_eq!(state.tick(), 0);
}

#[test]
fn init_preserves_the_tick_counter() {
    let engine = Conway::new();
    let mut state = initiated(&engine, 3, 3);
    for _ in 0..3 {
        state = reduce(&engine, &state, Action::Tick).expect("tick applies");
    }

    let resized = reduce(
        &engine,
        &state,
        Action::Init {
            width: 6,
            height: 2,
        },
    )
    .expect("valid dimensions");

    assert_eq!(resized.tick(), 3);
    assert_eq!(resized.cells().dimensions(), (6, 2));
}

#[test]
fn init_rejects_zero_dimensions() {
    let engine = Conway::new();
    for (width, height) in [(0, 5), (5, 0), (0, 0)] {
        let error = reduce(&engine, &initial_state(), Action::Init { width, height })
            .expect_err("zero dimension must be rejected");
        assert_eq!(error, ReducerError::MissingDimensions);
        assert_eq!(error.to_string(), "width and height must be provided");
    }
}

#[test]
fn double_click_restores_the_board() {
    let engine = Conway::new().with_seeding(Seeding::new(3, 0.3));
    let mut state = initiated(&engine, 8, 8);
    state = reduce(&engine, &state, Action::Tick).expect("tick applies");

    for (idx, idy) in [(0, 0), (7, 0), (0, 7), (7, 7), (4, 6)] {
        let once = reduce(&engine, &state, Action::Click { idx, idy }).expect("on board");
        let twice = reduce(&engine, &once, Action::Click { idx, idy }).expect("on board");

        assert_ne!(
            once.cells(),
            state.cells(),
            "single click at ({idx}, {idy}) must change a cell"
        );
        assert_eq!(twice, state, "second click at ({idx}, {idy}) must undo the first");
        assert_eq!(twice.tick(), 1);
    }
}

#[test]
fn origin_cell_is_clickable() {
    let engine = Conway::new();
    let state = initiated(&engine, 2, 2);

    let next = reduce(&engine, &state, Action::Click { idx: 0, idy: 0 }).expect("origin");

    assert_eq!(next.cells().get(CellCoord::new(0, 0)), Some(true));
}

#[test]
fn click_outside_the_board_is_out_of_bounds() {
    let engine = Conway::new();
    let state = initiated(&engine, 4, 3);

    let error = reduce(&engine, &state, Action::Click { idx: 4, idy: 0 })
        .expect_err("column 4 is off the board");

    assert_eq!(
        error,
        ReducerError::Grid(GridError::OutOfBounds {
            cell: CellCoord::new(4, 0),
            width: 4,
            height: 3,
        })
    );
}

#[test]
fn click_before_init_is_out_of_bounds() {
    let engine = Conway::new();
    let error = reduce(&engine, &initial_state(), Action::Click { idx: 0, idy: 0 })
        .expect_err("empty board has no cells");

    assert!(matches!(
        error,
        ReducerError::Grid(GridError::OutOfBounds { .. })
    ));
}

#[test]
fn click_copies_only_the_toggled_column() {
    let engine = Conway::new();
    let before = initiated(&engine, 5, 4);
    let after = reduce(&engine, &before, Action::Click { idx: 2, idy: 1 }).expect("on board");

    assert!(!after.cells().shares_column_with(before.cells(), 2));
    for x in [0, 1, 3, 4] {
        assert!(
            after.cells().shares_column_with(before.cells(), x),
            "column {x} must be reused by reference",
        );
    }

    // Writing the new board's toggled column must not reach the previous state.
    let mut cells = after.cells().clone();
    cells
        .set(CellCoord::new(2, 3), true)
        .expect("cell on board");
    assert_eq!(before.cells().column(2), Some(&[false, false, false, false][..]));
    assert_eq!(after.cells().column(2), Some(&[false, true, false, false][..]));
}

#[test]
fn tick_increments_counter_and_keeps_dimensions() {
    let engine = Conway::new();
    let mut state = initiated(&engine, 6, 4);
    for _ in 0..3 {
        state = reduce(&engine, &state, Action::Tick).expect("tick applies");
    }
    assert_eq!(state.tick(), 3);

    let next = reduce(&engine, &state, Action::Tick).expect("tick applies");

    assert_eq!(next.tick(), 4);
    assert_eq!(next.width(), 6);
    assert_eq!(next.height(), 4);
}

#[test]
fn tick_adopts_engine_generation() {
    let engine = Conway::new();
    let mut state = initiated(&engine, 5, 5);
    for (idx, idy) in [(1, 2), (2, 2), (3, 2)] {
        state = reduce(&engine, &state, Action::Click { idx, idy }).expect("on board");
    }

    let next = reduce(&engine, &state, Action::Tick).expect("tick applies");

    let live: Vec<_> = next.cells().live_cells().collect();
    assert_eq!(
        live,
        vec![
            CellCoord::new(2, 1),
            CellCoord::new(2, 2),
            CellCoord::new(2, 3)
        ]
    );
}

#[test]
fn tick_on_the_initial_state_only_counts() {
    let engine = Conway::new();
    let next = reduce(&engine, &initial_state(), Action::Tick).expect("tick applies");

    assert_eq!(next.tick(), 1);
    assert!(next.cells().is_empty());
}

#[test]
fn reset_returns_the_initial_state() {
    let engine = Conway::new().with_seeding(Seeding::new(11, 0.6));
    let mut state = initiated(&engine, 9, 9);
    state = reduce(&engine, &state, Action::Tick).expect("tick applies");
    state = reduce(&engine, &state, Action::Click { idx: 1, idy: 1 }).expect("on board");

    let reset = reduce(&engine, &state, Action::Reset).expect("reset applies");

    assert_eq!(reset, initial_state());
    assert_eq!(reset.tick(), 0);
    assert_eq!(reset.width(), 0);
    assert_eq!(reset.height(), 0);
    assert!(reset.cells().is_empty(), "reset must not keep a blank board");
}

#[test]
fn reduce_leaves_its_input_untouched() {
    let engine = Conway::new();
    let state = initiated(&engine, 3, 3);
    let snapshot = state.clone();

    let _ = reduce(&engine, &state, Action::Click { idx: 1, idy: 1 }).expect("on board");
    let _ = reduce(&engine, &state, Action::Tick).expect("tick applies");
    let _ = reduce(&engine, &state, Action::Reset).expect("reset applies");

    assert_eq!(state, snapshot);
}

struct ShrinkingEngine;

impl Engine for ShrinkingEngine {
    fn initiate_board(&self, width: u32, height: u32) -> Grid {
        Grid::new(width, height)
    }

    fn tick(&self, input: BoardInput<'_>) -> Grid {
        Grid::new(input.width.saturating_sub(1), input.height)
    }
}

#[test]
fn engine_dimension_changes_are_rejected() {
    let state = initiated(&ShrinkingEngine, 4, 4);

    let error = reduce(&ShrinkingEngine, &state, Action::Tick).expect_err("engine shrank board");

    assert_eq!(
        error,
        ReducerError::EngineDimensionMismatch {
            width: 4,
            height: 4,
            found_width: 3,
            found_height: 4,
        }
    );
}

#[test]
fn apply_reports_one_event_per_action() {
    let engine = Conway::new();
    let mut events = Vec::new();

    let state = apply(
        &engine,
        &initial_state(),
        Action::Init {
            width: 3,
            height: 2,
        },
        &mut events,
    )
    .expect("init applies");
    let state = apply(&engine, &state, Action::Click { idx: 2, idy: 1 }, &mut events)
        .expect("click applies");
    let state = apply(&engine, &state, Action::Tick, &mut events).expect("tick applies");
    let _ = apply(&engine, &state, Action::Reset, &mut events).expect("reset applies");

    assert_eq!(
        events,
        vec![
            Event::BoardInitialized {
                width: 3,
                height: 2
            },
            Event::CellToggled {
                cell: CellCoord::new(2, 1),
                alive: true,
            },
            Event::TimeAdvanced { tick: 1 },
            Event::BoardReset,
        ]
    );
}

#[test]
fn rejected_actions_report_no_event() {
    let engine = Conway::new();
    let mut events = Vec::new();

    let result = apply(
        &engine,
        &initial_state(),
        Action::Init {
            width: 0,
            height: 5,
        },
        &mut events,
    );

    assert!(result.is_err());
    assert!(events.is_empty());
}
