//! Single-writer store that owns a board and serializes dispatch.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
    rc::{Rc, Weak},
};

use life_board_core::{Action, ActionError, Engine, Event};
use tracing::{debug, warn};

use crate::{apply, initial_state, BoardState, ReducerError};

type Listener = Box<dyn FnMut(&BoardState, &Event)>;

/// Errors surfaced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The handle outlived the provider that issued it.
    #[error("game state handle used outside of its GameStateProvider")]
    OutsideProvider,
    /// The reducer rejected a dispatched action.
    #[error(transparent)]
    Reducer(#[from] ReducerError),
    /// A wire-form action could not be decoded.
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Identifier returned by [`GameStateHandle::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

struct StoreCore {
    engine: Box<dyn Engine>,
    state: RefCell<BoardState>,
    queue: RefCell<VecDeque<Action>>,
    draining: Cell<bool>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    cancelled: RefCell<Vec<SubscriptionId>>,
    next_subscription: Cell<u64>,
}

impl StoreCore {
    fn drain(&self) -> Result<(), StoreError> {
        loop {
            let Some(action) = self.queue.borrow_mut().pop_front() else {
                return Ok(());
            };

            let mut events = Vec::with_capacity(1);
            let result = {
                let current = self.state.borrow();
                apply(self.engine.as_ref(), &current, action, &mut events)
            };

            match result {
                Ok(next) => {
                    debug!(action = action.tag(), tick = next.tick(), "applied action");
                    *self.state.borrow_mut() = next.clone();
                    self.notify(&next, &events);
                }
                Err(error) => {
                    let dropped = {
                        let mut queue = self.queue.borrow_mut();
                        let dropped = queue.len();
                        queue.clear();
                        dropped
                    };
                    warn!(action = action.tag(), %error, dropped, "rejected action");
                    return Err(error.into());
                }
            }
        }
    }

    fn notify(&self, state: &BoardState, events: &[Event]) {
        let mut listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (_, listener) in &mut listeners {
            for event in events {
                listener(state, event);
            }
        }

        // Listeners may have subscribed or unsubscribed while they ran.
        let mut slot = self.listeners.borrow_mut();
        let added = std::mem::take(&mut *slot);
        *slot = listeners;
        slot.extend(added);
        let cancelled = std::mem::take(&mut *self.cancelled.borrow_mut());
        slot.retain(|(id, _)| !cancelled.contains(id));
    }
}

struct DrainGuard<'a>(&'a Cell<bool>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Owner of one board state and the reducer that transitions it.
///
/// Consumers never reach the state directly; they receive a
/// [`GameStateHandle`] from [`GameStateProvider::handle`]. Dropping the
/// provider ends its scope and detaches every handle it issued.
pub struct GameStateProvider {
    core: Rc<StoreCore>,
}

impl GameStateProvider {
    /// Creates a provider holding [`initial_state`] and driven by `engine`.
    #[must_use]
    pub fn new<E>(engine: E) -> Self
    where
        E: Engine + 'static,
    {
        Self {
            core: Rc::new(StoreCore {
                engine: Box::new(engine),
                state: RefCell::new(initial_state()),
                queue: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
                listeners: RefCell::new(Vec::new()),
                cancelled: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
            }),
        }
    }

    /// Issues a handle bound to this provider's scope.
    #[must_use]
    pub fn handle(&self) -> GameStateHandle {
        GameStateHandle {
            core: Rc::downgrade(&self.core),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BoardState {
        self.core.state.borrow().clone()
    }
}

impl fmt::Debug for GameStateProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStateProvider")
            .field("state", &*self.core.state.borrow())
            .field("queued", &self.core.queue.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Explicit `{state, dispatch}` accessor for a [`GameStateProvider`].
///
/// Handles are cheap to clone and are passed down to every function that
/// reads or changes the board. Once the provider is dropped every operation
/// fails with [`StoreError::OutsideProvider`].
#[derive(Clone)]
pub struct GameStateHandle {
    core: Weak<StoreCore>,
}

impl GameStateHandle {
    /// Reports whether the issuing provider is still alive.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.core.strong_count() > 0
    }

    /// Returns the current state.
    ///
    /// The returned value shares its columns with the stored board, so taking
    /// a snapshot does not copy cells.
    pub fn state(&self) -> Result<BoardState, StoreError> {
        let core = self.core()?;
        let state = core.state.borrow().clone();
        Ok(state)
    }

    /// Queues `action` and applies every pending action in dispatch order.
    ///
    /// When called while the store is already draining (for example from a
    /// listener) the action is queued behind the current one and this call
    /// returns immediately; the outer dispatch reports any failure. A rejected
    /// action discards the actions queued after it and leaves the last good
    /// state in place.
    pub fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        let core = self.core()?;
        core.queue.borrow_mut().push_back(action);
        if core.draining.replace(true) {
            debug!(action = action.tag(), "queued re-entrant action");
            return Ok(());
        }

        let _guard = DrainGuard(&core.draining);
        core.drain()
    }

    /// Decodes a JSON wire-form action and dispatches it.
    pub fn dispatch_json(&self, text: &str) -> Result<(), StoreError> {
        let action = text.parse::<Action>().map_err(|error| {
            warn!(%error, "rejected wire action");
            error
        })?;
        self.dispatch(action)
    }

    /// Registers `listener` to observe every applied action.
    ///
    /// The listener receives the new state and the event describing the
    /// transition. Listeners registered while a notification is running start
    /// receiving events from the next applied action.
    pub fn subscribe<F>(&self, listener: F) -> Result<SubscriptionId, StoreError>
    where
        F: FnMut(&BoardState, &Event) + 'static,
    {
        let core = self.core()?;
        let id = SubscriptionId(core.next_subscription.get());
        core.next_subscription.set(id.0 + 1);
        core.listeners.borrow_mut().push((id, Box::new(listener)));
        Ok(id)
    }

    /// Removes a listener previously returned by [`GameStateHandle::subscribe`].
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), StoreError> {
        let core = self.core()?;
        let mut listeners = core.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        if listeners.len() == before {
            // The listener may be running; drop it once notification ends.
            core.cancelled.borrow_mut().push(id);
        }
        Ok(())
    }

    fn core(&self) -> Result<Rc<StoreCore>, StoreError> {
        self.core.upgrade().ok_or(StoreError::OutsideProvider)
    }
}

impl fmt::Debug for GameStateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameStateHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}
