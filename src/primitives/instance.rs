use std::{cell::OnceCell, rc::Rc};

type StateCallback<S> = Box<dyn FnOnce(&S)>;

/// Transient flags of a component instance that are not part of its
/// rendered state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstanceFlags {
    /// The component's popup or panel is open.
    pub open: bool,
    /// Focus is inside the component.
    pub has_focus: bool,
    /// Window-wide listeners are registered for this instance.
    pub subscribed: bool,
    /// The component is being torn down; scheduled work must not run.
    pub will_unmount: bool,
}

/// Per-component record that survives across renders.
///
/// Holds the state bag `S`, a handler set `H` that is built exactly once,
/// transient [`InstanceFlags`] and callbacks queued by
/// [`set_state_then`](Self::set_state_then). Callbacks run at the start of the
/// next render, after the state they observe has been committed.
pub struct Instance<S, H> {
    state: S,
    handlers: OnceCell<Rc<H>>,
    callbacks: Vec<StateCallback<S>>,
    dirty: bool,
    pub flags: InstanceFlags,
}

impl<S: Clone + PartialEq, H> Instance<S, H> {
    pub fn new(initial: S) -> Self {
        Self {
            state: initial,
            handlers: OnceCell::new(),
            callbacks: Vec::new(),
            dirty: false,
            flags: InstanceFlags::default(),
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutates the state in place without scheduling a render, for syncing
    /// props during the render itself.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Applies `update` to a copy of the state and commits it when anything
    /// changed.
    ///
    /// Returns `true` when the state changed and a render is needed.
    pub fn set_state(&mut self, update: impl FnOnce(&mut S)) -> bool {
        let mut next = self.state.clone();
        update(&mut next);

        if next == self.state {
            return false;
        }

        self.state = next;
        self.dirty = true;
        true
    }

    /// Like [`set_state`](Self::set_state), queueing `callback` for the next
    /// render when the state changed. Unchanged state drops the callback.
    pub fn set_state_then(
        &mut self,
        update: impl FnOnce(&mut S),
        callback: impl FnOnce(&S) + 'static,
    ) -> bool {
        let changed = self.set_state(update);
        if changed {
            self.callbacks.push(Box::new(callback));
        }
        changed
    }

    /// Replaces the state with the result of `updater(state, props)`.
    ///
    /// The functional form always schedules a render, as the caller derives
    /// the next state from data outside the instance.
    pub fn set_state_with<P>(&mut self, props: &P, updater: impl FnOnce(&S, &P) -> S) {
        self.state = updater(&self.state, props);
        self.dirty = true;
    }

    /// Schedules a render without touching the state.
    pub fn force_update(&mut self) {
        self.dirty = true;
    }

    /// Whether a state change is waiting to be rendered.
    pub fn needs_render(&self) -> bool {
        self.dirty
    }

    /// Called once per render. Flushes the callbacks queued by
    /// [`set_state_then`](Self::set_state_then) and returns whether a state
    /// change was pending.
    pub fn begin_render(&mut self) -> bool {
        for callback in std::mem::take(&mut self.callbacks) {
            callback(&self.state);
        }

        std::mem::replace(&mut self.dirty, false)
    }

    /// The handler set of this instance, built by `init` on first use.
    ///
    /// Every later call returns the same `Rc`, whatever `init` is passed.
    pub fn handlers(&self, init: impl FnOnce() -> H) -> Rc<H> {
        self.handlers.get_or_init(|| Rc::new(init())).clone()
    }

    pub fn has_handlers(&self) -> bool {
        self.handlers.get().is_some()
    }

    /// Marks the instance as torn down. Pending callbacks are dropped and
    /// window listeners are considered released.
    pub fn unmount(&mut self) {
        self.flags.will_unmount = true;
        self.flags.subscribed = false;
        self.flags.open = false;
        self.callbacks.clear();
    }

    pub fn is_unmounted(&self) -> bool {
        self.flags.will_unmount
    }
}
