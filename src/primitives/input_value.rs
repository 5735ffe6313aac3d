use std::rc::Rc;

/// Remembers the last value of a prop to tell whether it just changed.
#[derive(Clone, Debug)]
pub struct PreviousProp<T> {
    last: Option<T>,
    previous: Option<T>,
}

impl<T> Default for PreviousProp<T> {
    fn default() -> Self {
        Self {
            last: None,
            previous: None,
        }
    }
}

impl<T: Clone + PartialEq> PreviousProp<T> {
    /// Records this render's prop value.
    ///
    /// Returns `true` when it differs from the value seen on the previous
    /// render. An absent prop on the first render does not count as a change.
    pub fn observe(&mut self, value: Option<&T>) -> bool {
        if self.last.as_ref() == value {
            return false;
        }

        self.previous = std::mem::replace(&mut self.last, value.cloned());
        true
    }

    /// The prop value before the most recent change.
    pub fn previous(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

pub type FormatFn<T> = Rc<dyn Fn(&T) -> T>;

/// Reconciles a controlled `value` prop with internally tracked state.
///
/// The first sync adopts `value`, or `default_value` when there is none.
/// Later syncs overwrite the internal value only when the component is
/// controlled or the `value` prop just changed, so edits made through
/// [`set`](Self::set) survive renders with an unchanged prop. The tracked
/// value is never absent: it falls back to `T::default()`.
pub struct SyncedValue<T> {
    value: T,
    prop: PreviousProp<T>,
    format: Option<FormatFn<T>>,
    initialized: bool,
}

/// Result of [`SyncedValue::sync`].
#[derive(Clone, Debug, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    /// The `value` prop changed on this render.
    pub just_synced: bool,
}

impl<T: Clone + PartialEq + Default> Default for SyncedValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + PartialEq + Default> SyncedValue<T> {
    pub fn new() -> Self {
        Self {
            value: T::default(),
            prop: PreviousProp::default(),
            format: None,
            initialized: false,
        }
    }

    /// Transform applied to every value taken from props.
    pub fn with_format(mut self, format: impl Fn(&T) -> T + 'static) -> Self {
        self.format = Some(Rc::new(format));
        self
    }

    fn formatted(&self, value: &T) -> T {
        match &self.format {
            Some(format) => format(value),
            None => value.clone(),
        }
    }

    /// Runs once per render with the current props.
    pub fn sync(
        &mut self,
        value: Option<&T>,
        default_value: Option<&T>,
        controlled: bool,
    ) -> Synced<T> {
        let just_synced = self.prop.observe(value);

        if !self.initialized {
            self.initialized = true;
            if let Some(initial) = value.or(default_value) {
                self.value = self.formatted(initial);
            }
        } else if controlled || just_synced {
            self.value = value.map(|value| self.formatted(value)).unwrap_or_default();
        }

        Synced {
            value: self.value.clone(),
            just_synced,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Sets the internal value. Returns `true` when it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }

        self.value = value;
        true
    }
}
