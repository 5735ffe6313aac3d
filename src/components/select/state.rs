use std::{rc::Rc, time::Duration};

use gpui::{App, Axis, Bounds, Pixels, Point, SharedString};
use gpui_transitions::ExpandCollapse;

use crate::{
    components::select::{
        AddOptionFn, FuzzyConfig, FuzzyIndex, OptionRow, OptionValue, OptionsPosition,
        PanelGeometry, Placement, RowKind, SearchTicket, SelectHandlers, SelectListeners,
        SelectOption, SelectValue, Debouncer, add_option, filter_selected, options_position,
        render_rows, text_of,
    },
    error::SelectError,
    primitives::{Instance, InstanceFlags, PreviousProp, SyncedValue, emit},
};

pub type NormalizeFn = Rc<dyn Fn(&str) -> String>;

/// Behavioural settings of a select.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectConfig {
    /// Filter options by typing a query.
    pub search: bool,
    /// Hold a list of values instead of a single one.
    pub multiple: bool,
    /// Open the panel initially.
    pub default_open: bool,
    /// Prefer opening the panel above the trigger.
    pub upward: bool,
    /// Position the panel relative to the window so clipping ancestors do
    /// not cut it off.
    pub fixed: bool,
    /// Size the trigger to its content.
    pub compact: bool,
    /// Always take the value prop, not only when it changes.
    pub controlled_value: bool,
    /// Leave selected values out of the option list of a multiple select.
    pub exclude_selected: bool,
    /// Render the options even while the panel is closed.
    pub force_render: bool,
    /// The query to start with and to reset to on close.
    pub query: SharedString,
    pub fuzzy: FuzzyConfig,
    /// Quiet period before a typed query is searched.
    pub debounce: Duration,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            search: false,
            multiple: false,
            default_open: false,
            upward: false,
            fixed: false,
            compact: false,
            controlled_value: false,
            exclude_selected: true,
            force_render: false,
            query: SharedString::default(),
            fuzzy: FuzzyConfig::default(),
            debounce: Duration::from_millis(150),
        }
    }
}

/// Props of one render.
pub struct SelectProps<V, Cx = App> {
    pub options: Rc<[SelectOption<V>]>,
    pub value: Option<SelectValue<V>>,
    pub default_value: Option<SelectValue<V>>,
    pub config: SelectConfig,
    pub listeners: SelectListeners<V, Cx>,
    pub add_option: Option<AddOptionFn<V>>,
    pub normalize: Option<NormalizeFn>,
}

impl<V, Cx> SelectProps<V, Cx> {
    pub fn new(options: Rc<[SelectOption<V>]>, config: SelectConfig) -> Self {
        Self {
            options,
            value: None,
            default_value: None,
            config,
            listeners: SelectListeners::default(),
            add_option: None,
            normalize: None,
        }
    }
}

/// The rendered state of a select.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectData<V> {
    pub value: SelectValue<V>,
    pub query: SharedString,
    /// Options offered right now: searched, without excluded values.
    pub options: Vec<SelectOption<V>>,
}

/// A close scheduled for the next tick. Superseded by any later schedule
/// or open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredClose(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectKey {
    Up,
    Down,
    Enter,
    Backspace,
    Escape,
}

/// Where a key press originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTarget {
    /// The trigger or its search box.
    Input,
    /// The option row at this index of [`SelectState::rows`].
    Row(usize),
    /// Anything outside the select.
    Outside,
}

/// What a handled key press asks the view to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEffect {
    /// Move keyboard focus to the row at this index.
    FocusRow(usize),
    Selected(Option<DeferredClose>),
    Deleted,
    Closed,
}

/// Whether `target` is `root` or one of its descendants.
pub fn is_within<N: PartialEq>(target: &N, root: &N, parent_of: impl Fn(&N) -> Option<N>) -> bool {
    if target == root {
        return true;
    }

    let mut node = parent_of(target);
    while let Some(current) = node {
        if &current == root {
            return true;
        }
        node = parent_of(&current);
    }

    false
}

/// State machine of a select: value, query, panel and focus.
///
/// The machine never touches a window. Methods that hand events to listeners
/// take the listeners' context `Cx`; anything that must happen on a later
/// tick is returned as a ticket ([`DeferredClose`], [`SearchTicket`]) for the
/// caller to schedule and pass back.
pub struct SelectState<V, Cx = App> {
    instance: Instance<SelectData<V>, SelectHandlers>,
    config: SelectConfig,
    options: Rc<[SelectOption<V>]>,
    available: Rc<[SelectOption<V>]>,
    index: FuzzyIndex<V>,
    debouncer: Debouncer,
    panel: ExpandCollapse,
    value_prop: SyncedValue<SelectValue<V>>,
    query_prop: PreviousProp<SharedString>,
    listeners: SelectListeners<V, Cx>,
    add_option: Option<AddOptionFn<V>>,
    normalize: Option<NormalizeFn>,
    focus_index: Option<usize>,
    close_epoch: u64,
    position: Option<OptionsPosition>,
    upward: bool,
    trigger_bounds: Option<Bounds<Pixels>>,
    panel_bounds: Option<Bounds<Pixels>>,
    content_height: Option<Pixels>,
    synced: bool,
}

impl<V: OptionValue, Cx> SelectState<V, Cx> {
    pub fn new(config: SelectConfig) -> Self {
        let open = config.default_open;
        let mut instance = Instance::new(SelectData {
            value: SelectValue::empty(config.multiple),
            query: config.query.clone(),
            options: Vec::new(),
        });
        instance.flags.open = open;
        instance.flags.subscribed = open;

        Self {
            instance,
            index: FuzzyIndex::new(config.fuzzy),
            debouncer: Debouncer::default(),
            panel: ExpandCollapse::new(Some(open), Axis::Vertical, Duration::from_millis(200)),
            options: Rc::from(Vec::new()),
            available: Rc::from(Vec::new()),
            value_prop: SyncedValue::new(),
            query_prop: PreviousProp::default(),
            listeners: SelectListeners::default(),
            add_option: None,
            normalize: None,
            focus_index: None,
            close_epoch: 0,
            position: None,
            upward: config.upward,
            trigger_bounds: None,
            panel_bounds: None,
            content_height: None,
            synced: false,
            config,
        }
    }

    /// Sets how long the panel takes to open or close.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.panel.size_mut().set_duration(duration);
        self
    }

    pub fn data(&self) -> &SelectData<V> {
        self.instance.state()
    }

    pub fn value(&self) -> &SelectValue<V> {
        &self.instance.state().value
    }

    pub fn query(&self) -> &SharedString {
        &self.instance.state().query
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    /// Every option passed in, before searching or excluding selected values.
    pub fn source_options(&self) -> &[SelectOption<V>] {
        &self.options
    }

    /// The display text of `value`, looked up in the source options.
    pub fn text_for(&self, value: &V) -> SharedString {
        text_of(&self.options, value)
    }

    /// Selected values paired with the text their chips show.
    pub fn chips(&self) -> Vec<(V, SharedString)> {
        self.value()
            .values()
            .iter()
            .map(|value| (value.clone(), self.text_for(value)))
            .collect()
    }

    pub fn flags(&self) -> InstanceFlags {
        self.instance.flags
    }

    /// The logical open state of the panel.
    pub fn is_open(&self) -> bool {
        self.panel.is_open()
    }

    /// Whether window listeners should be registered for this select.
    pub fn is_subscribed(&self) -> bool {
        self.instance.flags.subscribed
    }

    pub fn panel(&self) -> &ExpandCollapse {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ExpandCollapse {
        &mut self.panel
    }

    /// Whether options should be rendered at all.
    pub fn should_render(&self) -> bool {
        self.config.force_render || self.panel.visible()
    }

    pub fn focus_index(&self) -> Option<usize> {
        self.focus_index
    }

    /// Whether the panel opens upwards, after checking that it fits.
    pub fn upward(&self) -> bool {
        self.upward
    }

    pub fn position(&self) -> Option<&OptionsPosition> {
        self.position.as_ref()
    }

    /// Where a fixed panel goes, once the position is known.
    pub fn placement(&self) -> Option<Placement> {
        self.position
            .map(|position| position.fixed_placement(self.config.upward))
    }

    /// Whether a state change is waiting to be rendered.
    pub fn needs_render(&self) -> bool {
        self.instance.needs_render()
    }

    /// The window handlers of this select, built by `init` on first use.
    pub fn handlers(&self, init: impl FnOnce() -> SelectHandlers) -> Rc<SelectHandlers> {
        self.instance.handlers(init)
    }

    pub fn fuzzy_index(&self) -> &FuzzyIndex<V> {
        &self.index
    }

    /// Applies the props of a render. Runs before anything reads the state.
    pub fn sync_props(&mut self, props: SelectProps<V, Cx>) {
        self.instance.begin_render();

        let mode_changed = props.config.multiple != self.config.multiple;
        let search_enabled = props.config.search && !self.config.search;
        if props.config.fuzzy != self.config.fuzzy {
            self.index.set_config(props.config.fuzzy);
        }

        self.config = props.config;
        self.listeners = props.listeners;
        self.add_option = props.add_option;
        self.normalize = props.normalize;

        let synced = self.value_prop.sync(
            props.value.as_ref(),
            props.default_value.as_ref(),
            self.config.controlled_value,
        );
        let value = synced.value.into_mode(self.config.multiple);
        let value_changed = value != self.instance.state().value;
        if value_changed {
            self.instance.state_mut().value = value;
        }

        let query_changed = self.query_prop.observe(Some(&self.config.query));
        if query_changed {
            self.instance.state_mut().query = self.config.query.clone();
        }

        let options_changed = !Rc::ptr_eq(&self.options, &props.options);
        if options_changed {
            self.options = props.options;
        }

        if search_enabled {
            self.index.invalidate();
        }

        if self.position.is_none() {
            self.upward = self.config.upward;
        }

        if !self.synced
            || options_changed
            || value_changed
            || mode_changed
            || search_enabled
            || query_changed
        {
            self.synced = true;
            self.focus_index = None;
            self.refresh_available();
            let query = self.instance.state().query.clone();
            self.instance.state_mut().options = self.options_for(&query);
        }
    }

    /// Recomputes the options left after excluding selected values.
    fn refresh_available(&mut self) {
        self.available = if self.config.multiple && self.config.exclude_selected {
            Rc::from(filter_selected(&self.options, &self.instance.state().value))
        } else {
            self.options.clone()
        };

        if self.config.search {
            self.index.sync(&self.available);
        }
    }

    fn options_for(&mut self, query: &str) -> Vec<SelectOption<V>> {
        if self.config.search && !query.is_empty() {
            self.index.search(query)
        } else {
            self.available.to_vec()
        }
    }

    fn subscribe(&mut self) {
        let flags = &mut self.instance.flags;
        flags.open = true;
        if !flags.subscribed {
            flags.subscribed = true;
            tracing::trace!("select subscribed to window events");
        }
    }

    fn unsubscribe(&mut self) {
        let flags = &mut self.instance.flags;
        flags.open = false;
        if flags.subscribed {
            flags.subscribed = false;
            tracing::trace!("select unsubscribed from window events");
        }
    }

    /// Opens the panel. Returns `false` when it was open already or is still
    /// animating.
    pub fn open_options(&mut self) -> bool {
        if self.instance.is_unmounted() || self.is_open() {
            return false;
        }

        if !self.panel.toggle_open() {
            return false;
        }

        self.close_epoch += 1;
        self.position = None;
        self.subscribe();
        self.instance.force_update();

        tracing::debug!("select opened");
        true
    }

    /// Closes the panel unless focus is still inside the select.
    ///
    /// A search query left behind is resynced: a single select shows its
    /// value's text again, anything else resets to the configured query.
    pub fn close_options(&mut self) -> bool {
        let flags = self.instance.flags;
        if flags.will_unmount {
            tracing::trace!("close after unmount ignored");
            return false;
        }

        if flags.has_focus || !self.is_open() {
            return false;
        }

        if !self.panel.toggle_open() {
            return false;
        }

        self.resync_query();
        self.debouncer.cancel();
        self.unsubscribe();
        self.focus_index = None;
        self.panel_bounds = None;
        self.instance.force_update();

        tracing::debug!("select closed");
        true
    }

    /// Drops focus and closes the panel right away.
    pub fn close_now(&mut self) -> bool {
        self.instance.flags.has_focus = false;
        self.close_options()
    }

    fn resync_query(&mut self) {
        if !self.config.search {
            return;
        }

        let SelectData { value, query, .. } = self.instance.state();
        let next = match value.last() {
            Some(value) if !self.config.multiple => text_of(&self.options, value),
            _ => self.config.query.clone(),
        };

        if next == *query {
            return;
        }

        let options = self.options_for(&next);
        self.instance.set_state(|state| {
            state.query = next;
            state.options = options;
        });
    }

    /// Opens when closed. An open panel without search closes.
    pub fn toggle_options(&mut self) -> bool {
        if !self.is_open() {
            return self.open_options();
        }

        if self.config.search {
            return false;
        }

        self.close_now()
    }

    /// Schedules a close for the next tick.
    pub fn schedule_close(&mut self) -> DeferredClose {
        self.close_epoch += 1;
        DeferredClose(self.close_epoch)
    }

    /// Runs a close scheduled with [`schedule_close`](Self::schedule_close).
    pub fn run_deferred_close(&mut self, close: DeferredClose) -> bool {
        if close.0 != self.close_epoch {
            tracing::trace!(?close, "superseded close skipped");
            return false;
        }

        self.close_options()
    }

    /// Focus entered the select.
    pub fn focus(&mut self, cx: &mut Cx) -> bool {
        self.instance.flags.has_focus = true;

        if !emit(self.listeners.on_focus.as_ref(), (), cx) {
            tracing::trace!("open on focus prevented");
            return false;
        }

        self.open_options()
    }

    /// Keyboard focus moved to the row at `index`.
    pub fn focus_option(&mut self, index: usize, cx: &mut Cx) {
        self.instance.flags.has_focus = true;
        self.focus_index = Some(index);

        let label = |term: &str| SharedString::from(term.to_string());
        if let Some(row) = self.rows(label).into_iter().nth(index) {
            emit(self.listeners.on_select.as_ref(), row.option, cx);
        }
    }

    /// Focus left the select. Returns the close to schedule, if any.
    pub fn blur(&mut self, cx: &mut Cx) -> Option<DeferredClose> {
        self.instance.flags.has_focus = false;

        if !emit(self.listeners.on_blur.as_ref(), (), cx) {
            tracing::trace!("close on blur prevented");
            return None;
        }

        self.is_open().then(|| self.schedule_close())
    }

    /// Focus left an option row.
    pub fn blur_option(&mut self) -> Option<DeferredClose> {
        self.instance.flags.has_focus = false;
        self.is_open().then(|| self.schedule_close())
    }

    /// A pointer went down; `inside` tells whether it hit the select.
    pub fn pointer_down(&mut self, inside: bool) -> bool {
        if inside || !self.is_open() {
            return false;
        }

        tracing::debug!("pointer down outside select");
        self.close_now()
    }

    /// Like [`pointer_down`](Self::pointer_down), hit-testing `point`
    /// against the last known trigger and panel bounds.
    pub fn pointer_down_at(&mut self, point: Point<Pixels>) -> bool {
        let inside = self.contains_point(point);
        self.pointer_down(inside)
    }

    pub fn contains_point(&self, point: Point<Pixels>) -> bool {
        [self.trigger_bounds, self.panel_bounds]
            .into_iter()
            .flatten()
            .any(|bounds| bounds.contains(&point))
    }

    pub fn set_trigger_bounds(&mut self, bounds: Bounds<Pixels>) {
        self.trigger_bounds = Some(bounds);
    }

    pub fn trigger_bounds(&self) -> Option<Bounds<Pixels>> {
        self.trigger_bounds
    }

    pub fn set_panel_bounds(&mut self, bounds: Bounds<Pixels>) {
        self.panel_bounds = Some(bounds);
    }

    /// Records the natural height of the panel's rows.
    pub fn set_content_height(&mut self, height: Pixels) {
        self.content_height = Some(height);
    }

    /// The natural height of the panel's rows when they were last laid out.
    pub fn content_height(&self) -> Option<Pixels> {
        self.content_height
    }

    /// Measures where the panel fits. Called once per open.
    pub fn set_position(&mut self, geometry: &PanelGeometry) -> Result<OptionsPosition, SelectError> {
        let position = options_position(geometry)?;
        self.upward = position.effective_upward(self.config.upward);
        self.position = Some(position);
        Ok(position)
    }

    fn commit_value(&mut self, value: SelectValue<V>) {
        self.value_prop.set(value.clone());
        self.instance.set_state(|state| state.value = value);
        self.focus_index = None;
        self.refresh_available();
    }

    /// Picks `option`: a single select replaces its value and shows the
    /// option's text, a multiple select appends it and clears the query.
    pub fn select_option(&mut self, option: SelectOption<V>, cx: &mut Cx) -> Option<DeferredClose> {
        let multiple = self.config.multiple;
        self.instance.flags.has_focus = multiple;

        let mut value = self.instance.state().value.clone();
        value.select(option.value().clone());
        let query = if multiple {
            SharedString::default()
        } else {
            option.text()
        };

        if emit(self.listeners.on_change.as_ref(), value.clone(), cx) {
            self.commit_value(value);
            let options = self.available.to_vec();
            self.instance.set_state(|state| {
                state.query = query;
                state.options = options;
            });
        } else {
            tracing::trace!("value change prevented");
        }

        self.is_open().then(|| self.schedule_close())
    }

    /// Picks the row at `index` of [`rows`](Self::rows).
    pub fn select_row(&mut self, index: usize, cx: &mut Cx) -> Option<DeferredClose> {
        let label = |term: &str| SharedString::from(term.to_string());
        let row = self.rows(label).into_iter().nth(index)?;

        if row.kind == RowKind::Add {
            if !emit(self.listeners.on_add_option.as_ref(), row.option.clone(), cx) {
                tracing::trace!("add option prevented");
                return None;
            }
            tracing::debug!(text = %row.option.text(), "option added");
        }

        self.select_option(row.option, cx)
    }

    /// Removes `value` from the selection.
    pub fn delete_value(&mut self, value: &V, cx: &mut Cx) -> bool {
        let mut next = self.instance.state().value.clone();
        if !next.remove(value) {
            return false;
        }

        if !emit(self.listeners.on_change.as_ref(), next.clone(), cx) {
            tracing::trace!("value removal prevented");
            return false;
        }

        self.commit_value(next);
        let query = self.instance.state().query.clone();
        let options = self.options_for(&query);
        self.instance.set_state(|state| state.options = options);
        true
    }

    /// A selected value chip was clicked.
    pub fn click_value(&mut self, value: &V, cx: &mut Cx) {
        emit(self.listeners.on_click_value.as_ref(), value.clone(), cx);
    }

    /// Handles a key press. Returns `None` for keys the select ignores.
    pub fn key_down(&mut self, key: SelectKey, target: KeyTarget, cx: &mut Cx) -> Option<KeyEffect> {
        if target == KeyTarget::Outside {
            return None;
        }

        match key {
            SelectKey::Up | SelectKey::Down => {
                if !self.is_open() {
                    return None;
                }

                let count = self.row_count();
                if count == 0 {
                    return None;
                }

                let forward = (key == SelectKey::Down) != self.upward;
                let next = match (self.focus_index, forward) {
                    (None, true) => 0,
                    (None, false) => count - 1,
                    (Some(index), true) => (index + 1) % count,
                    (Some(index), false) => (index + count - 1) % count,
                };
                Some(KeyEffect::FocusRow(next))
            }
            SelectKey::Enter => match target {
                KeyTarget::Row(index) => Some(KeyEffect::Selected(self.select_row(index, cx))),
                _ => {
                    let SelectData { query, options, .. } = self.instance.state();
                    if !self.config.search || query.is_empty() {
                        return None;
                    }

                    let first = options.first()?.clone();
                    Some(KeyEffect::Selected(self.select_option(first, cx)))
                }
            },
            SelectKey::Backspace => {
                let SelectData { value, query, .. } = self.instance.state();
                if !self.config.search
                    || !self.config.multiple
                    || target != KeyTarget::Input
                    || !query.is_empty()
                {
                    return None;
                }

                let last = value.last()?.clone();
                self.delete_value(&last, cx).then_some(KeyEffect::Deleted)
            }
            SelectKey::Escape => self.close_now().then_some(KeyEffect::Closed),
        }
    }

    /// The search box now reads `text`. Returns the ticket of the search to
    /// run once typing settles.
    pub fn search_input(&mut self, text: &str, cx: &mut Cx) -> Option<SearchTicket> {
        if !self.config.search {
            return None;
        }

        let query = SharedString::from(match &self.normalize {
            Some(normalize) => normalize(text),
            None => text.to_string(),
        });

        self.focus_index = None;
        self.instance.set_state(|state| state.query = query.clone());
        self.open_options();

        if !emit(self.listeners.on_search.as_ref(), query.clone(), cx) {
            tracing::trace!("search prevented");
            return None;
        }

        if query.is_empty() {
            self.debouncer.cancel();
            let options = self.available.to_vec();
            self.instance.set_state(|state| state.options = options);
            return None;
        }

        Some(self.debouncer.schedule())
    }

    /// Runs the search scheduled as `ticket` if no keystroke came after it.
    pub fn run_search(&mut self, ticket: SearchTicket) -> bool {
        if self.instance.is_unmounted() {
            tracing::trace!("search after unmount ignored");
            return false;
        }

        if !self.debouncer.is_current(ticket) {
            tracing::trace!(?ticket, "superseded search skipped");
            return false;
        }

        let query = self.instance.state().query.clone();
        let options = self.options_for(&query);
        self.focus_index = None;
        self.instance.set_state(|state| state.options = options);
        true
    }

    /// Rows to render: the add row first when it applies, then the options.
    /// `add_label` turns the search term into the add row's label.
    pub fn rows(&self, add_label: impl Fn(&str) -> SharedString) -> Vec<OptionRow<V>> {
        let SelectData {
            value,
            query,
            options,
        } = self.instance.state();

        let mut rows = Vec::with_capacity(options.len() + 1);

        if self.config.search
            && self.should_render()
            && let Some(factory) = &self.add_option
            && let Some(option) = add_option(query, &self.options, value, factory)
        {
            rows.push(OptionRow::add(option, add_label(query.trim())));
        }

        rows.extend(render_rows(options, if self.config.search { query } else { "" }));

        for (index, row) in rows.iter_mut().enumerate() {
            row.focused = self.focus_index == Some(index);
            row.selected = row.kind == RowKind::Option && value.contains(row.option.value());
        }

        rows
    }

    fn row_count(&self) -> usize {
        self.rows(|term| SharedString::from(term.to_string())).len()
    }

    /// Whether the "no options" message shows.
    pub fn no_options(&self) -> bool {
        self.should_render() && self.instance.state().options.is_empty()
    }

    /// The widest string the trigger must fit in compact mode.
    pub fn compact_content(&self, placeholder: &SharedString) -> SharedString {
        let SelectData { query, options, .. } = self.instance.state();

        let mut content = if query.is_empty() {
            placeholder.clone()
        } else {
            query.clone()
        };

        if !self.config.multiple && self.panel.visible() {
            for option in options {
                let text = option.text();
                if text.chars().count() > content.chars().count() {
                    content = text;
                }
            }
        }

        content
    }

    /// Selects `value` without notifying listeners.
    pub fn select_value(&mut self, value: V) -> Result<(), SelectError> {
        let option = self
            .options
            .iter()
            .find(|option| option.value() == &value)
            .cloned()
            .ok_or(SelectError::UnknownValue)?;

        let mut next = self.instance.state().value.clone();
        next.select(value);
        self.commit_value(next);

        let query = if self.config.multiple || !self.config.search {
            self.instance.state().query.clone()
        } else {
            option.text()
        };
        let options = self.options_for(&query);
        self.instance.set_state(|state| {
            state.query = query;
            state.options = options;
        });
        Ok(())
    }

    /// Clears the selection and the query without notifying listeners.
    pub fn clear(&mut self) {
        self.commit_value(SelectValue::empty(self.config.multiple));
        let query = self.config.query.clone();
        let options = self.options_for(&query);
        self.instance.set_state(|state| {
            state.query = query;
            state.options = options;
        });
    }

    /// Opens the panel without focusing the select.
    pub fn open(&mut self) -> bool {
        self.open_options()
    }

    /// Closes the panel right away.
    pub fn close(&mut self) -> bool {
        self.close_now()
    }

    /// Replaces the option list.
    pub fn set_options(&mut self, options: impl Into<Rc<[SelectOption<V>]>>) {
        self.options = options.into();
        self.focus_index = None;
        self.refresh_available();
        let query = self.instance.state().query.clone();
        let options = self.options_for(&query);
        self.instance.set_state(|state| state.options = options);
    }

    /// Tears the select down. Pending closes and searches become no-ops.
    pub fn unmount(&mut self) {
        self.instance.unmount();
        self.debouncer.cancel();
        self.close_epoch += 1;
        tracing::trace!("select unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn numbers() -> Rc<[SelectOption<i32>]> {
        Rc::from(vec![
            SelectOption::labeled(1, "One"),
            SelectOption::labeled(2, "Two"),
            SelectOption::labeled(3, "Three"),
        ])
    }

    fn select(config: SelectConfig) -> SelectState<i32, ()> {
        let mut state = SelectState::new(config.clone());
        state.sync_props(SelectProps::new(numbers(), config));
        state
    }

    fn values(options: &[SelectOption<i32>]) -> Vec<i32> {
        options.iter().map(|option| *option.value()).collect()
    }

    fn logging_listeners(log: &Log) -> SelectListeners<i32, ()> {
        let change = log.clone();
        let blur = log.clone();
        SelectListeners {
            on_change: Some(Rc::new(move |event, _| {
                change
                    .borrow_mut()
                    .push(format!("change {:?}", event.payload().values()))
            })),
            on_blur: Some(Rc::new(move |_, _| blur.borrow_mut().push("blur".into()))),
            ..Default::default()
        }
    }

    #[test]
    fn test_multiple_selection_end_to_end() {
        let config = SelectConfig {
            multiple: true,
            ..Default::default()
        };
        let options = numbers();
        let log = Log::default();

        let mut state = SelectState::new(config.clone());
        let mut props = SelectProps::new(options.clone(), config.clone());
        props.listeners = logging_listeners(&log);
        state.sync_props(props);

        state.focus(&mut ());
        for value in [2, 1] {
            let option = options[value as usize - 1].clone();
            state.select_option(option, &mut ());
        }

        assert_eq!(state.value(), &SelectValue::Multiple(vec![2, 1]));
        assert_eq!(values(&state.data().options), vec![3]);
        assert_eq!(*log.borrow(), vec!["change [2]", "change [2, 1]"]);

        state.sync_props(SelectProps::new(options, config));
        assert_eq!(
            state.value(),
            &SelectValue::Multiple(vec![2, 1]),
            "unchanged props keep the local value"
        );
    }

    #[test]
    fn test_repeated_selection_stays_unique() {
        let mut state = select(SelectConfig {
            multiple: true,
            exclude_selected: false,
            ..Default::default()
        });

        for value in [3, 1, 3, 3, 2, 1] {
            state.select_option(SelectOption::Primitive(value), &mut ());
        }

        assert_eq!(state.value().values(), &[3, 1, 2]);
    }

    #[test]
    fn test_single_selection_sets_query_and_closes_later() {
        let mut state = select(SelectConfig {
            search: true,
            ..Default::default()
        });

        state.focus(&mut ());
        assert!(state.is_open());

        let close = state.select_option(SelectOption::labeled(2, "Two"), &mut ());
        assert_eq!(state.value(), &SelectValue::Single(Some(2)));
        assert_eq!(&**state.query(), "Two");
        assert!(state.is_open(), "close waits for the next tick");

        assert!(state.run_deferred_close(close.unwrap()));
        assert!(!state.is_open());
        assert!(!state.is_subscribed());
    }

    #[test]
    fn test_close_resyncs_query_to_selected_text() {
        let mut state = select(SelectConfig {
            search: true,
            ..Default::default()
        });
        state.select_value(2).unwrap();

        state.focus(&mut ());
        state.search_input("tw", &mut ());
        assert_eq!(&**state.query(), "tw");

        let close = state.blur(&mut ()).unwrap();
        assert!(state.run_deferred_close(close));
        assert!(!state.is_open());
        assert_eq!(&**state.query(), "Two");
    }

    #[test]
    fn test_close_without_value_resets_query() {
        let mut state = select(SelectConfig {
            search: true,
            query: "default".into(),
            ..Default::default()
        });
        assert_eq!(&**state.query(), "default");

        state.focus(&mut ());
        state.search_input("xyz", &mut ());
        assert!(state.close_now());
        assert_eq!(&**state.query(), "default");

        let mut multiple = select(SelectConfig {
            search: true,
            multiple: true,
            ..Default::default()
        });
        multiple.select_value(1).unwrap();
        multiple.focus(&mut ());
        multiple.search_input("th", &mut ());
        multiple.close_now();
        assert_eq!(&**multiple.query(), "");
    }

    #[test]
    fn test_deferred_close_yields_to_refocus() {
        let mut state = select(SelectConfig::default());
        state.focus(&mut ());

        let close = state.blur(&mut ()).unwrap();
        state.focus_option(0, &mut ());
        assert!(!state.run_deferred_close(close));
        assert!(state.is_open(), "focus moved to an option");

        let close = state.blur_option().unwrap();
        assert!(state.run_deferred_close(close));
        assert!(!state.is_open());
    }

    #[test]
    fn test_later_schedule_supersedes_earlier_close() {
        let mut state = select(SelectConfig::default());
        state.focus(&mut ());

        let first = state.blur(&mut ()).unwrap();
        let second = state.blur_option().unwrap();

        assert!(!state.run_deferred_close(first));
        assert!(state.run_deferred_close(second));
    }

    #[test]
    fn test_close_after_unmount_is_silent() {
        let mut state = select(SelectConfig::default());
        state.focus(&mut ());

        let close = state.blur(&mut ()).unwrap();
        state.unmount();

        assert!(!state.run_deferred_close(close));
        assert!(!state.close_now());
        assert!(!state.is_subscribed());
    }

    #[test]
    fn test_blur_veto_keeps_panel_open() {
        let mut state = SelectState::<i32, ()>::new(SelectConfig::default());
        let mut props = SelectProps::new(numbers(), SelectConfig::default());
        props.listeners.on_blur = Some(Rc::new(|event, _| event.prevent_default()));
        state.sync_props(props);

        state.focus(&mut ());
        assert_eq!(state.blur(&mut ()), None);
        assert!(state.is_open());
    }

    #[test]
    fn test_change_veto_skips_commit() {
        let mut state = SelectState::<i32, ()>::new(SelectConfig::default());
        let mut props = SelectProps::new(numbers(), SelectConfig::default());
        props.listeners.on_change = Some(Rc::new(|event, _| {
            if event.payload().contains(&3) {
                event.prevent_default();
            }
        }));
        state.sync_props(props);

        state.select_option(SelectOption::labeled(1, "One"), &mut ());
        state.select_option(SelectOption::labeled(3, "Three"), &mut ());
        assert_eq!(state.value(), &SelectValue::Single(Some(1)));
    }

    #[test]
    fn test_focus_veto_keeps_panel_closed() {
        let mut state = SelectState::<i32, ()>::new(SelectConfig::default());
        let mut props = SelectProps::new(numbers(), SelectConfig::default());
        props.listeners.on_focus = Some(Rc::new(|event, _| event.prevent_default()));
        state.sync_props(props);

        assert!(!state.focus(&mut ()));
        assert!(!state.is_open());
        assert!(state.flags().has_focus);
    }

    #[test]
    fn test_pointer_down_outside_closes() {
        #[derive(Clone, Copy, Debug, PartialEq)]
        enum Node {
            Body,
            Select,
            Input,
            Option,
            Sibling,
        }

        let parent_of = |node: &Node| match node {
            Node::Body => None,
            Node::Select | Node::Sibling => Some(Node::Body),
            Node::Input => Some(Node::Select),
            Node::Option => Some(Node::Input),
        };

        let mut state = select(SelectConfig::default());
        state.focus(&mut ());

        for target in [Node::Select, Node::Input, Node::Option] {
            assert!(!state.pointer_down(is_within(&target, &Node::Select, parent_of)));
            assert!(state.is_open(), "{target:?} is inside");
        }

        assert!(state.pointer_down(is_within(&Node::Sibling, &Node::Select, parent_of)));
        assert!(!state.is_open());
        assert!(!state.is_subscribed());
    }

    #[test]
    fn test_pointer_down_hit_tests_bounds() {
        use gpui::{point, px, size};

        let mut state = select(SelectConfig::default());
        state.set_trigger_bounds(Bounds::new(point(px(10.), px(10.)), size(px(100.), px(30.))));
        state.set_panel_bounds(Bounds::new(point(px(10.), px(40.)), size(px(100.), px(200.))));
        state.open();

        assert!(!state.pointer_down_at(point(px(50.), px(20.))));
        assert!(!state.pointer_down_at(point(px(50.), px(100.))));
        assert!(state.is_open());

        assert!(state.pointer_down_at(point(px(300.), px(100.))));
        assert!(!state.is_open());
    }

    #[test]
    fn test_debounced_search_runs_once_with_last_query() {
        let mut state = select(SelectConfig {
            search: true,
            ..Default::default()
        });
        state.sync_props(SelectProps::new(
            Rc::from(vec![
                SelectOption::labeled(1, "apple"),
                SelectOption::labeled(2, "banana"),
                SelectOption::labeled(3, "apricot"),
            ]),
            SelectConfig {
                search: true,
                ..Default::default()
            },
        ));
        let queries = state.fuzzy_index().queries();

        let tickets: Vec<_> = ["a", "ap", "app"]
            .into_iter()
            .filter_map(|text| state.search_input(text, &mut ()))
            .collect();
        assert_eq!(tickets.len(), 3);
        assert!(state.is_open(), "typing opens the panel");

        let ran: Vec<_> = tickets
            .into_iter()
            .map(|ticket| state.run_search(ticket))
            .collect();

        assert_eq!(ran, vec![false, false, true]);
        assert_eq!(state.fuzzy_index().queries(), queries + 1);
        assert_eq!(values(&state.data().options), vec![1]);
    }

    #[test]
    fn test_empty_query_restores_unfiltered_options() {
        let mut state = select(SelectConfig {
            search: true,
            multiple: true,
            ..Default::default()
        });
        state.select_value(1).unwrap();

        let ticket = state.search_input("two", &mut ()).unwrap();
        state.run_search(ticket);
        assert_eq!(values(&state.data().options), vec![2]);

        assert_eq!(state.search_input("", &mut ()), None);
        assert_eq!(values(&state.data().options), vec![2, 3]);
        assert!(!state.run_search(ticket));
    }

    #[test]
    fn test_index_rebuilds_only_when_candidates_change() {
        let options = numbers();
        let config = SelectConfig {
            search: true,
            ..Default::default()
        };
        let mut state = SelectState::<i32, ()>::new(config.clone());

        for _ in 0..3 {
            state.sync_props(SelectProps::new(options.clone(), config.clone()));
        }
        assert_eq!(state.fuzzy_index().rebuilds(), 1);

        state.sync_props(SelectProps::new(numbers(), config));
        assert_eq!(state.fuzzy_index().rebuilds(), 2);
    }

    #[test]
    fn test_arrow_keys_cycle_rows_and_reverse_upward() {
        let mut state = select(SelectConfig::default());
        state.focus(&mut ());

        let down = state.key_down(SelectKey::Down, KeyTarget::Input, &mut ());
        assert_eq!(down, Some(KeyEffect::FocusRow(0)));
        state.focus_option(0, &mut ());

        assert_eq!(
            state.key_down(SelectKey::Up, KeyTarget::Row(0), &mut ()),
            Some(KeyEffect::FocusRow(2))
        );
        assert_eq!(
            state.key_down(SelectKey::Down, KeyTarget::Outside, &mut ()),
            None
        );

        let mut upward = select(SelectConfig {
            upward: true,
            ..Default::default()
        });
        upward.focus(&mut ());
        assert_eq!(
            upward.key_down(SelectKey::Down, KeyTarget::Input, &mut ()),
            Some(KeyEffect::FocusRow(2))
        );
    }

    #[test]
    fn test_enter_selects_first_search_result() {
        let mut state = select(SelectConfig {
            search: true,
            ..Default::default()
        });
        state.focus(&mut ());
        assert_eq!(state.key_down(SelectKey::Enter, KeyTarget::Input, &mut ()), None);

        let ticket = state.search_input("thr", &mut ()).unwrap();
        state.run_search(ticket);

        let effect = state.key_down(SelectKey::Enter, KeyTarget::Input, &mut ());
        assert!(matches!(effect, Some(KeyEffect::Selected(Some(_)))));
        assert_eq!(state.value(), &SelectValue::Single(Some(3)));
    }

    #[test]
    fn test_enter_on_focused_row_selects_it() {
        let mut state = select(SelectConfig::default());
        state.focus(&mut ());
        state.focus_option(1, &mut ());

        state.key_down(SelectKey::Enter, KeyTarget::Row(1), &mut ());
        assert_eq!(state.value(), &SelectValue::Single(Some(2)));
    }

    #[test]
    fn test_backspace_deletes_last_value_on_empty_query() {
        let mut state = select(SelectConfig {
            search: true,
            multiple: true,
            ..Default::default()
        });
        state.select_value(1).unwrap();
        state.select_value(3).unwrap();

        assert_eq!(
            state.key_down(SelectKey::Backspace, KeyTarget::Input, &mut ()),
            Some(KeyEffect::Deleted)
        );
        assert_eq!(state.value().values(), &[1]);

        state.search_input("t", &mut ());
        assert_eq!(
            state.key_down(SelectKey::Backspace, KeyTarget::Input, &mut ()),
            None
        );
        assert_eq!(state.value().values(), &[1]);
    }

    #[test]
    fn test_escape_closes_immediately() {
        let mut state = select(SelectConfig::default());
        state.focus(&mut ());

        assert_eq!(
            state.key_down(SelectKey::Escape, KeyTarget::Input, &mut ()),
            Some(KeyEffect::Closed)
        );
        assert!(!state.is_open());
        assert_eq!(state.key_down(SelectKey::Escape, KeyTarget::Input, &mut ()), None);
    }

    #[test]
    fn test_all_options_selected_is_displayable() {
        let mut state = select(SelectConfig {
            multiple: true,
            ..Default::default()
        });
        state.focus(&mut ());
        for value in [1, 2, 3] {
            state.select_option(SelectOption::Primitive(value), &mut ());
        }

        assert!(state.data().options.is_empty());
        assert!(state.no_options());
        assert!(state.rows(|term| term.to_string().into()).is_empty());
    }

    #[test]
    fn test_add_option_row_and_listener() {
        let config = SelectConfig {
            search: true,
            multiple: true,
            ..Default::default()
        };
        let log = Log::default();
        let mut state = SelectState::<i32, ()>::new(config.clone());
        let mut props = SelectProps::new(numbers(), config);
        props.add_option = Some(Rc::new(|term| term.parse().ok().map(SelectOption::Primitive)));
        let added = log.clone();
        props.listeners.on_add_option = Some(Rc::new(move |event, _| {
            added.borrow_mut().push(format!("add {}", event.payload().text()))
        }));
        state.sync_props(props);

        state.focus(&mut ());
        state.search_input("42", &mut ());

        let rows = state.rows(|term| format!("Add {term}").into());
        assert_eq!(rows[0].kind, RowKind::Add);
        assert_eq!(&*rows[0].text, "Add 42");

        state.select_row(0, &mut ());
        assert_eq!(state.value().values(), &[42]);
        assert_eq!(*log.borrow(), vec!["add 42"]);

        state.search_input("two", &mut ());
        let rows = state.rows(|term| term.to_string().into());
        assert!(rows.iter().all(|row| row.kind == RowKind::Option));
    }

    #[test]
    fn test_controlled_value_follows_prop() {
        let config = SelectConfig {
            controlled_value: true,
            ..Default::default()
        };
        let mut state = SelectState::<i32, ()>::new(config.clone());

        let props = |value| {
            let mut props = SelectProps::new(numbers(), config.clone());
            props.value = Some(SelectValue::Single(Some(value)));
            props
        };

        state.sync_props(props(1));
        state.select_option(SelectOption::Primitive(2), &mut ());
        assert_eq!(state.value(), &SelectValue::Single(Some(2)));

        state.sync_props(props(1));
        assert_eq!(state.value(), &SelectValue::Single(Some(1)));
    }

    #[test]
    fn test_compact_content_takes_longest_option_when_open() {
        let mut state = select(SelectConfig {
            compact: true,
            ..Default::default()
        });
        let placeholder = SharedString::from("Pick");

        assert_eq!(&*state.compact_content(&placeholder), "Pick");
        state.open();
        assert_eq!(&*state.compact_content(&placeholder), "Three");
    }

    #[test]
    fn test_select_value_rejects_unknown() {
        let mut state = select(SelectConfig::default());
        assert_eq!(state.select_value(9), Err(SelectError::UnknownValue));
        assert!(state.value().is_empty());

        state.select_value(2).unwrap();
        state.clear();
        assert!(state.value().is_empty());
    }

    #[test]
    fn test_upward_falls_back_when_it_does_not_fit() {
        use gpui::{point, px, size};

        let mut state = select(SelectConfig {
            upward: true,
            fixed: true,
            ..Default::default()
        });
        state.open();

        let geometry = PanelGeometry {
            trigger: Bounds::new(point(px(0.), px(50.)), size(px(200.), px(50.))),
            border_top: px(1.),
            border_bottom: px(1.),
            content_height: None,
            max_height: Some(px(200.)),
            viewport: size(px(800.), px(400.)),
        };

        state.set_position(&geometry).unwrap();
        assert!(!state.upward());
        assert!(!state.placement().unwrap().is_above());

        let mut missing = geometry;
        missing.max_height = None;
        assert_eq!(state.set_position(&missing), Err(SelectError::MissingMaxHeight));
    }

    #[test]
    fn test_chips_use_source_text_while_searching() {
        let mut state = select(SelectConfig {
            search: true,
            multiple: true,
            ..Default::default()
        });
        state.select_value(2).unwrap();

        let ticket = state.search_input("thr", &mut ()).unwrap();
        state.run_search(ticket);
        assert_eq!(values(&state.data().options), vec![3]);

        assert_eq!(state.chips(), vec![(2, SharedString::from("Two"))]);
        assert_eq!(&*state.text_for(&2), "Two");
        assert_eq!(state.source_options().len(), 3);
    }

    #[test]
    fn test_search_resets_option_focus() {
        let mut state = select(SelectConfig {
            search: true,
            ..Default::default()
        });
        state.focus(&mut ());
        state.focus_option(1, &mut ());

        let ticket = state.search_input("thr", &mut ()).unwrap();
        assert_eq!(state.focus_index(), None);
        state.focus_option(1, &mut ());
        state.run_search(ticket);
        assert_eq!(state.focus_index(), None);

        let target = state
            .focus_index()
            .map(KeyTarget::Row)
            .unwrap_or(KeyTarget::Input);
        state.key_down(SelectKey::Enter, target, &mut ());
        assert_eq!(state.value(), &SelectValue::Single(Some(3)));
    }

    #[test]
    fn test_new_options_reset_option_focus() {
        let mut state = select(SelectConfig::default());
        state.focus(&mut ());
        state.focus_option(2, &mut ());

        state.set_options(vec![SelectOption::labeled(7, "Seven")]);
        assert_eq!(state.focus_index(), None);

        state.focus_option(0, &mut ());
        state.sync_props(SelectProps::new(numbers(), SelectConfig::default()));
        assert_eq!(state.focus_index(), None);
    }

    #[test]
    fn test_arrow_navigation_reports_focused_option() {
        let log = Log::default();
        let mut state = SelectState::new(SelectConfig::default());
        let mut props = SelectProps::new(numbers(), SelectConfig::default());
        props.listeners.on_select = Some(Rc::new({
            let log = log.clone();
            move |event, _| log.borrow_mut().push(event.payload().text().to_string())
        }));
        state.sync_props(props);
        state.focus(&mut ());

        for _ in 0..2 {
            let target = state
                .focus_index()
                .map(KeyTarget::Row)
                .unwrap_or(KeyTarget::Input);
            if let Some(KeyEffect::FocusRow(index)) =
                state.key_down(SelectKey::Down, target, &mut ())
            {
                state.focus_option(index, &mut ());
            }
        }

        assert_eq!(*log.borrow(), vec!["One", "Two"]);
        assert!(state.value().is_empty(), "focusing an option does not pick it");
    }

    #[test]
    fn test_search_veto_keeps_options_unfiltered() {
        let config = SelectConfig {
            search: true,
            ..Default::default()
        };
        let log = Log::default();
        let mut state = SelectState::new(config.clone());
        let mut props = SelectProps::new(numbers(), config);
        props.listeners.on_search = Some(Rc::new({
            let log = log.clone();
            move |event, _| {
                log.borrow_mut().push(event.payload().to_string());
                event.prevent_default();
            }
        }));
        state.sync_props(props);

        assert_eq!(state.search_input("thr", &mut ()), None);
        assert_eq!(*log.borrow(), vec!["thr"]);
        assert_eq!(&**state.query(), "thr", "the box keeps what was typed");
        assert_eq!(values(&state.data().options), vec![1, 2, 3]);
    }

    #[test]
    fn test_fixed_panel_keeps_position_while_closing() {
        use gpui::{point, px, size};

        let mut state = select(SelectConfig {
            fixed: true,
            ..Default::default()
        });
        state.open();
        state
            .set_position(&PanelGeometry {
                trigger: Bounds::new(point(px(0.), px(50.)), size(px(200.), px(50.))),
                border_top: px(1.),
                border_bottom: px(1.),
                content_height: None,
                max_height: Some(px(200.)),
                viewport: size(px(800.), px(600.)),
            })
            .unwrap();

        state.close();
        assert!(state.placement().is_some(), "a closing panel stays anchored");

        state.open();
        assert!(state.position().is_none(), "reopening measures again");
    }
}
