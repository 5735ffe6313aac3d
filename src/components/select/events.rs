use std::rc::Rc;

use gpui::{App, MouseDownEvent, SharedString, Window};

use crate::{
    components::select::{SelectOption, SelectValue},
    primitives::Listener,
};

/// Caller supplied listeners of a select. Replaced on every render.
pub struct SelectListeners<V, Cx = App> {
    /// The selected value is about to change.
    pub on_change: Option<Listener<SelectValue<V>, Cx>>,
    /// The search query changed.
    pub on_search: Option<Listener<SharedString, Cx>>,
    /// An option received keyboard focus.
    pub on_select: Option<Listener<SelectOption<V>, Cx>>,
    /// The select gained focus. Preventing it keeps the panel closed.
    pub on_focus: Option<Listener<(), Cx>>,
    /// The select lost focus. Preventing it keeps the panel open.
    pub on_blur: Option<Listener<(), Cx>>,
    /// A selected value chip was clicked.
    pub on_click_value: Option<Listener<V, Cx>>,
    /// The add row was picked. Preventing it drops the new option.
    pub on_add_option: Option<Listener<SelectOption<V>, Cx>>,
}

impl<V, Cx> Default for SelectListeners<V, Cx> {
    fn default() -> Self {
        Self {
            on_change: None,
            on_search: None,
            on_select: None,
            on_focus: None,
            on_blur: None,
            on_click_value: None,
            on_add_option: None,
        }
    }
}

impl<V, Cx> Clone for SelectListeners<V, Cx> {
    fn clone(&self) -> Self {
        Self {
            on_change: self.on_change.clone(),
            on_search: self.on_search.clone(),
            on_select: self.on_select.clone(),
            on_focus: self.on_focus.clone(),
            on_blur: self.on_blur.clone(),
            on_click_value: self.on_click_value.clone(),
            on_add_option: self.on_add_option.clone(),
        }
    }
}

pub type MouseDownHandler = Rc<dyn Fn(&MouseDownEvent, &mut Window, &mut App)>;
pub type FocusHandler = Rc<dyn Fn(&mut Window, &mut App)>;
pub type RowHandler = Rc<dyn Fn(usize, &mut Window, &mut App)>;

/// Window-facing handlers of one select instance.
///
/// Built once when the instance is created and reused on every render, so
/// listeners registered with them keep their identity.
pub struct SelectHandlers {
    /// Mouse down anywhere in the window.
    pub on_window_mouse_down: MouseDownHandler,
    /// Mouse down on the trigger.
    pub on_trigger_mouse_down: MouseDownHandler,
    /// Focus entered the select.
    pub on_focus: FocusHandler,
    /// Focus left the select.
    pub on_blur: FocusHandler,
    /// An option row was clicked.
    pub on_row_click: RowHandler,
}
