use gpui::{App, KeyBinding, Window};

use crate::{
    components::select::{Cancel, Confirm, SelectDown, SelectUp},
    primitives::input,
    theme::ThemeExt,
};

const SELECT_CONTEXT: &str = "Select";

/// Registers the key bindings of the controls. Call once at startup.
pub fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("up", SelectUp, Some(SELECT_CONTEXT)),
        KeyBinding::new("down", SelectDown, Some(SELECT_CONTEXT)),
        KeyBinding::new("enter", Confirm, Some(SELECT_CONTEXT)),
        KeyBinding::new("escape", Cancel, Some(SELECT_CONTEXT)),
    ]);
    input::bind_keys(cx);
    tracing::debug!("control key bindings registered");
}

/// Applies the theme's base text size to `window`.
pub fn init_for_window(window: &mut Window, cx: &mut App) {
    window.set_rem_size(cx.get_theme().layout.text.base_size);
}
