use std::{rc::Rc, time::Duration};

use gpui::{
    App, Context, ElementId, Entity, FocusHandle, InteractiveElement, IntoElement, Length, MouseButton, ParentElement, Pixels, RenderOnce, SharedString,
    StatefulInteractiveElement, Styled, WeakEntity, Window, actions, div, ease_out_quint,
    prelude::FluentBuilder, px, relative,
};
use gpui_squircle::{SquircleStyled, squircle};
use gpui_transitions::Transition;

use crate::{
    ControlIcon, ElementIdExt,
    components::Icon,
    locale::{LocaleExt, LocaleKey},
    primitives::{
        ControlEvent,
        input::{self, Input, InputState},
        measure_parent,
    },
    theme::{ThemeExt, ThemeLayerKind},
    utils::PixelsExt,
    views::Root,
};

mod option;
pub use option::*;

mod options;
pub use options::*;

mod search;
pub use search::*;

mod position;
pub use position::*;

mod events;
pub use events::*;

mod state;
pub use state::*;

mod menu;
pub use menu::*;

actions!(
    select,
    [
        /// Moves keyboard focus to the previous option.
        SelectUp,
        /// Moves keyboard focus to the next option.
        SelectDown,
        /// Picks the focused option, or the first search result.
        Confirm,
        /// Closes the options panel.
        Cancel,
    ]
);

struct SelectStyles {
    width: Length,
}

impl Default for SelectStyles {
    fn default() -> Self {
        Self {
            width: Length::Auto,
        }
    }
}

/// A dropdown select with optional search, multiple selection and keyboard
/// navigation.
///
/// The select keeps its state across renders under its id. Props passed on
/// each render are reconciled with that state the way a controlled input
/// is: an unchanged `value` prop does not override a local selection unless
/// the select is [`controlled`](Self::controlled).
///
/// The window's root view must be a [`Root`] for clicks outside the select
/// to close it.
#[derive(IntoElement)]
pub struct Select<V: OptionValue> {
    id: ElementId,
    state: Option<Entity<SelectState<V>>>,
    options: Rc<[SelectOption<V>]>,
    value: Option<SelectValue<V>>,
    default_value: Option<SelectValue<V>>,
    config: SelectConfig,
    debounce: Option<Duration>,
    listeners: SelectListeners<V>,
    add_option: Option<AddOptionFn<V>>,
    normalize: Option<NormalizeFn>,
    placeholder: Option<SharedString>,
    icon: Option<SharedString>,
    icon_end: Option<SharedString>,
    max_height: Option<Pixels>,
    layer: ThemeLayerKind,
    disabled: bool,
    style: SelectStyles,
}

impl<V: OptionValue> Select<V> {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            state: None,
            options: Rc::from(Vec::new()),
            value: None,
            default_value: None,
            config: SelectConfig::default(),
            debounce: None,
            listeners: SelectListeners::default(),
            add_option: None,
            normalize: None,
            placeholder: None,
            icon: None,
            icon_end: None,
            max_height: None,
            layer: ThemeLayerKind::Tertiary,
            disabled: false,
            style: SelectStyles::default(),
        }
    }

    /// Renders over a caller-owned state instead of one kept under the
    /// select's id, giving the caller the programmatic API
    /// ([`SelectState::open`], [`SelectState::select_value`], ...).
    pub fn state(mut self, state: Entity<SelectState<V>>) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the options. Pass the same `Rc` on every render to avoid
    /// re-indexing them for search.
    pub fn options(mut self, options: impl Into<Rc<[SelectOption<V>]>>) -> Self {
        self.options = options.into();
        self
    }

    pub fn value(mut self, value: impl Into<SelectValue<V>>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<SelectValue<V>>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Lets the user filter options by typing.
    pub fn search(mut self, search: bool) -> Self {
        self.config.search = search;
        self
    }

    /// Holds a list of values instead of a single one.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.config.multiple = multiple;
        self
    }

    pub fn default_open(mut self, default_open: bool) -> Self {
        self.config.default_open = default_open;
        self
    }

    /// Prefers opening the options above the trigger.
    pub fn upward(mut self, upward: bool) -> Self {
        self.config.upward = upward;
        self
    }

    /// Anchors the options to the window so clipping ancestors do not cut
    /// them off.
    pub fn fixed(mut self, fixed: bool) -> Self {
        self.config.fixed = fixed;
        self
    }

    /// Sizes the trigger to its content.
    pub fn compact(mut self, compact: bool) -> Self {
        self.config.compact = compact;
        self
    }

    /// Makes the `value` prop win over local selection on every render.
    pub fn controlled(mut self, controlled: bool) -> Self {
        self.config.controlled_value = controlled;
        self
    }

    /// Keeps selected values in the option list of a multiple select.
    pub fn exclude_selected(mut self, exclude_selected: bool) -> Self {
        self.config.exclude_selected = exclude_selected;
        self
    }

    /// Renders the options even while closed.
    pub fn force_render(mut self, force_render: bool) -> Self {
        self.config.force_render = force_render;
        self
    }

    /// The initial search query, restored when the select closes.
    pub fn query(mut self, query: impl Into<SharedString>) -> Self {
        self.config.query = query.into();
        self
    }

    pub fn fuzzy(mut self, fuzzy: FuzzyConfig) -> Self {
        self.config.fuzzy = fuzzy;
        self
    }

    /// Overrides the theme's search debounce.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<SharedString>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Icon shown before the value, by glyph name.
    pub fn icon(mut self, icon: impl Into<SharedString>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Icon shown in place of the chevron, by glyph name.
    pub fn icon_end(mut self, icon: impl Into<SharedString>) -> Self {
        self.icon_end = Some(icon.into());
        self
    }

    /// Overrides the theme's maximum height of the options panel.
    pub fn max_height(mut self, max_height: Pixels) -> Self {
        self.max_height = Some(max_height);
        self
    }

    pub fn layer(mut self, layer: ThemeLayerKind) -> Self {
        self.layer = layer;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets a fixed width.
    pub fn w(mut self, width: impl Into<Length>) -> Self {
        self.style.width = width.into();
        self
    }

    /// Sets width to fill the parent container.
    pub fn w_full(mut self) -> Self {
        self.style.width = relative(100.).into();
        self
    }

    pub fn on_change(
        mut self,
        listener: impl Fn(&mut ControlEvent<SelectValue<V>>, &mut App) + 'static,
    ) -> Self {
        self.listeners.on_change = Some(Rc::new(listener));
        self
    }

    pub fn on_search(
        mut self,
        listener: impl Fn(&mut ControlEvent<SharedString>, &mut App) + 'static,
    ) -> Self {
        self.listeners.on_search = Some(Rc::new(listener));
        self
    }

    /// Called when an option receives keyboard focus.
    pub fn on_select(
        mut self,
        listener: impl Fn(&mut ControlEvent<SelectOption<V>>, &mut App) + 'static,
    ) -> Self {
        self.listeners.on_select = Some(Rc::new(listener));
        self
    }

    pub fn on_focus(mut self, listener: impl Fn(&mut ControlEvent<()>, &mut App) + 'static) -> Self {
        self.listeners.on_focus = Some(Rc::new(listener));
        self
    }

    pub fn on_blur(mut self, listener: impl Fn(&mut ControlEvent<()>, &mut App) + 'static) -> Self {
        self.listeners.on_blur = Some(Rc::new(listener));
        self
    }

    /// Called when a selected value chip is clicked.
    pub fn on_click_value(
        mut self,
        listener: impl Fn(&mut ControlEvent<V>, &mut App) + 'static,
    ) -> Self {
        self.listeners.on_click_value = Some(Rc::new(listener));
        self
    }

    pub fn on_add_option(
        mut self,
        listener: impl Fn(&mut ControlEvent<SelectOption<V>>, &mut App) + 'static,
    ) -> Self {
        self.listeners.on_add_option = Some(Rc::new(listener));
        self
    }

    /// Offers to add the search term as a new option. `factory` builds the
    /// option, or returns `None` when the term is not acceptable.
    pub fn add_option(
        mut self,
        factory: impl Fn(&str) -> Option<SelectOption<V>> + 'static,
    ) -> Self {
        self.add_option = Some(Rc::new(factory));
        self
    }

    /// Rewrites every keystroke of the search query.
    pub fn normalize(mut self, normalize: impl Fn(&str) -> String + 'static) -> Self {
        self.normalize = Some(Rc::new(normalize));
        self
    }
}

/// Runs `update` on the select, unless it was released.
fn update_select<V: OptionValue, R>(
    state: &WeakEntity<SelectState<V>>,
    cx: &mut App,
    update: impl FnOnce(&mut SelectState<V>, &mut Context<SelectState<V>>) -> R,
) -> Option<R> {
    state
        .update(cx, update)
        .inspect_err(|_| tracing::trace!("event for released select ignored"))
        .ok()
}

/// Runs `close` on the next tick, after any event already queued.
fn defer_close<V: OptionValue>(state: WeakEntity<SelectState<V>>, close: DeferredClose, cx: &mut App) {
    cx.spawn(async move |cx| {
        let closed = state.update(cx, |state, cx| {
            if state.run_deferred_close(close) {
                cx.notify();
            }
        });
        if closed.is_err() {
            tracing::trace!(?close, "deferred close after release");
        }
    })
    .detach();
}

/// Runs the search scheduled as `ticket` once `delay` passed.
fn debounce_search<V: OptionValue>(
    state: WeakEntity<SelectState<V>>,
    ticket: SearchTicket,
    delay: Duration,
    cx: &mut App,
) {
    cx.spawn(async move |cx| {
        cx.background_executor().timer(delay).await;
        let searched = state.update(cx, |state, cx| {
            if state.run_search(ticket) {
                cx.notify();
            }
        });
        if searched.is_err() {
            tracing::trace!(?ticket, "debounced search after release");
        }
    })
    .detach();
}

/// The search box now reads `text`. Schedules the debounced search.
fn search_changed<V: OptionValue>(state: &WeakEntity<SelectState<V>>, text: &str, cx: &mut App) {
    let ticket = update_select(state, cx, |select, cx| {
        let ticket = select.search_input(text, cx);
        cx.notify();
        ticket.map(|ticket| (ticket, select.config().debounce))
    })
    .flatten();

    if let Some((ticket, delay)) = ticket {
        debounce_search(state.clone(), ticket, delay, cx);
    }
}

/// Hands `key` to the select as if pressed on its focused row, or on the
/// trigger when no row has focus. Backspace always comes from the search box.
fn handle_key<V: OptionValue>(state: &WeakEntity<SelectState<V>>, key: SelectKey, cx: &mut App) {
    let effect = update_select(state, cx, |select, cx| {
        let target = match select.focus_index() {
            Some(index) if key != SelectKey::Backspace => KeyTarget::Row(index),
            _ => KeyTarget::Input,
        };

        let effect = select.key_down(key, target, cx);
        if let Some(KeyEffect::FocusRow(index)) = effect {
            select.focus_option(index, cx);
        }
        cx.notify();
        effect
    })
    .flatten();

    if let Some(KeyEffect::Selected(Some(close))) = effect {
        defer_close(state.clone(), close, cx);
    }
}

fn select_handlers<V: OptionValue>(
    state: WeakEntity<SelectState<V>>,
    focus_handle: FocusHandle,
    input_focus_handle: FocusHandle,
) -> SelectHandlers {
    SelectHandlers {
        on_window_mouse_down: Rc::new({
            let state = state.clone();
            move |event, _window, cx| {
                update_select(&state, cx, |select, cx| {
                    if select.pointer_down_at(event.position) {
                        cx.notify();
                    }
                });
            }
        }),
        on_trigger_mouse_down: Rc::new({
            let state = state.clone();
            move |_event, window, cx| {
                if !focus_handle.contains_focused(window, cx) {
                    let search = state
                        .upgrade()
                        .is_some_and(|select| select.read(cx).config().search);
                    if search {
                        input_focus_handle.focus(window, cx);
                    } else {
                        focus_handle.focus(window, cx);
                    }
                    return;
                }

                update_select(&state, cx, |select, cx| {
                    if select.toggle_options() {
                        cx.notify();
                    }
                });
            }
        }),
        on_focus: Rc::new({
            let state = state.clone();
            move |_window, cx| {
                update_select(&state, cx, |select, cx| {
                    select.focus(cx);
                    cx.notify();
                });
            }
        }),
        on_blur: Rc::new({
            let state = state.clone();
            move |_window, cx| {
                let close = update_select(&state, cx, |select, cx| {
                    let close = select.blur(cx);
                    cx.notify();
                    close
                });

                if let Some(close) = close.flatten() {
                    defer_close(state.clone(), close, cx);
                }
            }
        }),
        on_row_click: Rc::new(move |index, _window, cx| {
            let close = update_select(&state, cx, |select, cx| {
                let close = select.select_row(index, cx);
                cx.notify();
                close
            });

            if let Some(close) = close.flatten() {
                defer_close(state.clone(), close, cx);
            }
        }),
    }
}

/// Adds or removes the select's window listener to match its subscription.
fn sync_window_listener<V: OptionValue>(
    state: &Entity<SelectState<V>>,
    listener_id: ElementId,
    handlers: &SelectHandlers,
    window: &mut Window,
    cx: &mut App,
) {
    let Some(root) = Root::of(window) else {
        tracing::debug!("select rendered outside a Root; outside clicks will not close it");
        return;
    };

    let subscribed = state.read(cx).is_subscribed();
    if root.read(cx).is_listening(listener_id.clone()) == subscribed {
        return;
    }

    let listener = handlers.on_window_mouse_down.clone();
    root.update(cx, |root, _cx| {
        if subscribed {
            root.on_any_mouse_down(listener_id, listener);
        } else {
            root.remove_mouse_down(listener_id);
        }
    });
}

impl<V: OptionValue> RenderOnce for Select<V> {
    fn render(self, window: &mut Window, cx: &mut App) -> impl IntoElement {
        let (primary_text_color, secondary_text_color) = cx.theme_variant().colors.text.all();
        let primary_accent_color = cx.theme_variant().colors.accent.primary;
        let background_color = self.layer.resolve(cx);
        let border_color = self.layer.next().resolve(cx);
        let font_family = cx.get_theme().layout.text.default_font.family[0].clone();
        let line_height = cx.get_theme().layout.text.default_font.line_height;
        let text_size = cx.get_theme().layout.text.default_font.sizes.body;
        let corner_radius = cx.get_theme().layout.corner_radii.md;
        let horizontal_padding = cx.get_theme().layout.padding.lg;
        let gap = cx.get_theme().layout.padding.md;
        let vertical_padding = cx
            .get_theme()
            .layout
            .size
            .lg
            .padding_needed_for_height(window, text_size, line_height);

        let controls = cx.theme_controls();
        let max_height = self.max_height.or(controls.select_max_height);
        let select_duration = controls.select_duration;
        let mut config = self.config;
        config.debounce = self.debounce.unwrap_or(controls.select_debounce);

        let listener_id = self.id.with_suffix("window_listener");

        let focus_handle = window
            .use_keyed_state(
                self.id.with_suffix("state:focus_handle"),
                cx,
                |_window, cx| cx.focus_handle().tab_stop(true),
            )
            .read(cx)
            .clone();

        let state = match self.state {
            Some(state) => state,
            None => window.use_keyed_state(self.id.with_suffix("state"), cx, {
                let config = config.clone();
                move |_window, _cx| SelectState::new(config)
            }),
        };

        window.use_keyed_state(self.id.with_suffix("state:release"), cx, {
            let state = state.clone();
            let listener_id = listener_id.clone();
            move |window, cx: &mut Context<()>| {
                let root = Root::of(window).map(|root| root.downgrade());
                state.update(cx, |_select, cx| {
                    cx.on_release(move |select, cx| {
                        select.unmount();
                        if let Some(root) = root.and_then(|root| root.upgrade()) {
                            root.update(cx, |root, _cx| root.remove_mouse_down(listener_id));
                        }
                    })
                    .detach();
                });
            }
        });

        let search = config.search;
        state.update(cx, |select, _cx| {
            select.panel_mut().size_mut().set_duration(select_duration);
            select.sync_props(SelectProps {
                options: self.options,
                value: self.value,
                default_value: self.default_value,
                config,
                listeners: self.listeners,
                add_option: self.add_option,
                normalize: self.normalize,
            })
        });

        let input_state = window.use_keyed_state(self.id.with_suffix("state:input"), cx, {
            let state = state.downgrade();
            move |_window, cx| {
                let mut input = InputState::new(cx)
                    .on_change(move |text, _window, cx| search_changed(&state, text, cx));
                // Tab stops at the select, which hands focus on to the box.
                input.focus_handle = input.focus_handle.tab_stop(false);
                input
            }
        });
        let input_focus_handle = input_state.read(cx).focus_handle.clone();

        let handlers = state.read(cx).handlers(|| {
            select_handlers(
                state.downgrade(),
                focus_handle.clone(),
                input_focus_handle.clone(),
            )
        });

        window.use_keyed_state(
            self.id.with_suffix("state:focus_subscriptions"),
            cx,
            |window, cx| {
                let on_focus = handlers.on_focus.clone();
                let on_blur = handlers.on_blur.clone();
                [
                    window.on_focus_in(&focus_handle, cx, move |window, cx| on_focus(window, cx)),
                    window.on_focus_out(&focus_handle, cx, move |_event, window, cx| {
                        on_blur(window, cx)
                    }),
                ]
            },
        );

        let is_disabled = self.disabled;
        let is_focus = focus_handle.contains_focused(window, cx);
        if is_disabled && is_focus {
            window.blur();
        }

        if search {
            // Typing goes to the search box, also after tabbing in.
            if !is_disabled && focus_handle.is_focused(window) {
                input_focus_handle.focus(window, cx);
            }

            let query = state.read(cx).query().clone();
            input_state.update(cx, |input, cx| {
                input.sync_value(query, cx);
            });
        }

        sync_window_listener(&state, listener_id, &handlers, window, cx);

        let select = state.read(cx);
        let is_open = select.is_open();

        if is_open && select.position().is_none() {
            match select.trigger_bounds() {
                Some(trigger) => {
                    let geometry = PanelGeometry {
                        trigger,
                        border_top: px(1.),
                        border_bottom: px(1.),
                        content_height: select.content_height(),
                        max_height,
                        viewport: window.viewport_size(),
                    };

                    if let Err(error) = state.update(cx, |select, _cx| select.set_position(&geometry))
                    {
                        panic!("{error}");
                    }
                }
                // Not laid out yet; position on the next frame.
                None => window.request_animation_frame(),
            }
        }

        let chevron = Transition::new(
            self.id.with_suffix("state:transition:chevron"),
            window,
            cx,
            select_duration,
            move |_window, _cx| if is_open { 1. } else { 0. },
        )
        .with_easing(ease_out_quint());
        chevron.set_goal(cx, if is_open { 1. } else { 0. });
        let chevron_delta = chevron.evaluate(window, cx);

        let select = state.read(cx);
        let config = select.config().clone();
        let placeholder = self
            .placeholder
            .unwrap_or_else(|| cx.translate(LocaleKey::Select));
        let compact_content = config
            .compact
            .then(|| select.compact_content(&placeholder));
        let chips = if config.multiple {
            select.chips()
        } else {
            Vec::new()
        };
        // A search select mirrors the selected text into its search box.
        let label: Option<SharedString> = match select.value() {
            SelectValue::Single(Some(value)) if !config.search => Some(select.text_for(value)),
            _ => None,
        };
        let has_value = !select.value().is_empty();

        let weak_state = state.downgrade();
        let max_height = max_height.unwrap_or(px(0.));

        div()
            .id(self.id.clone())
            .key_context("Select")
            .relative()
            .cursor(if is_disabled {
                gpui::CursorStyle::OperationNotAllowed
            } else {
                gpui::CursorStyle::PointingHand
            })
            .when(config.compact, |this| this.w_auto())
            .when(!config.compact, |this| this.w(self.style.width))
            .h_auto()
            .px(horizontal_padding)
            .py(vertical_padding)
            .flex()
            .flex_col()
            .when(is_disabled, |this| this.opacity(0.5))
            .child(
                squircle()
                    .absolute_expand()
                    .rounded(corner_radius)
                    .bg(background_color)
                    .border(px(1.))
                    .border_inside()
                    .border_color(if is_focus {
                        primary_accent_color
                    } else {
                        border_color
                    }),
            )
            .child(
                div()
                    .w_full()
                    .flex()
                    .items_center()
                    .justify_between()
                    .gap(gap)
                    .text_size(text_size)
                    .text_color(secondary_text_color)
                    .font_family(font_family)
                    .when_some(self.icon, |this, icon| {
                        this.child(Icon::named(icon).size(px(14.)).color(secondary_text_color))
                    })
                    .child(
                        div()
                            .flex_1()
                            .flex()
                            .flex_wrap()
                            .items_center()
                            .gap(gap)
                            .children(chips.into_iter().enumerate().map(|(index, (value, text))| {
                                let state_for_click = weak_state.clone();
                                let state_for_delete = weak_state.clone();
                                let value_for_delete = value.clone();

                                div()
                                    .id(self.id.with_suffix("chip").with_suffix(index.to_string()))
                                    .flex()
                                    .items_center()
                                    .gap(px(4.))
                                    .px(gap)
                                    .rounded(corner_radius)
                                    .bg(border_color)
                                    .text_color(primary_text_color)
                                    .child(text)
                                    .child(
                                        div()
                                            .id(self
                                                .id
                                                .with_suffix("chip_delete")
                                                .with_suffix(index.to_string()))
                                            .child(
                                                Icon::new(ControlIcon::Close)
                                                    .size(px(10.))
                                                    .color(secondary_text_color),
                                            )
                                            .on_mouse_down(MouseButton::Left, move |_event, window, cx| {
                                                window.prevent_default();
                                                cx.stop_propagation();
                                                update_select(&state_for_delete, cx, |select, cx| {
                                                    if select.delete_value(&value_for_delete, cx) {
                                                        cx.notify();
                                                    }
                                                });
                                            }),
                                    )
                                    .on_click(move |_event, _window, cx| {
                                        cx.stop_propagation();
                                        update_select(&state_for_click, cx, |select, cx| {
                                            select.click_value(&value, cx)
                                        });
                                    })
                            }))
                            .map(|this| match label {
                                _ if config.search => this.child(
                                    Input::new(self.id.with_suffix("search"), input_state.clone())
                                        .disabled(is_disabled)
                                        .placeholder(if config.multiple && has_value {
                                            SharedString::default()
                                        } else {
                                            placeholder.clone()
                                        })
                                        .text_color(primary_text_color)
                                        .placeholder_text_color(secondary_text_color)
                                        .selection_color(primary_accent_color.opacity(0.3))
                                        .flex_1()
                                        .min_w(px(40.)),
                                ),
                                Some(label) => this.child(
                                    div().text_color(primary_text_color).child(label),
                                ),
                                None if config.multiple && has_value => this,
                                None => this.child(placeholder.clone()),
                            }),
                    )
                    .child(
                        self.icon_end
                            .map(Icon::named)
                            .unwrap_or_else(|| Icon::new(ControlIcon::ChevronDown))
                            .size(px(11.))
                            .color(secondary_text_color)
                            .rotate(gpui::radians(chevron_delta * std::f32::consts::PI)),
                    ),
            )
            .when_some(compact_content, |this, content| {
                this.child(div().invisible().h_0().overflow_hidden().child(content))
            })
            .child(measure_parent({
                let state = weak_state.clone();
                move |bounds, _window, cx| {
                    state
                        .update(cx, |select, _cx| select.set_trigger_bounds(bounds))
                        .ok();
                }
            }))
            .child(
                SelectMenu::new(
                    self.id.with_suffix("menu"),
                    state.clone(),
                    handlers.clone(),
                    max_height,
                )
                .layer(self.layer),
            )
            .when(!is_disabled, |this| {
                let on_trigger_mouse_down = handlers.on_trigger_mouse_down.clone();
                let state_for_up = weak_state.clone();
                let state_for_down = weak_state.clone();
                let state_for_confirm = weak_state.clone();
                let state_for_cancel = weak_state.clone();
                let state_for_delete = weak_state.clone();

                this.track_focus(&focus_handle)
                    .on_mouse_down(MouseButton::Left, move |event, window, cx| {
                        window.prevent_default();
                        cx.stop_propagation();
                        on_trigger_mouse_down(event, window, cx);
                    })
                    .on_action(move |_: &SelectUp, _window, cx| {
                        handle_key(&state_for_up, SelectKey::Up, cx)
                    })
                    .on_action(move |_: &SelectDown, _window, cx| {
                        handle_key(&state_for_down, SelectKey::Down, cx)
                    })
                    .on_action(move |_: &Confirm, _window, cx| {
                        handle_key(&state_for_confirm, SelectKey::Enter, cx)
                    })
                    .on_action(move |_: &Cancel, _window, cx| {
                        handle_key(&state_for_cancel, SelectKey::Escape, cx)
                    })
                    .on_action(move |_: &input::Backspace, _window, cx| {
                        handle_key(&state_for_delete, SelectKey::Backspace, cx)
                    })
            })
    }
}

#[cfg(all(test, feature = "test-support"))]
mod tests {
    use super::*;
    use gpui::{
        AppContext, Modifiers, Render, TestAppContext, VisualTestContext, WindowHandle, point,
    };
    use std::cell::RefCell;

    use crate::{init, theme::Theme};

    type Changes = Rc<RefCell<Vec<Vec<i32>>>>;

    struct SelectView {
        state: Entity<SelectState<i32>>,
        options: Rc<[SelectOption<i32>]>,
        multiple: bool,
        search: bool,
        changes: Changes,
    }

    impl Render for SelectView {
        fn render(&mut self, _window: &mut Window, _cx: &mut gpui::Context<Self>) -> impl IntoElement {
            let changes = self.changes.clone();

            div().size_full().p(px(20.)).child(
                Select::new("numbers")
                    .state(self.state.clone())
                    .options(self.options.clone())
                    .multiple(self.multiple)
                    .search(self.search)
                    .max_height(px(200.))
                    .w(px(200.))
                    .on_change(move |event, _cx| {
                        changes.borrow_mut().push(event.payload().values().to_vec())
                    }),
            )
        }
    }

    fn numbers() -> Rc<[SelectOption<i32>]> {
        Rc::from(vec![
            SelectOption::labeled(1, "One"),
            SelectOption::labeled(2, "Two"),
            SelectOption::labeled(3, "Three"),
        ])
    }

    struct Opened {
        window: WindowHandle<Root>,
        state: Entity<SelectState<i32>>,
        changes: Changes,
    }

    fn open_select(cx: &mut TestAppContext, multiple: bool, search: bool) -> Opened {
        let changes = Changes::default();
        let state = cx.new(|_cx| SelectState::new(SelectConfig::default()));

        let window = cx.update(|cx| {
            init(cx);
            cx.set_theme(Theme::default_theme());

            let changes = changes.clone();
            let state = state.clone();
            cx.open_window(Default::default(), |window, cx| {
                let view = cx.new(|_cx| SelectView {
                    state,
                    options: numbers(),
                    multiple,
                    search,
                    changes,
                });
                cx.new(|cx| Root::new(view, window, cx))
            })
            .unwrap()
        });

        Opened {
            window,
            state,
            changes,
        }
    }

    fn settle(cx: &mut VisualTestContext) {
        cx.executor().advance_clock(Duration::from_millis(500));
        cx.run_until_parked();
    }

    fn click_trigger(cx: &mut VisualTestContext) {
        cx.simulate_click(point(px(40.), px(30.)), Modifiers::none());
        settle(cx);
    }

    #[gpui::test]
    fn test_click_opens_and_subscribes(cx: &mut TestAppContext) {
        let Opened { window, .. } = open_select(cx, false, false);
        let root = window.root(cx).unwrap();
        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        click_trigger(cx);

        root.read_with(cx, |root, _| {
            assert!(root.is_listening(ElementId::from("numbers").with_suffix("window_listener")));
        });

        cx.simulate_click(point(px(400.), px(100.)), Modifiers::none());
        settle(cx);

        root.read_with(cx, |root, _| {
            assert_eq!(root.listener_count(), 0, "closing unsubscribes");
        });
    }

    #[gpui::test]
    fn test_keyboard_selects_option(cx: &mut TestAppContext) {
        let Opened {
            window, changes, ..
        } = open_select(cx, false, false);
        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        click_trigger(cx);

        cx.dispatch_action(SelectDown);
        cx.dispatch_action(SelectDown);
        cx.dispatch_action(Confirm);
        settle(cx);

        assert_eq!(*changes.borrow(), vec![vec![2]]);
    }

    #[gpui::test]
    fn test_typing_searches_and_enter_picks_first(cx: &mut TestAppContext) {
        let Opened {
            window, changes, ..
        } = open_select(cx, true, true);
        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        click_trigger(cx);

        cx.simulate_keystrokes("t h r");
        settle(cx);
        cx.dispatch_action(Confirm);
        settle(cx);

        assert_eq!(*changes.borrow(), vec![vec![3]]);
    }

    #[gpui::test]
    fn test_multiple_chips_show_option_text(cx: &mut TestAppContext) {
        let Opened { window, state, .. } = open_select(cx, true, true);
        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        click_trigger(cx);

        cx.simulate_keystrokes("t w o");
        settle(cx);
        cx.dispatch_action(Confirm);
        settle(cx);

        state.read_with(cx, |select, _| {
            assert_eq!(select.chips(), vec![(2, SharedString::from("Two"))]);
            assert!(select.query().is_empty(), "picking clears the search box");
        });
    }

    #[gpui::test]
    fn test_backspace_in_empty_search_removes_last_chip(cx: &mut TestAppContext) {
        let Opened {
            window,
            state,
            changes,
        } = open_select(cx, true, true);
        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        click_trigger(cx);
        state.update(cx, |select, cx| {
            select.select_value(1).unwrap();
            select.select_value(3).unwrap();
            cx.notify();
        });
        cx.run_until_parked();

        cx.simulate_keystrokes("backspace");
        settle(cx);

        assert_eq!(*changes.borrow(), vec![vec![1]]);
        state.read_with(cx, |select, _| {
            assert_eq!(select.chips(), vec![(1, SharedString::from("One"))]);
        });
    }

    #[gpui::test]
    fn test_close_animates_out(cx: &mut TestAppContext) {
        let Opened { window, state, .. } = open_select(cx, false, false);
        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        click_trigger(cx);
        state.read_with(cx, |select, _| {
            assert!(select.is_open());
            assert!(!select.panel().animating());
        });

        cx.simulate_click(point(px(400.), px(100.)), Modifiers::none());
        cx.run_until_parked();

        state.read_with(cx, |select, _| {
            assert!(!select.is_open());
            assert!(select.panel().animating(), "the panel collapses before unmounting");
            assert!(select.should_render());
        });

        settle(cx);
        state.read_with(cx, |select, _| {
            assert!(!select.panel().animating());
            assert!(!select.should_render());
        });
    }
}
