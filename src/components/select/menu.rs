use std::rc::Rc;

use gpui::{
    AnchoredPositionMode, App, Corner, ElementId, Entity, FontWeight, HighlightStyle,
    InteractiveElement, IntoElement, ParentElement, Pixels, RenderOnce, StatefulInteractiveElement,
    Styled, StyledText, Window, anchored, deferred, div, prelude::FluentBuilder, px, relative,
};
use gpui_squircle::{SquircleStyled, squircle};

use crate::{
    ElementIdExt,
    components::select::{OptionRow, OptionValue, RowKind, SelectHandlers, SelectState},
    extensions::{Deferrable, DeferredConfig},
    locale::{LocaleExt, LocaleKey},
    primitives::{drive_expand_collapse, measure_parent},
    theme::{ThemeExt, ThemeLayerKind},
    utils::PixelsExt,
};

/// The options panel of a [`Select`](super::Select).
///
/// Opens inline below or above the trigger, or anchored to window
/// coordinates when the select is `fixed`.
#[derive(IntoElement)]
pub struct SelectMenu<V: OptionValue> {
    id: ElementId,
    layer: ThemeLayerKind,
    state: Entity<SelectState<V>>,
    handlers: Rc<SelectHandlers>,
    max_height: Pixels,
    deferred_config: DeferredConfig,
}

impl<V: OptionValue> SelectMenu<V> {
    pub fn new(
        id: impl Into<ElementId>,
        state: Entity<SelectState<V>>,
        handlers: Rc<SelectHandlers>,
        max_height: Pixels,
    ) -> Self {
        Self {
            id: id.into(),
            layer: ThemeLayerKind::Tertiary,
            state,
            handlers,
            max_height,
            deferred_config: DeferredConfig::default(),
        }
    }

    pub fn layer(mut self, layer: ThemeLayerKind) -> Self {
        self.layer = layer;
        self
    }

    fn render_row(&self, index: usize, row: OptionRow<V>, window: &Window, cx: &App) -> impl IntoElement {
        let theme = cx.get_theme();
        let (primary_text_color, secondary_text_color) = cx.theme_variant().colors.text.all();
        let accent = cx.theme_variant().colors.accent;
        let hover_color = self.layer.next().resolve(cx);
        let padding = theme.layout.padding.md;
        let line_height = theme.layout.text.default_font.line_height;
        let text_size = theme.layout.text.default_font.sizes.body;
        let horizontal_padding = theme.layout.padding.lg - padding;
        let vertical_padding = theme
            .layout
            .size
            .lg
            .padding_needed_for_height(window, text_size, line_height)
            - padding;

        let text = match row.highlight {
            Some(range) => StyledText::new(row.text).with_highlights([(
                range,
                HighlightStyle {
                    color: Some(primary_text_color.into()),
                    font_weight: Some(FontWeight::SEMIBOLD),
                    ..Default::default()
                },
            )]),
            None => StyledText::new(row.text),
        };

        let on_row_click = self.handlers.on_row_click.clone();

        div()
            .id(self.id.with_suffix("row").with_suffix(row.key))
            .w_full()
            .flex()
            .items_center()
            .px(horizontal_padding)
            .py(vertical_padding)
            .rounded(theme.layout.corner_radii.md - padding)
            .cursor_pointer()
            .text_size(text_size)
            .text_color(secondary_text_color)
            .when(row.selected, |this| this.text_color(primary_text_color))
            .when(row.kind == RowKind::Add, |this| this.text_color(accent.primary))
            .when(row.focused, |this| this.bg(accent.highlight))
            .hover(move |this| this.bg(hover_color))
            .child(text)
            .on_click(move |_event, window, cx| on_row_click(index, window, cx))
    }

    fn render_panel(
        &self,
        inline_height: Option<Pixels>,
        window: &mut Window,
        cx: &mut App,
    ) -> impl IntoElement {
        let background_color = self.layer.resolve(cx);
        let border_color = self.layer.next().resolve(cx);
        let corner_radius = cx.get_theme().layout.corner_radii.md;
        let padding = cx.get_theme().layout.padding.md;
        let secondary_text_color = cx.theme_variant().colors.text.secondary;

        let rows = self
            .state
            .read(cx)
            .rows(|term| cx.translate_term(LocaleKey::AddOption, term));
        let no_options = self.state.read(cx).no_options() && rows.is_empty();

        let state_for_panel = self.state.downgrade();
        let state_for_content = self.state.downgrade();

        div()
            .id(self.id.clone())
            .relative()
            .w_full()
            .overflow_hidden()
            .when_some(inline_height, |this, height| this.h(height))
            .child(
                squircle()
                    .absolute_expand()
                    .rounded(corner_radius)
                    .bg(background_color)
                    .border_color(border_color)
                    .border(px(1.))
                    .border_inside(),
            )
            .child(
                div()
                    .id(self.id.with_suffix("rows"))
                    .relative()
                    .w_full()
                    .max_h(self.max_height)
                    .overflow_y_scroll()
                    .flex()
                    .flex_col()
                    .p(padding)
                    .when(no_options, |this| {
                        this.child(
                            div()
                                .w_full()
                                .p(padding)
                                .text_color(secondary_text_color)
                                .child(cx.translate(LocaleKey::NoOptions)),
                        )
                    })
                    .children(
                        rows.into_iter()
                            .enumerate()
                            .map(|(index, row)| self.render_row(index, row, window, cx)),
                    )
                    .child(measure_parent(move |bounds, _window, cx| {
                        state_for_content
                            .update(cx, |state, _cx| state.set_content_height(bounds.size.height))
                            .ok();
                    })),
            )
            .child(measure_parent(move |bounds, _window, cx| {
                state_for_panel
                    .update(cx, |state, _cx| state.set_panel_bounds(bounds))
                    .ok();
            }))
            // Rows are not focusable; keep focus on the trigger and the
            // click away from the trigger's toggle.
            .on_mouse_down(gpui::MouseButton::Left, |_event, window, cx| {
                window.prevent_default();
                cx.stop_propagation();
            })
    }
}

impl<V: OptionValue> Deferrable for SelectMenu<V> {
    const DEFAULT_PRIORITY: usize = 1;

    fn deferred_config_mut(&mut self) -> &mut DeferredConfig {
        &mut self.deferred_config
    }

    fn deferred_config(&self) -> &DeferredConfig {
        &self.deferred_config
    }
}

impl<V: OptionValue> RenderOnce for SelectMenu<V> {
    fn render(self, window: &mut Window, cx: &mut App) -> impl IntoElement {
        let gap = cx.get_theme().layout.padding.md;

        // A close only becomes visible after this drive starts its animation.
        let natural = self
            .state
            .read(cx)
            .content_height()
            .unwrap_or(self.max_height);
        let inline_height =
            drive_expand_collapse(&self.state, SelectState::panel_mut, natural, window, cx);

        let state = self.state.read(cx);
        if !state.should_render() {
            return div().into_any_element();
        }

        if state.config().fixed {
            let Some((placement, width)) = state
                .placement()
                .zip(state.position().map(|position| position.width))
            else {
                return div().into_any_element();
            };

            let above = placement.is_above();
            let anchor = placement.anchor_point(window.viewport_size());
            let panel = self.render_panel(inline_height, window, cx);

            return deferred(
                anchored()
                    .position_mode(AnchoredPositionMode::Window)
                    .position(anchor)
                    .anchor(if above {
                        Corner::BottomLeft
                    } else {
                        Corner::TopLeft
                    })
                    .child(
                        div()
                            .w(width)
                            .when(above, |this| this.pb(gap))
                            .when(!above, |this| this.pt(gap))
                            .child(panel),
                    ),
            )
            .priority(Self::DEFAULT_PRIORITY)
            .into_any_element();
        }

        let upward = state.upward();
        let panel = self.render_panel(inline_height, window, cx);

        let element = div()
            .absolute()
            .left_0()
            .w_full()
            .when(upward, |this| this.bottom(relative(1.)).pb(gap))
            .when(!upward, |this| this.top_full().pt(gap))
            .child(panel);

        self.apply_deferred(element)
    }
}
