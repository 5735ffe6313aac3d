use std::{rc::Rc, time::Duration};

use gpui::{
    AnyElement, App, Axis, ElementId, Entity, InteractiveElement, IntoElement, ParentElement,
    Pixels, RenderOnce, StatefulInteractiveElement, Styled, Window, div, prelude::FluentBuilder,
};
use gpui_transitions::ExpandCollapse;
use indexmap::IndexMap;

use crate::{
    ElementIdExt,
    primitives::{ControlEvent, Listener, PreviousProp, drive_expand_collapse, emit, measure_parent},
    theme::ThemeExt,
};

/// Event handed to toggle listeners. The payload is the requested open
/// state; preventing it keeps the panel as it is.
pub type ExpandEvent = ControlEvent<bool>;

/// Event handed to accordion listeners: the panel index and its requested
/// open state.
pub type AccordionEvent = ControlEvent<(usize, bool)>;

type ToggleListener = Rc<dyn Fn(&mut ExpandEvent, &mut Window, &mut App)>;

/// Per-instance state of an [`Expand`].
pub struct ExpandState {
    panel: ExpandCollapse,
    natural: Option<Pixels>,
}

impl ExpandState {
    pub fn new(open: Option<bool>, duration: Duration) -> Self {
        Self {
            panel: ExpandCollapse::new(open, Axis::Vertical, duration),
            natural: None,
        }
    }

    pub fn panel(&self) -> &ExpandCollapse {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ExpandCollapse {
        &mut self.panel
    }
}

/// A collapsible panel: a clickable tab and content that expands below it.
///
/// Opens from its `open` prop or by clicking the tab. An unchanged `open`
/// prop does not override a manual toggle.
#[derive(IntoElement)]
pub struct Expand {
    id: ElementId,
    tab: Option<AnyElement>,
    children: Vec<AnyElement>,
    open: Option<bool>,
    duration: Option<Duration>,
    force_render: bool,
    on_toggle: Option<ToggleListener>,
}

impl Expand {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            tab: None,
            children: Vec::new(),
            open: None,
            duration: None,
            force_render: false,
            on_toggle: None,
        }
    }

    pub fn tab(mut self, tab: impl IntoElement) -> Self {
        self.tab = Some(tab.into_any_element());
        self
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    /// Overrides the theme's expand duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Keeps the content rendered while collapsed.
    pub fn force_render(mut self, force_render: bool) -> Self {
        self.force_render = force_render;
        self
    }

    /// Called when the tab is clicked, before toggling.
    pub fn on_toggle(
        mut self,
        listener: impl Fn(&mut ExpandEvent, &mut Window, &mut App) + 'static,
    ) -> Self {
        self.on_toggle = Some(Rc::new(listener));
        self
    }
}

impl ParentElement for Expand {
    fn extend(&mut self, elements: impl IntoIterator<Item = AnyElement>) {
        self.children.extend(elements)
    }
}

fn toggle_expand(
    state: &Entity<ExpandState>,
    on_toggle: Option<&ToggleListener>,
    window: &mut Window,
    cx: &mut App,
) {
    let open = !state.read(cx).panel.is_open();

    if let Some(on_toggle) = on_toggle {
        let mut event = ExpandEvent::new(open);
        on_toggle(&mut event, window, cx);
        if event.default_prevented() {
            return;
        }
    }

    state.update(cx, |state, cx| {
        if state.panel.toggle_open() {
            cx.notify();
        }
    });
}

impl RenderOnce for Expand {
    fn render(self, window: &mut Window, cx: &mut App) -> impl IntoElement {
        let duration = self
            .duration
            .unwrap_or(cx.theme_controls().expand_duration);
        let open = self.open;

        let state = window.use_keyed_state(self.id.with_suffix("state"), cx, |_window, _cx| {
            ExpandState::new(open, duration)
        });

        state.update(cx, |state, _cx| {
            state.panel.sync_prop(open);
            state.panel.size_mut().set_duration(duration);
        });

        let measured = state.read(cx).natural;
        let inline_height = match measured {
            Some(natural) => {
                drive_expand_collapse(&state, ExpandState::panel_mut, natural, window, cx)
            }
            None => {
                // Content has not been laid out yet.
                if state.read(cx).panel.visible() {
                    window.request_animation_frame();
                }
                None
            }
        };

        let panel = state.read(cx).panel();
        let render_content = self.force_render || panel.visible();
        let collapsed = !panel.visible() || measured.is_none();

        let on_toggle = self.on_toggle;
        let state_for_tab = state.clone();
        let state_for_content = state.downgrade();

        div()
            .id(self.id.clone())
            .w_full()
            .flex()
            .flex_col()
            .when_some(self.tab, |this, tab| {
                this.child(
                    div()
                        .id(self.id.with_suffix("tab"))
                        .w_full()
                        .cursor_pointer()
                        .child(tab)
                        .on_click(move |_event, window, cx| {
                            toggle_expand(&state_for_tab, on_toggle.as_ref(), window, cx)
                        }),
                )
            })
            .child(
                div()
                    .id(self.id.with_suffix("panel"))
                    .w_full()
                    .overflow_hidden()
                    .when_some(inline_height, |this, height| this.h(height))
                    .when(collapsed, |this| this.h_0())
                    .when(render_content, |this| {
                        this.child(
                            div()
                                .relative()
                                .w_full()
                                .flex_shrink_0()
                                .children(self.children)
                                .child(measure_parent(move |bounds, _window, cx| {
                                    state_for_content
                                        .update(cx, |state, _cx| {
                                            state.natural = Some(bounds.size.height)
                                        })
                                        .ok();
                                })),
                        )
                    }),
            )
    }
}

/// Open state of an accordion's panels.
pub struct AccordionState<Cx = App> {
    open_all: bool,
    open_by_index: IndexMap<usize, bool>,
    open_prop: PreviousProp<bool>,
    on_change: Option<Listener<(usize, bool), Cx>>,
}

impl<Cx> AccordionState<Cx> {
    pub fn new(open: Option<bool>) -> Self {
        let mut open_prop = PreviousProp::default();
        open_prop.observe(open.as_ref());

        Self {
            open_all: open.unwrap_or(false),
            open_by_index: IndexMap::new(),
            open_prop,
            on_change: None,
        }
    }

    /// Applies this render's props. A changed `open` prop opens or closes
    /// every panel.
    pub fn sync_props(&mut self, open: Option<bool>, on_change: Option<Listener<(usize, bool), Cx>>) {
        if self.open_prop.observe(open.as_ref())
            && self.open_prop.previous().is_some()
            && let Some(open) = open
        {
            self.open_all = open;
        }
        self.on_change = on_change;
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open_all || self.open_by_index.get(&index).copied().unwrap_or(false)
    }

    /// Panel `index` asks to become `open`. Unless `multiple`, every other
    /// panel closes. Returns `false` when the listener vetoed it.
    pub fn toggle(&mut self, index: usize, open: bool, multiple: bool, cx: &mut Cx) -> bool {
        if !emit(self.on_change.as_ref(), (index, open), cx) {
            tracing::trace!(index, open, "accordion change prevented");
            return false;
        }

        if !multiple {
            self.open_by_index.clear();
        }
        self.open_all = false;
        self.open_by_index.insert(index, open);
        true
    }
}

/// A group of [`Expand`] panels where, unless `multiple`, opening one
/// closes the others.
#[derive(IntoElement)]
pub struct Accordion {
    id: ElementId,
    panels: Vec<Expand>,
    multiple: bool,
    open: Option<bool>,
    duration: Option<Duration>,
    force_render: Option<bool>,
    on_change: Option<Listener<(usize, bool)>>,
}

impl Accordion {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self {
            id: id.into(),
            panels: Vec::new(),
            multiple: false,
            open: None,
            duration: None,
            force_render: None,
            on_change: None,
        }
    }

    pub fn panel(mut self, panel: Expand) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn panels(mut self, panels: impl IntoIterator<Item = Expand>) -> Self {
        self.panels.extend(panels);
        self
    }

    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Opens every panel.
    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn force_render(mut self, force_render: bool) -> Self {
        self.force_render = Some(force_render);
        self
    }

    pub fn on_change(
        mut self,
        listener: impl Fn(&mut AccordionEvent, &mut App) + 'static,
    ) -> Self {
        self.on_change = Some(Rc::new(listener));
        self
    }
}

impl RenderOnce for Accordion {
    fn render(self, window: &mut Window, cx: &mut App) -> impl IntoElement {
        let open = self.open;
        let multiple = self.multiple;

        let state = window.use_keyed_state(self.id.with_suffix("state"), cx, |_window, _cx| {
            AccordionState::<App>::new(open)
        });
        state.update(cx, |state, _cx| state.sync_props(open, self.on_change));

        let panels: Vec<Expand> = self
            .panels
            .into_iter()
            .enumerate()
            .map(|(index, panel)| {
                let panel = panel.open(state.read(cx).is_open(index));
                let state = state.downgrade();

                let panel = match self.duration {
                    Some(duration) => panel.duration(duration),
                    None => panel,
                };
                let panel = match self.force_render {
                    Some(force_render) => panel.force_render(force_render),
                    None => panel,
                };

                // The accordion owns the open state and feeds it back as a prop.
                panel.on_toggle(move |event, _window, cx| {
                    let open = *event.payload();
                    event.prevent_default();
                    state
                        .update(cx, |state, cx| {
                            if state.toggle(index, open, multiple, cx) {
                                cx.notify();
                            }
                        })
                        .ok();
                })
            })
            .collect();

        div()
            .id(self.id)
            .w_full()
            .flex()
            .flex_col()
            .children(panels)
    }
}


#[cfg(all(test, feature = "test-support"))]
mod gpui_tests {
    use super::*;
    use gpui::{
        AppContext, Context, Modifiers, Render, TestAppContext, VisualTestContext, point, px,
    };
    use std::cell::RefCell;

    use crate::theme::Theme;

    type Changes = Rc<RefCell<Vec<(usize, bool)>>>;

    struct AccordionView {
        changes: Changes,
    }

    impl Render for AccordionView {
        fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
            let changes = self.changes.clone();

            div().size_full().child(
                Accordion::new("faq")
                    .on_change(move |event, _cx| changes.borrow_mut().push(*event.payload()))
                    .panel(
                        Expand::new("first")
                            .tab(div().h(px(20.)).child("First"))
                            .child(div().h(px(40.)).child("First body")),
                    )
                    .panel(
                        Expand::new("second")
                            .tab(div().h(px(20.)).child("Second"))
                            .child(div().h(px(40.)).child("Second body")),
                    ),
            )
        }
    }

    fn settle(cx: &mut VisualTestContext) {
        cx.run_until_parked();
        cx.executor().advance_clock(Duration::from_millis(500));
        cx.run_until_parked();
    }

    #[gpui::test]
    fn test_tabs_toggle_panels(cx: &mut TestAppContext) {
        let changes = Changes::default();
        let window = cx.update(|cx| {
            cx.set_theme(Theme::default_theme());
            let changes = changes.clone();
            cx.open_window(Default::default(), |_window, cx| {
                cx.new(|_cx| AccordionView { changes })
            })
            .unwrap()
        });
        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        cx.simulate_click(point(px(5.), px(5.)), Modifiers::none());
        settle(cx);

        // The first panel is open now, pushing the second tab down.
        cx.simulate_click(point(px(5.), px(65.)), Modifiers::none());
        settle(cx);

        assert_eq!(*changes.borrow(), vec![(0, true), (1, true)]);
    }
}
