use std::{cell::RefCell, rc::Rc};

use gpui::{
    AnyView, App, Context, ElementId, Entity, InteractiveElement, IntoElement, MouseDownEvent,
    ParentElement, Render, Styled, Window, div,
};
use indexmap::IndexMap;

pub type MouseDownListener = Rc<dyn Fn(&MouseDownEvent, &mut Window, &mut App) + 'static>;

/// Top-level view of a window that renders a child view and window-wide
/// mouse listeners.
///
/// Mouse-down listeners play the role of document-level listeners: they see
/// every mouse down in the window. They are keyed by the registering
/// component and stay registered until removed, so a component subscribes
/// when its popup opens and unsubscribes when it closes or is released.
///
/// ```ignore
/// cx.open_window(options, |window, cx| {
///     let view = cx.new(|_cx| MyView);
///     cx.new(|cx| Root::new(view, window, cx))
/// });
/// ```
pub struct Root {
    view: AnyView,
    on_mouse_down: Rc<RefCell<IndexMap<ElementId, MouseDownListener>>>,
}

impl Root {
    /// Creates a new Root with the given child view.
    pub fn new(view: impl Into<AnyView>, _window: &mut Window, _cx: &mut Context<Self>) -> Self {
        Self {
            view: view.into(),
            on_mouse_down: Rc::default(),
        }
    }

    /// The Root of `window`, if the window's root view is one.
    pub fn of(window: &mut Window) -> Option<Entity<Root>> {
        window.root::<Root>().flatten()
    }

    /// Registers `listener` under `id` for every mouse down in the window,
    /// replacing a listener registered under the same id.
    pub fn on_any_mouse_down(&mut self, id: impl Into<ElementId>, listener: MouseDownListener) {
        let id = id.into();
        tracing::trace!(%id, "window mouse listener added");
        self.on_mouse_down.borrow_mut().insert(id, listener);
    }

    /// Removes the listener registered under `id`. Returns true if found.
    pub fn remove_mouse_down(&mut self, id: impl Into<ElementId>) -> bool {
        let id = id.into();
        let removed = self.on_mouse_down.borrow_mut().shift_remove(&id).is_some();
        if removed {
            tracing::trace!(%id, "window mouse listener removed");
        }
        removed
    }

    pub fn is_listening(&self, id: impl Into<ElementId>) -> bool {
        self.on_mouse_down.borrow().contains_key(&id.into())
    }

    /// Returns how many mouse listeners are registered.
    pub fn listener_count(&self) -> usize {
        self.on_mouse_down.borrow().len()
    }
}

impl Render for Root {
    fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
        let on_mouse_down = self.on_mouse_down.clone();

        div()
            .id("root")
            .size_full()
            .relative()
            .child(self.view.clone())
            .child(
                div()
                    .id("root-mouse-listener")
                    .absolute()
                    .size_full()
                    .on_any_mouse_down(move |event, window, cx| {
                        // Listeners may unsubscribe themselves while running.
                        let listeners: Vec<_> = on_mouse_down.borrow().values().cloned().collect();
                        for listener in listeners {
                            listener(event, window, cx)
                        }
                    }),
            )
    }
}

#[cfg(all(test, feature = "test-support"))]
mod tests {
    use super::*;
    use gpui::{
        AppContext, Modifiers, MouseButton, TestAppContext, VisualTestContext, WindowHandle, point,
        px,
    };

    struct TestView;

    impl Render for TestView {
        fn render(&mut self, _window: &mut Window, _cx: &mut Context<Self>) -> impl IntoElement {
            div().id("test-view").size_full().child("Test Content")
        }
    }

    fn open_root(cx: &mut TestAppContext) -> WindowHandle<Root> {
        cx.update(|cx| {
            cx.open_window(Default::default(), |window, cx| {
                let test_view = cx.new(|_cx| TestView);
                cx.new(|cx| Root::new(test_view, window, cx))
            })
            .unwrap()
        })
    }

    fn counter(hits: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> MouseDownListener {
        let hits = hits.clone();
        Rc::new(move |_event, _window, _cx| hits.borrow_mut().push(name))
    }

    #[gpui::test]
    fn test_listeners_are_keyed(cx: &mut TestAppContext) {
        let window = open_root(cx);
        let root = window.root(cx).unwrap();
        let hits = Rc::new(RefCell::new(Vec::new()));

        root.update(cx, |root, _cx| {
            root.on_any_mouse_down("b", counter(&hits, "first b"));
            root.on_any_mouse_down("a", counter(&hits, "a"));
            root.on_any_mouse_down("b", counter(&hits, "b"));
        });

        root.read_with(cx, |root, _| {
            assert_eq!(root.listener_count(), 2, "re-adding replaces the entry");
            assert!(root.is_listening("a"));
        });

        assert!(root.update(cx, |root, _cx| root.remove_mouse_down("a")));
        assert!(!root.update(cx, |root, _cx| root.remove_mouse_down("a")));
    }

    #[gpui::test]
    fn test_listeners_persist_across_frames(cx: &mut TestAppContext) {
        let window = open_root(cx);
        let root = window.root(cx).unwrap();
        let hits = Rc::new(RefCell::new(Vec::new()));

        root.update(cx, |root, _cx| {
            root.on_any_mouse_down("select", counter(&hits, "select"));
        });

        let cx = &mut VisualTestContext::from_window(window.into(), cx);
        cx.run_until_parked();

        for _ in 0..2 {
            cx.simulate_mouse_down(point(px(5.), px(5.)), MouseButton::Left, Modifiers::none());
            cx.simulate_mouse_up(point(px(5.), px(5.)), MouseButton::Left, Modifiers::none());
            cx.run_until_parked();
        }
        assert_eq!(*hits.borrow(), vec!["select", "select"]);

        root.update(cx, |root, _cx| root.remove_mouse_down("select"));
        cx.simulate_mouse_down(point(px(5.), px(5.)), MouseButton::Left, Modifiers::none());
        assert_eq!(hits.borrow().len(), 2);
    }
}
