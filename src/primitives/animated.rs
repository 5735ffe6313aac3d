use std::time::Duration;

use gpui::{App, Bounds, Context, Entity, IntoElement, Pixels, Styled, Window, canvas};
use gpui_transitions::{AnimationToken, ExpandCollapse};

/// Resolves a size animation once `duration` has elapsed by calling `finish`
/// on the entity that owns it.
///
/// Nothing happens when the entity was released in the meantime.
pub fn finish_after<T: 'static>(
    entity: &Entity<T>,
    token: AnimationToken,
    duration: Duration,
    cx: &mut App,
    finish: impl FnOnce(&mut T, AnimationToken, &mut Context<T>) + 'static,
) {
    let entity = entity.downgrade();

    cx.spawn(async move |cx| {
        cx.background_executor().timer(duration).await;
        if entity
            .update(cx, |this, cx| finish(this, token, cx))
            .is_err()
        {
            tracing::trace!(?token, "size animation finished after release");
        }
    })
    .detach();
}

/// An invisible element that reports the window bounds of its positioned
/// parent on every prepaint.
///
/// The parent must be `relative()`; the element expands to cover it.
pub fn measure_parent(
    on_measure: impl FnOnce(Bounds<Pixels>, &mut Window, &mut App) + 'static,
) -> impl IntoElement {
    canvas(
        move |bounds, window, cx| on_measure(bounds, window, cx),
        |_bounds, _, _window, _cx| {},
    )
    .absolute()
    .top_0()
    .left_0()
    .size_full()
}

/// Runs one render of the [`ExpandCollapse`] that `panel` picks out of
/// `state`.
///
/// Starts an animation when the rendered open state changed, schedules its
/// completion and keeps frames coming while it runs. Returns the inline size
/// to apply to the animated element, if any.
pub fn drive_expand_collapse<T: 'static>(
    state: &Entity<T>,
    panel: fn(&mut T) -> &mut ExpandCollapse,
    natural: Pixels,
    window: &mut Window,
    cx: &mut App,
) -> Option<Pixels> {
    let (token, duration, animating, inline) = state.update(cx, |state, _cx| {
        let expand = panel(state);
        expand.size_mut().attach();
        let token = expand.update(natural);
        (
            token,
            expand.size().duration(),
            expand.animating(),
            expand.inline_size(),
        )
    });

    if let Some(token) = token {
        finish_after(state, token, duration, cx, move |state, token, cx| {
            if panel(state).finish(token) {
                tracing::trace!("expand/collapse caught up with a newer open state");
            }
            cx.notify();
        });
    }

    if animating {
        window.request_animation_frame();
    }

    inline
}
