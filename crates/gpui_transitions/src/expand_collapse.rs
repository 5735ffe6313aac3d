use std::time::Duration;

use gpui::{Axis, Pixels};

use crate::{AnimatedSize, AnimationToken, SizeTarget};

/// Open/closed state of a collapsible element, animated through an
/// [`AnimatedSize`].
///
/// The logical `open` flag is the latest intent. While an animation is in
/// flight the element keeps rendering the open state it started animating
/// towards, so a burst of prop changes always settles on the last one.
#[derive(Debug)]
pub struct ExpandCollapse {
    open: bool,
    last_prop: Option<bool>,
    cached_open: Option<bool>,
    open_size: SizeTarget,
    size: AnimatedSize,
}

impl ExpandCollapse {
    pub fn new(is_open: Option<bool>, axis: Axis, duration: Duration) -> Self {
        let open = is_open.unwrap_or(false);
        let open_size = SizeTarget::Auto;

        Self {
            open,
            last_prop: is_open,
            cached_open: None,
            open_size,
            size: AnimatedSize::new(
                axis,
                if open { open_size } else { SizeTarget::COLLAPSED },
                duration,
            ),
        }
    }

    /// Sets the size used for the open state. Defaults to [`SizeTarget::Auto`].
    pub fn with_open_size(mut self, open_size: SizeTarget) -> Self {
        if self.open && self.size.applied() == self.open_size {
            self.size = AnimatedSize::new(self.size.axis(), open_size, self.size.duration());
        }
        self.open_size = open_size;
        self
    }

    /// Applies the `is_open` prop for this render.
    ///
    /// The logical state only follows the prop when the prop itself changed
    /// since the previous render, so a manual toggle is not overridden by an
    /// unchanged prop.
    pub fn sync_prop(&mut self, is_open: Option<bool>) {
        if let (Some(previous), Some(next)) = (self.last_prop, is_open)
            && previous != next
        {
            self.open = next;
        }

        if is_open.is_some() {
            self.last_prop = is_open;
        }
    }

    /// Flips the logical open state.
    ///
    /// Returns `false` without doing anything while an animation is running.
    pub fn toggle_open(&mut self) -> bool {
        if self.animating() {
            tracing::trace!("toggle rejected while animating");
            return false;
        }

        self.open = !self.open;
        true
    }

    /// Toggles towards `open` when it differs from the logical state.
    pub fn set_open(&mut self, open: bool) -> bool {
        if self.open == open {
            return true;
        }

        self.toggle_open()
    }

    /// The logical open state.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The open state to render, which lags behind the logical state while
    /// animating.
    pub fn rendered_open(&self) -> bool {
        if self.animating() {
            self.cached_open.unwrap_or(self.open)
        } else {
            self.open
        }
    }

    /// Whether content should be rendered at all.
    pub fn visible(&self) -> bool {
        self.rendered_open() || self.animating()
    }

    pub fn animating(&self) -> bool {
        self.size.animating()
    }

    pub fn size(&self) -> &AnimatedSize {
        &self.size
    }

    pub fn size_mut(&mut self) -> &mut AnimatedSize {
        &mut self.size
    }

    /// The size to apply to the element for this render, if any.
    pub fn inline_size(&self) -> Option<Pixels> {
        self.size.inline_size()
    }

    /// Runs once per render after the prop has been synced.
    ///
    /// Starts an animation when the rendered open state asks for a different
    /// size than the one last applied and returns its token.
    pub fn update(&mut self, natural: Pixels) -> Option<AnimationToken> {
        let target = if self.rendered_open() {
            self.open_size
        } else {
            SizeTarget::COLLAPSED
        };

        let current = self.size.current_size(natural);
        let token = self.size.request(target, current, natural);

        if self.size.animating() && self.cached_open.is_none() {
            self.cached_open = Some(self.open);
        }

        token
    }

    /// Completes the animation stamped with `token`.
    ///
    /// Returns `true` when the logical state changed while animating, in
    /// which case the element needs another render to catch up.
    pub fn finish(&mut self, token: AnimationToken) -> bool {
        if !self.size.finish(token) {
            return false;
        }

        self.size.reset_styles();

        let stale = self.cached_open.is_some_and(|cached| cached != self.open);
        self.cached_open = None;
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::px;

    fn attached(is_open: Option<bool>) -> ExpandCollapse {
        let mut expand = ExpandCollapse::new(is_open, Axis::Vertical, Duration::from_millis(200));
        expand.size_mut().attach();
        expand
    }

    #[test]
    fn test_initial_state_follows_prop() {
        assert!(attached(Some(true)).is_open());
        assert!(!attached(Some(false)).is_open());
        assert!(!attached(None).is_open());
    }

    #[test]
    fn test_unchanged_prop_does_not_override_toggle() {
        let mut expand = attached(Some(false));

        assert!(expand.toggle_open());
        expand.sync_prop(Some(false));
        assert!(expand.is_open(), "unchanged prop should keep manual toggle");

        expand.sync_prop(Some(true));
        expand.sync_prop(Some(false));
        assert!(!expand.is_open(), "changed prop should win");
    }

    #[test]
    fn test_toggle_is_rejected_while_animating() {
        let mut expand = attached(Some(false));

        expand.toggle_open();
        let token = expand.update(px(100.)).unwrap();
        assert!(expand.animating());
        assert!(!expand.toggle_open());
        assert!(expand.is_open());

        assert!(!expand.finish(token));
        assert!(expand.toggle_open());
        assert!(!expand.is_open());
    }

    #[test]
    fn test_prop_change_mid_animation_renders_cached_state() {
        let mut expand = attached(Some(false));

        expand.sync_prop(Some(true));
        let token = expand.update(px(40.)).unwrap();

        expand.sync_prop(Some(false));
        assert!(!expand.is_open());
        assert!(expand.rendered_open(), "keeps animating towards open");
        assert!(expand.update(px(40.)).is_none());

        assert!(expand.finish(token), "stale state needs another render");
        assert!(!expand.rendered_open());

        let token = expand.update(px(40.)).expect("collapse should start");
        assert!(!expand.finish(token));
        assert!(!expand.visible());
    }

    #[test]
    fn test_without_element_toggles_immediately() {
        let mut expand = ExpandCollapse::new(None, Axis::Vertical, Duration::from_millis(200));

        assert!(expand.toggle_open());
        assert!(expand.update(px(10.)).is_none());
        assert!(!expand.animating());
        assert!(expand.visible());
        assert!(expand.toggle_open());
        assert!(!expand.visible());
    }
}
