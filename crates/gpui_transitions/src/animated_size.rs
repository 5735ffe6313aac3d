use std::{
    collections::BTreeSet,
    time::{Duration, Instant},
};

use gpui::{Axis, Pixels};

use crate::{TransitionGoal, progress};

/// The size an [`AnimatedSize`] animates towards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SizeTarget {
    /// The element's natural size, as measured from its content.
    Auto,
    /// An explicit size. `Pixels(px(0.))` collapses the element.
    Pixels(Pixels),
}

impl SizeTarget {
    /// A fully collapsed element.
    pub const COLLAPSED: Self = Self::Pixels(Pixels::ZERO);

    /// Resolves the target against the element's natural size.
    pub fn resolve(&self, natural: Pixels) -> Pixels {
        match self {
            Self::Auto => natural,
            Self::Pixels(size) => *size,
        }
    }
}

impl From<Pixels> for SizeTarget {
    fn from(size: Pixels) -> Self {
        Self::Pixels(size)
    }
}

/// Identifies one in-flight size animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationToken(u64);

/// The inline size applied to the element while an animation runs.
#[derive(Clone, Copy, Debug)]
struct InlineSize {
    from: Pixels,
    to: Pixels,
    started_at: Instant,
}

/// Drives a width or height transition from the previously applied target
/// to a new one.
///
/// Every started animation is stamped with an [`AnimationToken`]. The
/// element only reports [`animating`](Self::animating) as `false` once every
/// stamped animation has been [finished](Self::finish), so rapid toggles
/// (expand then immediately collapse) never clear the flag early.
///
/// Until an element is [attached](Self::attach) there is nothing to
/// measure, so requests are ignored and the size never reports animating.
#[derive(Debug)]
pub struct AnimatedSize {
    axis: Axis,
    duration: Duration,
    applied: SizeTarget,
    in_flight: BTreeSet<AnimationToken>,
    next_token: u64,
    attached: bool,
    inline: Option<InlineSize>,
}

impl AnimatedSize {
    pub fn new(axis: Axis, initial: SizeTarget, duration: Duration) -> Self {
        Self {
            axis,
            duration,
            applied: initial,
            in_flight: BTreeSet::new(),
            next_token: 0,
            attached: false,
            inline: None,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// The last target an animation was started towards.
    pub fn applied(&self) -> SizeTarget {
        self.applied
    }

    /// Marks the element as present so size requests start animations.
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Detaches the element, dropping any in-flight animations.
    pub fn detach(&mut self) {
        self.attached = false;
        self.in_flight.clear();
        self.inline = None;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether any animation touching this element is still in flight.
    pub fn animating(&self) -> bool {
        self.attached && !self.in_flight.is_empty()
    }

    /// Number of animations that have started but not finished.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Requests the element to be sized to `target`.
    ///
    /// `current` is the size the element is rendered at right now and
    /// `natural` the size of its content, used to resolve [`SizeTarget::Auto`].
    /// Returns the token of the newly started animation, which must be passed
    /// to [`finish`](Self::finish) once `duration` has elapsed.
    pub fn request(
        &mut self,
        target: SizeTarget,
        current: Pixels,
        natural: Pixels,
    ) -> Option<AnimationToken> {
        if !self.attached || self.applied == target {
            return None;
        }

        let token = AnimationToken(self.next_token);
        self.next_token += 1;
        self.in_flight.insert(token);

        self.inline = Some(InlineSize {
            from: current,
            to: target.resolve(natural),
            started_at: Instant::now(),
        });
        self.applied = target;

        tracing::trace!(
            ?token,
            ?target,
            in_flight = self.in_flight.len(),
            "size animation started"
        );

        Some(token)
    }

    /// Marks the animation stamped with `token` as complete.
    ///
    /// Returns `true` when no other animation is in flight anymore.
    pub fn finish(&mut self, token: AnimationToken) -> bool {
        if !self.in_flight.remove(&token) {
            tracing::trace!(?token, "ignoring unknown size animation token");
        }

        self.in_flight.is_empty()
    }

    /// The size the element should be rendered at, if an inline size is
    /// currently applied.
    pub fn inline_size(&self) -> Option<Pixels> {
        let inline = self.inline?;

        let delta = progress(
            inline.started_at.elapsed().as_secs_f32(),
            self.duration.as_secs_f32(),
        );

        Some(inline.from.apply_delta(&inline.to, delta))
    }

    /// The size the element is rendered at, given its natural size.
    pub fn current_size(&self, natural: Pixels) -> Pixels {
        self.inline_size()
            .unwrap_or_else(|| self.applied.resolve(natural))
    }

    /// Clears any inline size applied during animation so the element falls
    /// back to its natural layout.
    pub fn reset_styles(&mut self) {
        self.inline = None;
    }
}
