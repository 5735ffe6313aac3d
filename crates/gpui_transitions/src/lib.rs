//! Time-based transitions for gpui elements.
//!
//! [`Transition`] interpolates any [`TransitionGoal`] towards a goal over a
//! fixed duration. [`AnimatedSize`] and [`ExpandCollapse`] build on the same
//! interpolation to animate an element's width or height between collapsed,
//! pixel and natural (`auto`) sizes without leaving a residual inline size
//! once the animation has settled.

use std::{
    ops::{Add, Mul, Sub},
    rc::Rc,
    time::{Duration, Instant},
};

use gpui::{App, Context, ElementId, Entity, EntityId, Pixels, Rgba, Window, linear, px};

mod animated_size;
pub use animated_size::*;

mod expand_collapse;
pub use expand_collapse::*;

/// A transition between two values of `T`, stored in a gpui entity so it
/// survives across renders.
#[derive(Clone)]
pub struct Transition<T: TransitionGoal + Clone + PartialEq + 'static> {
    duration_secs: f32,
    easing: Rc<dyn Fn(f32) -> f32>,
    state: Entity<TransitionState<T>>,
}

impl<T: TransitionGoal + Clone + PartialEq + 'static> Transition<T> {
    /// Create a new keyed transition with the given duration and initial goal.
    pub fn new(
        id: impl Into<ElementId>,
        window: &mut Window,
        cx: &mut App,
        duration: Duration,
        initial_goal: impl FnOnce(&mut Window, &mut Context<TransitionState<T>>) -> T,
    ) -> Self {
        Self {
            duration_secs: duration.as_secs_f32(),
            easing: Rc::new(linear),
            state: window.use_keyed_state(id, cx, |window, cx| {
                TransitionState::new(initial_goal(window, cx))
            }),
        }
    }

    /// Create a new transition with the given duration using the specified state.
    pub fn from_state(state: Entity<TransitionState<T>>, duration: Duration) -> Self {
        Self {
            duration_secs: duration.as_secs_f32(),
            easing: Rc::new(linear),
            state,
        }
    }

    /// Set the easing function to use for this transition.
    pub fn with_easing(mut self, easing: impl Fn(f32) -> f32 + 'static) -> Self {
        self.easing = Rc::new(easing);
        self
    }

    /// Reads the transition's goal.
    pub fn read_goal<'a>(&self, cx: &'a App) -> &'a T {
        &self.state.read(cx).end_goal
    }

    /// Sets the goal for the transition without notifying gpui of any changes.
    ///
    /// Returns `true` when the goal actually changed.
    pub fn set_goal(&self, cx: &mut App, new_goal: T) -> bool {
        self.state.update(cx, |state, _cx| state.retarget(new_goal))
    }

    /// Get the entity ID associated with this transition's state.
    pub fn entity_id(&self) -> EntityId {
        self.state.entity_id()
    }

    /// Evaluates the current value, requesting another frame while the
    /// transition is still in progress.
    pub fn evaluate(&self, window: &mut Window, cx: &mut App) -> T {
        let duration_secs = self.duration_secs;
        let easing = self.easing.clone();

        let (in_progress, value) = self
            .state
            .update(cx, |state, _cx| state.evaluate(duration_secs, &*easing));

        if in_progress {
            window.request_animation_frame();
        }

        value
    }
}

/// State for a transition.
#[derive(Clone)]
pub struct TransitionState<T: TransitionGoal + Clone + PartialEq + 'static> {
    goal_last_updated_at: Instant,
    start_goal: T,
    end_goal: T,
    last_delta: f32,
}

impl<T: TransitionGoal + Clone + PartialEq + 'static> TransitionState<T> {
    pub fn new(initial_goal: T) -> Self {
        Self {
            goal_last_updated_at: Instant::now(),
            start_goal: initial_goal.clone(),
            end_goal: initial_goal,
            last_delta: 1.,
        }
    }

    fn retarget(&mut self, new_goal: T) -> bool {
        if new_goal == self.end_goal {
            return false;
        }

        let last_end_goal = std::mem::replace(&mut self.end_goal, new_goal);

        self.start_goal = self.start_goal.apply_delta(&last_end_goal, self.last_delta);
        self.goal_last_updated_at = Instant::now();

        true
    }

    fn evaluate(&mut self, duration_secs: f32, easing: &dyn Fn(f32) -> f32) -> (bool, T) {
        let elapsed_secs = self.goal_last_updated_at.elapsed().as_secs_f32();
        let delta = easing(progress(elapsed_secs, duration_secs));

        debug_assert!(
            (0.0..=1.0).contains(&delta),
            "delta should always be between 0 and 1"
        );

        self.last_delta = delta;

        (
            delta != 1.,
            self.start_goal.apply_delta(&self.end_goal, delta),
        )
    }
}

pub(crate) fn progress(elapsed_secs: f32, duration_secs: f32) -> f32 {
    if duration_secs <= 0. {
        return 1.;
    }

    (elapsed_secs / duration_secs).min(1.)
}

/// A type which can be used as a transition goal.
pub trait TransitionGoal {
    /// Defines how a value is calculated from the start and end goal.
    fn apply_delta(&self, to: &Self, delta: f32) -> Self;
}

macro_rules! float_transition_goals {
    ( $( $ty:ty ),+ ) => {
        $(
            impl TransitionGoal for $ty {
                fn apply_delta(&self, to: &Self, delta: f32) -> Self {
                    lerp(*self, *to, delta as $ty)
                }
            }
        )+
    };
}

float_transition_goals!(f32, f64);

impl TransitionGoal for Pixels {
    fn apply_delta(&self, to: &Self, delta: f32) -> Self {
        px((self.to_f64() as f32).apply_delta(&(to.to_f64() as f32), delta))
    }
}

impl TransitionGoal for Rgba {
    fn apply_delta(&self, to: &Self, delta: f32) -> Self {
        Rgba {
            r: self.r.apply_delta(&to.r, delta),
            g: self.g.apply_delta(&to.g, delta),
            b: self.b.apply_delta(&to.b, delta),
            a: self.a.apply_delta(&to.a, delta),
        }
    }
}

fn lerp<T>(a: T, b: T, t: T) -> T
where
    T: Copy + Add<Output = T> + Sub<Output = T> + Mul<Output = T>,
{
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_goal_interpolates() {
        assert_eq!(px(0.).apply_delta(&px(100.), 0.25), px(25.));
        assert_eq!(px(100.).apply_delta(&px(0.), 1.), px(0.));
    }

    #[test]
    fn test_retarget_starts_from_last_evaluated_value() {
        let mut state = TransitionState::new(0f32);
        assert!(state.retarget(1.));
        state.last_delta = 0.5;

        assert!(state.retarget(0.));
        assert_eq!(state.start_goal, 0.5);
        assert!(!state.retarget(0.), "same goal should not restart");
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        assert_eq!(progress(0., 0.), 1.);
        assert_eq!(progress(0.5, 1.), 0.5);
        assert_eq!(progress(3., 1.), 1.);
    }
}
