use gpui::{AnyElement, IntoElement, deferred};

/// Whether, and at which priority, a popup paints after its siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeferredConfig {
    pub enabled: bool,
    /// Higher priorities paint later. `None` uses the component's default.
    pub priority: Option<usize>,
}

impl Default for DeferredConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: None,
        }
    }
}

/// A component whose popup content can be painted above later siblings.
pub trait Deferrable: Sized {
    const DEFAULT_PRIORITY: usize = 0;

    fn deferred_config(&self) -> &DeferredConfig;

    fn deferred_config_mut(&mut self) -> &mut DeferredConfig;

    fn deferred(mut self, enabled: bool) -> Self {
        self.deferred_config_mut().enabled = enabled;
        self
    }

    fn deferred_priority(mut self, priority: usize) -> Self {
        self.deferred_config_mut().priority = Some(priority);
        self
    }

    /// The priority `element` paints at, or `None` when it paints in place.
    fn effective_priority(&self) -> Option<usize> {
        let config = self.deferred_config();
        config
            .enabled
            .then(|| config.priority.unwrap_or(Self::DEFAULT_PRIORITY))
    }

    fn apply_deferred(&self, element: impl IntoElement) -> AnyElement {
        match self.effective_priority() {
            Some(priority) => deferred(element).priority(priority).into_any_element(),
            None => element.into_any_element(),
        }
    }
}
