use gpui::{ElementId, SharedString};

/// Derives child ids for the keyed state of a component.
pub trait ElementIdExt {
    fn with_suffix(&self, suffix: impl Into<SharedString>) -> ElementId;
}

impl ElementIdExt for ElementId {
    fn with_suffix(&self, suffix: impl Into<SharedString>) -> ElementId {
        ElementId::NamedChild(Box::new(self.clone()), suffix.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes_are_distinct_and_stable() {
        let id = ElementId::from("fruit");

        assert_eq!(id.with_suffix("state"), id.with_suffix("state"));
        assert_ne!(id.with_suffix("state"), id.with_suffix("menu"));
        assert_ne!(
            id.with_suffix("state"),
            ElementId::from("other").with_suffix("state")
        );
    }
}
