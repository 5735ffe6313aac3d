use gpui::App;

use crate::theme::{ActiveVariantId, Theme, ThemeControls, ThemeVariant};

/// Extension trait for accessing and modifying the global theme.
pub trait ThemeExt {
    /// Changes the theme.
    fn set_theme<T: AsRef<Theme>>(&mut self, theme: T);

    /// Selects which of the theme's variants is active.
    fn set_theme_variant(&mut self, index: usize);

    /// Gets an immutable reference to the theme, falling back to
    /// [`Theme::default_theme`] when none was set.
    fn get_theme(&self) -> &Theme;

    /// The active color variant.
    fn theme_variant(&self) -> &ThemeVariant;

    /// Behavior settings of the current theme.
    fn theme_controls(&self) -> &ThemeControls {
        &self.get_theme().controls
    }
}

impl ThemeExt for App {
    fn set_theme<T: AsRef<Theme>>(&mut self, theme: T) {
        self.set_global::<Theme>(theme.as_ref().clone())
    }

    fn set_theme_variant(&mut self, index: usize) {
        self.set_global(ActiveVariantId(index))
    }

    fn get_theme(&self) -> &Theme {
        match self.try_global::<Theme>() {
            Some(theme) => theme,
            None => Theme::default_theme(),
        }
    }

    fn theme_variant(&self) -> &ThemeVariant {
        self.get_theme().variants.active(self)
    }
}
