#![allow(missing_docs)] // Derive macros generate undocumented methods.

use enum_assoc::Assoc;
use gpui::App;

use crate::theme::ThemeExt;

/// Text size variants that resolve to theme-defined values.
#[derive(Assoc, Clone, Copy)]
#[func(pub fn resolve(&self, cx: &App) -> gpui::AbsoluteLength)]
pub enum ThemeTextSizeKind {
    /// Standard body text.
    #[assoc(resolve = cx.get_theme().layout.text.default_font.sizes.body)]
    Body,
    /// Small caption or label text.
    #[assoc(resolve = cx.get_theme().layout.text.default_font.sizes.caption)]
    Caption,
}

/// Background color variants from the active theme variant.
#[derive(Assoc, Clone, Copy)]
#[func(pub fn resolve(&self, cx: &App) -> gpui::Rgba)]
pub enum ThemeBackgroundKind {
    #[assoc(resolve = cx.theme_variant().colors.background.primary)]
    Primary,
    #[assoc(resolve = cx.theme_variant().colors.background.secondary)]
    Secondary,
    #[assoc(resolve = cx.theme_variant().colors.background.tertiary)]
    Tertiary,
    #[assoc(resolve = cx.theme_variant().colors.background.quaternary)]
    Quaternary,
}

/// Background layers for stacking surfaces.
///
/// `next()` gives the color for borders and nested elements one layer up.
#[derive(Assoc, Clone, Copy)]
#[func(pub fn resolve(&self, cx: &App) -> gpui::Rgba)]
#[func(pub fn next(&self) -> ThemeBackgroundKind)]
pub enum ThemeLayerKind {
    #[assoc(resolve = cx.theme_variant().colors.background.primary)]
    #[assoc(next = ThemeBackgroundKind::Secondary)]
    Primary,
    #[assoc(resolve = cx.theme_variant().colors.background.secondary)]
    #[assoc(next = ThemeBackgroundKind::Tertiary)]
    Secondary,
    #[assoc(resolve = cx.theme_variant().colors.background.tertiary)]
    #[assoc(next = ThemeBackgroundKind::Quaternary)]
    Tertiary,
}

impl From<ThemeLayerKind> for ThemeBackgroundKind {
    fn from(layer: ThemeLayerKind) -> Self {
        match layer {
            ThemeLayerKind::Primary => Self::Primary,
            ThemeLayerKind::Secondary => Self::Secondary,
            ThemeLayerKind::Tertiary => Self::Tertiary,
        }
    }
}

#[cfg(all(test, feature = "test-support"))]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use gpui::TestAppContext;

    #[gpui::test]
    fn test_layer_next_is_one_step_up(cx: &mut TestAppContext) {
        cx.update(|cx| {
            cx.set_theme(Theme::default_theme());

            assert_eq!(
                ThemeLayerKind::Primary.next().resolve(cx),
                ThemeBackgroundKind::Secondary.resolve(cx)
            );
            assert_eq!(
                ThemeLayerKind::Tertiary.next().resolve(cx),
                ThemeBackgroundKind::Quaternary.resolve(cx)
            );
        });
    }

    #[gpui::test]
    fn test_layer_into_background_kind(cx: &mut TestAppContext) {
        cx.update(|cx| {
            let background: ThemeBackgroundKind = ThemeLayerKind::Secondary.into();
            assert_eq!(
                background.resolve(cx),
                ThemeLayerKind::Secondary.resolve(cx)
            );
        });
    }

    #[gpui::test]
    fn test_text_sizes_resolve(cx: &mut TestAppContext) {
        cx.update(|cx| {
            let body = ThemeTextSizeKind::Body.resolve(cx).to_pixels(gpui::px(16.));
            let caption = ThemeTextSizeKind::Caption
                .resolve(cx)
                .to_pixels(gpui::px(16.));
            assert!(caption < body);
        });
    }
}
