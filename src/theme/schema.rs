use std::{fs, path::Path, sync::LazyLock, time::Duration};

use anyhow::Context as _;
use gpui::{AbsoluteLength, App, DefiniteLength, Global, Pixels, Rgba, SharedString};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::deserializers::{
    de_abs_length, de_def_length, de_millis, de_optional_pixels, de_pixels,
    de_string_or_non_empty_list, de_variants,
};
use crate::error::ThemeError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Theme {
    pub name: SharedString,
    pub layout: ThemeLayout,
    pub variants: ThemeVariants,
    #[serde(default)]
    pub controls: ThemeControls,
}

macro_rules! generate_builtin_themes {
    ( $( [$path:literal, $cell:ident, $name:ident] ),+ ) => {
        $(
            static $cell: LazyLock<Theme> = LazyLock::new(|| {
                Theme::from_json(include_str!($path)).expect("built-in theme should be valid")
            });
        )+

        impl Theme {
            $(
                pub fn $name() -> &'static Theme {
                    &$cell
                }
            )+
        }
    };
}

generate_builtin_themes!(["../../themes/default.json", DEFAULT_THEME, default_theme]);

impl AsRef<Theme> for Theme {
    fn as_ref(&self) -> &Theme {
        self
    }
}

impl Theme {
    pub fn from_json(json: impl AsRef<str>) -> Result<Theme, ThemeError> {
        Ok(serde_json::from_str(json.as_ref())?)
    }

    /// Reads and parses a theme file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Theme> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read theme file {}", path.display()))?;

        Theme::from_json(json).with_context(|| format!("invalid theme file {}", path.display()))
    }
}

impl Global for Theme {}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeLayout {
    pub text: ThemeText,
    pub size: ThemeSizes,
    pub corner_radii: ThemeCornerRadii,
    pub padding: ThemePadding,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeText {
    #[serde(deserialize_with = "de_pixels")]
    pub base_size: Pixels,
    pub default_font: ThemeFont,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeFont {
    #[serde(deserialize_with = "de_string_or_non_empty_list")]
    pub family: SmallVec<[SharedString; 1]>,
    #[serde(deserialize_with = "de_def_length")]
    pub line_height: DefiniteLength,
    pub sizes: ThemeTextSizes,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeTextSizes {
    #[serde(deserialize_with = "de_abs_length")]
    pub body: AbsoluteLength,
    #[serde(deserialize_with = "de_abs_length")]
    pub caption: AbsoluteLength,
}

/// Heights of single-line controls.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeSizes {
    #[serde(deserialize_with = "de_pixels")]
    pub lg: Pixels,
    #[serde(deserialize_with = "de_pixels")]
    pub md: Pixels,
    #[serde(deserialize_with = "de_pixels")]
    pub sm: Pixels,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeCornerRadii {
    #[serde(deserialize_with = "de_pixels")]
    pub lg: Pixels,
    #[serde(deserialize_with = "de_pixels")]
    pub md: Pixels,
    #[serde(deserialize_with = "de_pixels")]
    pub sm: Pixels,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemePadding {
    #[serde(deserialize_with = "de_pixels")]
    pub lg: Pixels,
    #[serde(deserialize_with = "de_pixels")]
    pub md: Pixels,
    #[serde(deserialize_with = "de_pixels")]
    pub sm: Pixels,
}

/// Behavior settings shared by every control.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeControls {
    /// Maximum height of a select's options panel. Opening a select without
    /// one is a configuration error.
    #[serde(default, deserialize_with = "de_optional_pixels")]
    pub select_max_height: Option<Pixels>,
    /// Quiet period before a search query is evaluated.
    #[serde(default = "default_debounce", deserialize_with = "de_millis")]
    pub select_debounce: Duration,
    /// Duration of the options panel open/close animation.
    #[serde(default = "default_select_duration", deserialize_with = "de_millis")]
    pub select_duration: Duration,
    /// Duration of expand/collapse animations.
    #[serde(default = "default_expand_duration", deserialize_with = "de_millis")]
    pub expand_duration: Duration,
}

impl Default for ThemeControls {
    fn default() -> Self {
        Self {
            select_max_height: None,
            select_debounce: default_debounce(),
            select_duration: default_select_duration(),
            expand_duration: default_expand_duration(),
        }
    }
}

fn default_debounce() -> Duration {
    Duration::from_millis(150)
}

fn default_select_duration() -> Duration {
    Duration::from_millis(200)
}

fn default_expand_duration() -> Duration {
    Duration::from_millis(300)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(transparent)]
pub struct ThemeVariants {
    #[serde(deserialize_with = "de_variants")]
    pub variants: SmallVec<[ThemeVariant; 2]>,
}

impl ThemeVariants {
    pub fn active(&self, cx: &App) -> &ThemeVariant {
        let index = cx
            .try_global::<ActiveVariantId>()
            .map_or(0, |active| active.0)
            .min(self.variants.len() - 1);

        &self.variants[index]
    }
}

pub struct ActiveVariantId(pub usize);

impl Global for ActiveVariantId {}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeVariant {
    pub kind: ThemeVariantKind,
    pub colors: ThemeColors,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum ThemeVariantKind {
    Dark,
    Light,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeColors {
    pub background: ThemeBackgroundColors,
    pub accent: ThemeAccentColors,
    pub text: ThemeTextColors,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeBackgroundColors {
    pub primary: Rgba,
    pub secondary: Rgba,
    pub tertiary: Rgba,
    pub quaternary: Rgba,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeAccentColors {
    pub primary: Rgba,
    pub highlight: Rgba,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ThemeTextColors {
    pub primary: Rgba,
    pub secondary: Rgba,
}

impl ThemeTextColors {
    pub fn all(&self) -> (Rgba, Rgba) {
        (self.primary, self.secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::px;

    #[test]
    fn test_default_theme_parses() {
        let theme = Theme::default_theme();

        assert_eq!(&*theme.name, "Default");
        assert!(!theme.variants.variants.is_empty());
        assert_eq!(theme.controls.select_max_height, Some(px(240.)));
        assert_eq!(theme.controls.select_debounce, Duration::from_millis(150));
    }

    #[test]
    fn test_controls_default_when_missing() {
        let mut json: serde_json::Value =
            serde_json::from_str(include_str!("../../themes/default.json")).unwrap();
        json.as_object_mut().unwrap().remove("controls");

        let theme = Theme::from_json(json.to_string()).unwrap();
        assert_eq!(theme.controls.select_max_height, None);
        assert_eq!(theme.controls.expand_duration, Duration::from_millis(300));
    }

    #[test]
    fn test_invalid_theme_is_an_error() {
        assert!(matches!(
            Theme::from_json("{ \"name\": 1 }"),
            Err(ThemeError::Parse(_))
        ));
        assert!(Theme::load("/nonexistent/theme.json").is_err());
    }
}
