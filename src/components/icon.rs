use gpui::{
    Edges, Hsla, IntoElement, Length, Radians, RenderOnce, SharedString, SizeRefinement, Styled,
    Transformation, prelude::FluentBuilder, px, svg,
};

use crate::theme::ThemeExt;

/// Directory icons are looked up in by [`Icon::named`].
pub const ICONS_DIR: &str = "icons";

/// An SVG glyph with configurable size, color and rotation.
///
/// Icons are stateless; the asset source registered on the application
/// resolves the path.
#[derive(IntoElement)]
pub struct Icon {
    path: SharedString,
    size: SizeRefinement<Length>,
    rotate: Radians,
    color: Option<Hsla>,
    margin: Edges<Option<Length>>,
}

impl Icon {
    /// Creates an icon from a full SVG asset path.
    pub fn new(path: impl Into<SharedString>) -> Self {
        Self {
            path: path.into(),
            size: SizeRefinement::default(),
            rotate: Radians(0.),
            color: None,
            margin: Edges::default(),
        }
    }

    /// Creates an icon from a glyph name, e.g. `"chevron-down"` resolves to
    /// `icons/chevron-down.svg`.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::new(format!("{ICONS_DIR}/{}.svg", name.as_ref()))
    }

    pub fn path(&self) -> &SharedString {
        &self.path
    }

    /// Sets left margin.
    pub fn ml(mut self, margin: impl Into<Length>) -> Self {
        self.margin.left = Some(margin.into());
        self
    }

    /// Sets right margin.
    pub fn mr(mut self, margin: impl Into<Length>) -> Self {
        self.margin.right = Some(margin.into());
        self
    }

    /// Sets uniform width and height for the icon.
    pub fn size(mut self, size: impl Into<Length>) -> Self {
        let size = size.into();
        self.size = SizeRefinement {
            width: Some(size),
            height: Some(size),
        };
        self
    }

    /// Sets a custom color, overriding the theme's primary text color.
    pub fn color(mut self, color: impl Into<Hsla>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Applies a rotation transformation to the icon.
    pub fn rotate(mut self, rotate: impl Into<Radians>) -> Self {
        self.rotate = rotate.into();
        self
    }
}

impl RenderOnce for Icon {
    fn render(self, _window: &mut gpui::Window, cx: &mut gpui::App) -> impl IntoElement {
        let primary_text_color = cx.theme_variant().colors.text.primary;
        let width = self.size.width.unwrap_or(px(14.).into());
        let height = self.size.height.unwrap_or(px(14.).into());

        svg()
            .path(self.path)
            .text_color(primary_text_color)
            .flex_none()
            .w(width)
            .min_w(width)
            .h(height)
            .min_h(height)
            .when_some(self.margin.left, |this, v| this.ml(v))
            .when_some(self.margin.right, |this, v| this.mr(v))
            .with_transformation(Transformation::rotate(self.rotate))
            .when_some(self.color, |this, color| this.text_color(color))
    }
}
