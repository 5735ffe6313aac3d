use gpui::{AbsoluteLength, DefiniteLength, Pixels, Window, px};

pub trait PixelsExt {
    /// Vertical padding that makes a single line of text reach this height.
    fn padding_needed_for_height(
        &self,
        window: &Window,
        text_size: AbsoluteLength,
        line_height: DefiniteLength,
    ) -> Pixels;
}

/// Line height in pixels of text at `text_size` pixels.
fn line_height_px(line_height: DefiniteLength, text_size: f32, rem_size: Pixels) -> f32 {
    match line_height {
        DefiniteLength::Absolute(line_height) => line_height.to_pixels(rem_size).to_f64() as f32,
        DefiniteLength::Fraction(fraction) => text_size * fraction,
    }
}

impl PixelsExt for Pixels {
    fn padding_needed_for_height(
        &self,
        window: &Window,
        text_size: AbsoluteLength,
        line_height: DefiniteLength,
    ) -> Pixels {
        let rem_size = window.rem_size();
        let text_size = text_size.to_pixels(rem_size).to_f64() as f32;
        let line_height = line_height_px(line_height, text_size, rem_size);

        px(((self.to_f64() as f32 - line_height) / 2.).max(0.))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpui::{relative, rems};

    #[test]
    fn test_line_height_px() {
        assert_eq!(line_height_px(relative(1.5), 14., px(16.)), 21.);
        let rem = DefiniteLength::Absolute(AbsoluteLength::Rems(rems(1.)));
        assert_eq!(line_height_px(rem, 14., px(16.)), 16.);
        let fixed = DefiniteLength::Absolute(AbsoluteLength::Pixels(px(18.)));
        assert_eq!(line_height_px(fixed, 14., px(16.)), 18.);
    }
}
