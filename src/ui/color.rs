use palette::Srgb;
use serde::{Deserialize, Serialize};

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    // Named palette used by the default theme.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const ISABELLINE: Color = Color::rgb(242, 233, 228);
    pub const OXFORD_BLUE: Color = Color::rgb(10, 17, 40);
    pub const PACIFIC_BLUE: Color = Color::rgb(27, 152, 224);
    pub const TEA_GREEN: Color = Color::rgb(204, 255, 204);
    pub const ORANGE_SODA: Color = Color::rgb(250, 93, 57);
    pub const RED: Color = Color::rgb(230, 41, 55);
    pub const UI_PINK: Color = Color::rgb(255, 109, 194);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub fn with_alpha(self, alpha: u8) -> Color {
        Color::rgba(self.r, self.g, self.b, alpha)
    }

    /// Scale toward black. `factor` 0.0 leaves the color unchanged, 1.0 is
    /// fully black.
    pub fn darken(self, factor: f32) -> Color {
        let factor = 1.0 - factor.clamp(0.0, 1.0);
        Color::rgba(
            (self.r as f32 * factor) as u8,
            (self.g as f32 * factor) as u8,
            (self.b as f32 * factor) as u8,
            self.a,
        )
    }

    /// Scale toward white. `factor` 0.0 leaves the color unchanged, 1.0 is
    /// fully white.
    pub fn lighten(self, factor: f32) -> Color {
        let factor = factor.clamp(0.0, 1.0);
        let lift = |c: u8| c as f32 + (255.0 - c as f32) * factor;
        Color::rgba(
            lift(self.r) as u8,
            lift(self.g) as u8,
            lift(self.b) as u8,
            self.a,
        )
    }

    pub fn to_f32s(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// WCAG relative luminance, computed from the linearized sRGB channels.
    pub fn relative_luminance(self) -> f32 {
        let [r, g, b, _] = self.to_f32s();
        let linear = Srgb::new(r, g, b).into_linear::<f32>();
        0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
    }
}

/// WCAG contrast ratio between two colors, in `[1, 21]`.
pub fn contrast_ratio(a: Color, b: Color) -> f32 {
    let la = a.relative_luminance();
    let lb = b.relative_luminance();
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// WCAG AA for normal text: contrast of at least 4.5:1.
pub fn meets_wcag_aa(foreground: Color, background: Color) -> bool {
    contrast_ratio(foreground, background) >= 4.5
}

/// Pick whichever of `light` / `dark` has the better contrast against
/// `background`.
pub fn auto_text_color(background: Color, light: Color, dark: Color) -> Color {
    if contrast_ratio(light, background) >= contrast_ratio(dark, background) {
        light
    } else {
        dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_on_white_is_max_contrast() {
        let ratio = contrast_ratio(Color::BLACK, Color::WHITE);
        assert!((ratio - 21.0).abs() < 0.1, "ratio was {ratio}");
        assert!(meets_wcag_aa(Color::BLACK, Color::WHITE));
    }

    #[test]
    fn low_contrast_pair_fails_aa() {
        let gray_a = Color::rgb(120, 120, 120);
        let gray_b = Color::rgb(140, 140, 140);
        assert!(!meets_wcag_aa(gray_a, gray_b));
    }

    #[test]
    fn auto_text_color_picks_readable_option() {
        let on_dark = auto_text_color(Color::OXFORD_BLUE, Color::WHITE, Color::BLACK);
        assert_eq!(on_dark, Color::WHITE);
        let on_light = auto_text_color(Color::WHITE, Color::WHITE, Color::BLACK);
        assert_eq!(on_light, Color::BLACK);
    }
}
