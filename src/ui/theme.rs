use serde::{Deserialize, Serialize};
use strum_macros::Display;

use super::color::{Color, auto_text_color, meets_wcag_aa};

/// Sentinel meaning "no explicit font size configured; use the theme ramp".
pub const UNSET_FONT_SIZE: f32 = -1.0;

/// Font sizes below this are clamped (with a warning) during layout.
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Whether a widget activates on press or on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClickActivationMode {
    #[default]
    Default,
    Press,
    Release,
}

/// Color role a widget asks the theme for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum ColorUsage {
    Font,
    DarkFont,
    FontMuted,
    Background,
    Surface,
    Primary,
    Secondary,
    Accent,
    Error,
    Focus,
    //
    Custom,
    Default,
    None,
}

impl ColorUsage {
    /// Roles the theme can actually resolve; `Custom`/`Default`/`None` are
    /// handled by the widget layer.
    pub fn is_valid(self) -> bool {
        !matches!(
            self,
            ColorUsage::Custom | ColorUsage::Default | ColorUsage::None
        )
    }
}

/// Bitmask of which corners round: bit 0 = top-left, 1 = top-right,
/// 2 = bottom-left, 3 = bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerMask(pub u8);

impl CornerMask {
    pub const NONE: CornerMask = CornerMask(0b0000);
    pub const ALL: CornerMask = CornerMask(0b1111);

    pub fn is_set(self, corner: usize) -> bool {
        self.0 & (1 << corner) != 0
    }

    pub fn with(self, corner: usize, value: bool) -> CornerMask {
        if value {
            CornerMask(self.0 | (1 << corner))
        } else {
            CornerMask(self.0 & !(1 << corner))
        }
    }

    pub fn any(self) -> bool {
        self.0 != 0
    }
}

/// Modify several corners of a mask at once.
pub fn modify_corners(base: CornerMask, modifications: &[(usize, bool)]) -> CornerMask {
    let mut result = base;
    for &(corner, value) in modifications {
        result = result.with(corner, value);
    }
    result
}

/// Color roles plus the shared widget styling knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font: Color,
    pub darkfont: Color,
    pub font_muted: Color,
    pub background: Color,
    pub surface: Color,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub error: Color,
    pub focus: Color,

    /// Focus ring outline thickness in pixels.
    pub focus_ring_thickness: f32,
    /// Gap between the focused element and its ring.
    pub focus_ring_offset: f32,

    pub click_activation_mode: ClickActivationMode,

    pub rounded_corners: CornerMask,
    /// 0.0 = sharp corners, 1.0 = fully rounded.
    pub roundness: f32,
    /// Segments per rounded corner.
    pub segments: u8,

    // Base font sizes in pixels.
    pub font_size_sm: f32,
    pub font_size_md: f32,
    pub font_size_lg: f32,
    pub font_size_xl: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font: Color::ISABELLINE,
            darkfont: Color::OXFORD_BLUE,
            font_muted: Color::ISABELLINE.darken(0.3),
            background: Color::OXFORD_BLUE,
            surface: Color::OXFORD_BLUE.lighten(0.1),
            primary: Color::PACIFIC_BLUE,
            secondary: Color::TEA_GREEN,
            accent: Color::ORANGE_SODA,
            error: Color::RED,
            focus: Color::ISABELLINE,
            focus_ring_thickness: 3.0,
            focus_ring_offset: 4.0,
            click_activation_mode: ClickActivationMode::Press,
            rounded_corners: CornerMask::ALL,
            roundness: 0.5,
            segments: 8,
            font_size_sm: 16.0,
            font_size_md: 20.0,
            font_size_lg: 32.0,
            font_size_xl: 42.0,
        }
    }
}

impl Theme {
    pub fn from_usage(&self, usage: ColorUsage, disabled: bool) -> Color {
        let color = match usage {
            ColorUsage::Font => self.font,
            ColorUsage::DarkFont => self.darkfont,
            ColorUsage::FontMuted => self.font_muted,
            ColorUsage::Background => self.background,
            ColorUsage::Surface => self.surface,
            ColorUsage::Primary => self.primary,
            ColorUsage::Secondary => self.secondary,
            ColorUsage::Accent => self.accent,
            ColorUsage::Error => self.error,
            ColorUsage::Focus => self.focus,
            ColorUsage::Custom | ColorUsage::Default | ColorUsage::None => {
                log::warn!("fetching '{usage}' color usage from theme; the widget layer should have resolved this");
                self.primary
            }
        };
        if disabled {
            return color.darken(0.3);
        }
        color
    }

    /// Pick the better-contrast font color for a themed background.
    pub fn auto_font_for(&self, background_usage: ColorUsage) -> Color {
        let bg = self.from_usage(background_usage, false);
        auto_text_color(bg, self.font, self.darkfont)
    }

    /// WCAG-AA check for font-on-background and darkfont-on-surface.
    pub fn validate_accessibility(&self) -> bool {
        let valid =
            meets_wcag_aa(self.font, self.background) && meets_wcag_aa(self.darkfont, self.surface);
        if !valid {
            log::warn!(
                "theme does not meet WCAG AA contrast requirements; adjust font/background colors"
            );
        }
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_passes_accessibility() {
        assert!(Theme::default().validate_accessibility());
    }

    #[test]
    fn muddy_theme_fails_accessibility() {
        let theme = Theme {
            font: Color::rgb(100, 100, 100),
            background: Color::rgb(110, 110, 110),
            ..Theme::default()
        };
        assert!(!theme.validate_accessibility());
    }

    #[test]
    fn disabled_usage_darkens() {
        let theme = Theme::default();
        let normal = theme.from_usage(ColorUsage::Primary, false);
        let disabled = theme.from_usage(ColorUsage::Primary, true);
        assert!(disabled.r <= normal.r && disabled.g <= normal.g && disabled.b <= normal.b);
        assert_ne!(normal, disabled);
    }

    #[test]
    fn corner_mask_round_trip() {
        let mask = modify_corners(CornerMask::ALL, &[(1, false), (3, false)]);
        assert!(mask.is_set(0));
        assert!(!mask.is_set(1));
        assert!(mask.is_set(2));
        assert!(!mask.is_set(3));
    }
}
