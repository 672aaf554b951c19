//! Color theme system for ccbar.
//!
//! A `Theme` holds named `ratatui::style::Color` fields for every UI surface
//! ccbar renders. Two built-in themes are provided:
//!
//! - `dark`: ANSI 16 colors, works on any terminal.
//! - `catppuccin_mocha`: Catppuccin Mocha palette in RGB; requires truecolor.
//!
//! Label colors (one per comment type and decoration) are not part of the
//! theme: they come from the label registry so the toolbar matches the badges
//! it writes.

use ratatui::style::Color;
use tracing::warn;

/// All color values used across ccbar's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    // Form borders
    /// Border color for the focused comment form.
    pub border_active: Color,
    /// Border color for other forms.
    pub border_inactive: Color,

    // Page tabs
    pub tab_active: Color,
    pub tab_inactive: Color,

    // Toolbar
    /// Foreground for a highlighted (selected) toolbar button, drawn over the label color.
    pub toolbar_highlight_fg: Color,
    /// The `>` between the active type and its decorations.
    pub toolbar_separator: Color,
    /// Settings button in the form header.
    pub settings_button: Color,

    // Comment body
    pub body_text: Color,
    /// Placeholder shown for an empty body.
    pub body_placeholder: Color,

    // Settings dropdown
    pub toggle_on: Color,
    pub toggle_off: Color,

    // Status bar
    /// Status bar background.
    pub status_bar_bg: Color,
    /// Status bar foreground (general text).
    pub status_bar_fg: Color,
    /// Mode indicator color when in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color when in INSERT mode.
    pub status_mode_insert: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            tab_active: Color::Cyan,
            tab_inactive: Color::DarkGray,

            toolbar_highlight_fg: Color::Black,
            toolbar_separator: Color::DarkGray,
            settings_button: Color::Yellow,

            body_text: Color::Reset,
            body_placeholder: Color::DarkGray,

            toggle_on: Color::Green,
            toggle_off: Color::Red,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_insert: Color::Green,

        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let crust = Color::Rgb(17, 17, 27); // #11111b
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            tab_active: lavender,
            tab_inactive: overlay0,

            toolbar_highlight_fg: crust,
            toolbar_separator: overlay0,
            settings_button: yellow,

            body_text: text,
            body_placeholder: overlay0,

            toggle_on: green,
            toggle_off: red,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_insert: green,

        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup; the fallback is logged.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}

/// Parses a registry hex color (`RRGGBB`) into a terminal color.
pub fn hex_color(hex: &str) -> Color {
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    if hex.len() == 6 {
        Color::Rgb(channel(0), channel(2), channel(4))
    } else {
        Color::Reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccbar_core::labels::CommentType;

    #[test]
    fn registry_colors_parse() {
        assert_eq!(hex_color(CommentType::Praise.color()), Color::Rgb(0x28, 0xA7, 0x45));
        assert_eq!(hex_color("nope"), Color::Reset);
    }

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").border_active, Theme::dark().border_active);
    }
}
