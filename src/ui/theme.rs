use colored::{Color, Colorize};

use crate::core::settings::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    // Conversation
    pub user_label: Color,
    pub user_text: Color,
    pub bot_label: Color,
    pub bot_text: Color,
    pub disclaimer: Color,
    pub placeholder: Color,

    // Chrome
    pub notice: Color,
    pub panel: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::light(),
            Theme::Dark => Self::dark(),
        }
    }

    pub fn light() -> Self {
        Palette {
            user_label: Color::Blue,
            user_text: Color::Black,
            bot_label: Color::Magenta,
            bot_text: Color::Black,
            disclaimer: Color::BrightBlack,
            placeholder: Color::BrightBlack,
            notice: Color::Green,
            panel: Color::Blue,
        }
    }

    pub fn dark() -> Self {
        Palette {
            user_label: Color::BrightCyan,
            user_text: Color::BrightWhite,
            bot_label: Color::BrightMagenta,
            bot_text: Color::White,
            disclaimer: Color::BrightBlack,
            placeholder: Color::BrightBlack,
            notice: Color::BrightGreen,
            panel: Color::BrightCyan,
        }
    }
}

/// Applies `color` only when colored output is wanted.
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.color(color).to_string()
    } else {
        text.to_string()
    }
}

pub fn paint_bold(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.color(color).bold().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_theme_has_its_own_palette() {
        assert_ne!(Palette::for_theme(Theme::Light), Palette::for_theme(Theme::Dark));
        assert_eq!(Palette::for_theme(Theme::Dark), Palette::dark());
    }

    #[test]
    fn disabled_paint_is_plain_text() {
        assert_eq!(paint("Guardian", Color::Magenta, false), "Guardian");
    }
}
