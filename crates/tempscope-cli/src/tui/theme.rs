//! Chart colour themes.

use std::fmt;
use std::str::FromStr;

use ratatui::style::Color;

/// Named colour scheme for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Default,
    Clear,
    #[default]
    Pro,
    Matrix,
    Windows,
    Dark,
    Retro,
    Elegant,
    Mature,
    Dreamland,
    Grandpa,
    Salad,
    Girly,
    Serious,
    Sahara,
    Scream,
}

/// Colours used by one theme. `series` is indexed by dataset position and
/// wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub muted: Color,
    pub series: [Color; 2],
}

impl Palette {
    pub fn series_color(&self, index: usize) -> Color {
        self.series[index % self.series.len()]
    }
}

impl Theme {
    pub const ALL: [Theme; 16] = [
        Theme::Default,
        Theme::Clear,
        Theme::Pro,
        Theme::Matrix,
        Theme::Windows,
        Theme::Dark,
        Theme::Retro,
        Theme::Elegant,
        Theme::Mature,
        Theme::Dreamland,
        Theme::Grandpa,
        Theme::Salad,
        Theme::Girly,
        Theme::Serious,
        Theme::Sahara,
        Theme::Scream,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Clear => "clear",
            Self::Pro => "pro",
            Self::Matrix => "matrix",
            Self::Windows => "windows",
            Self::Dark => "dark",
            Self::Retro => "retro",
            Self::Elegant => "elegant",
            Self::Mature => "mature",
            Self::Dreamland => "dreamland",
            Self::Grandpa => "grandpa",
            Self::Salad => "salad",
            Self::Girly => "girly",
            Self::Serious => "serious",
            Self::Sahara => "sahara",
            Self::Scream => "scream",
        }
    }

    pub fn palette(self) -> Palette {
        use Color::*;
        let (background, foreground, accent, muted, series) = match self {
            Self::Default => (Reset, Reset, Blue, DarkGray, [Blue, Red]),
            Self::Clear => (Reset, White, White, Gray, [LightCyan, LightMagenta]),
            Self::Pro => (Black, White, Cyan, DarkGray, [Cyan, LightRed]),
            Self::Matrix => (Black, Green, LightGreen, DarkGray, [LightGreen, Green]),
            Self::Windows => (Blue, White, Yellow, Gray, [White, Yellow]),
            Self::Dark => (Black, Gray, White, DarkGray, [White, Gray]),
            Self::Retro => (Black, Yellow, LightYellow, DarkGray, [LightYellow, Magenta]),
            Self::Elegant => (Black, White, Rgb(212, 175, 55), DarkGray, [Rgb(212, 175, 55), Gray]),
            Self::Mature => (Rgb(40, 30, 30), Rgb(230, 220, 200), Rgb(170, 120, 80), Gray, [Rgb(170, 120, 80), Rgb(120, 140, 100)]),
            Self::Dreamland => (Rgb(30, 20, 60), LightMagenta, LightBlue, Magenta, [LightBlue, LightMagenta]),
            Self::Grandpa => (Rgb(60, 50, 40), Rgb(220, 200, 160), Rgb(200, 160, 100), Gray, [Rgb(200, 160, 100), Rgb(150, 150, 120)]),
            Self::Salad => (Rgb(240, 250, 230), Rgb(40, 80, 30), Green, Rgb(120, 150, 100), [Green, Rgb(220, 60, 40)]),
            Self::Girly => (Rgb(255, 230, 240), Rgb(120, 30, 80), LightMagenta, Rgb(200, 150, 180), [Magenta, Rgb(255, 105, 180)]),
            Self::Serious => (White, Black, Black, Gray, [Black, DarkGray]),
            Self::Sahara => (Rgb(240, 220, 170), Rgb(90, 60, 20), Rgb(200, 120, 40), Rgb(170, 140, 90), [Rgb(200, 120, 40), Rgb(140, 80, 30)]),
            Self::Scream => (Red, Yellow, White, LightRed, [Yellow, White]),
        };
        Palette {
            background,
            foreground,
            accent,
            muted,
            series,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|t| t.name()).collect();
                format!("unknown theme '{s}' (available: {})", names.join(", "))
            })
    }
}
