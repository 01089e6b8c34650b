use std::fs;
use std::path::PathBuf;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

/// A `#rrggbb` color, validated when the theme file is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(Color);

impl HexColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Color::Rgb(r, g, b))
    }

    pub fn color(self) -> Color {
        self.0
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.strip_prefix('#').unwrap_or(&value);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(format!("expected #rrggbb, got {value:?}"));
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self::rgb(r, g, b)),
            _ => Err(format!("expected #rrggbb, got {value:?}")),
        }
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        match color.0 {
            Color::Rgb(r, g, b) => format!("#{r:02x}{g:02x}{b:02x}"),
            _ => "#ffffff".to_string(),
        }
    }
}

/// Declares the palette once: the struct, its fallback values and a
/// `Color` accessor per slot.
macro_rules! palette {
    ($($slot:ident = ($r:literal, $g:literal, $b:literal)),* $(,)?) => {
        #[derive(Clone, Debug, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ThemeColors {
            $(pub $slot: HexColor,)*
        }

        impl Default for ThemeColors {
            fn default() -> Self {
                Self {
                    $($slot: HexColor::rgb($r, $g, $b),)*
                }
            }
        }

        impl ThemeColors {
            $(
                pub fn $slot(&self) -> Color {
                    self.$slot.color()
                }
            )*
        }
    };
}

palette! {
    bg = (0x1e, 0x1e, 0x2e),
    fg = (0xcd, 0xd6, 0xf4),
    text_correct = (0xa6, 0xe3, 0xa1),
    text_incorrect = (0xf3, 0x8b, 0xa8),
    text_pending = (0x58, 0x5b, 0x70),
    text_reveal = (0xf9, 0xe2, 0xaf),
    accent = (0x89, 0xb4, 0xfa),
    accent_dim = (0x45, 0x47, 0x5a),
    border = (0x45, 0x47, 0x5a),
    border_focused = (0x89, 0xb4, 0xfa),
    header_bg = (0x31, 0x32, 0x44),
    header_fg = (0xcd, 0xd6, 0xf4),
    favorite = (0xf9, 0xe2, 0xaf),
    completed = (0xa6, 0xe3, 0xa1),
    error = (0xf3, 0x8b, 0xa8),
    success = (0xa6, 0xe3, 0xa1),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub colors: ThemeColors,
}

impl Theme {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// A user theme in `<config_dir>/verse-drill/themes/` shadows a bundled one
    /// of the same name. A user file that fails to parse is skipped.
    pub fn load(name: &str) -> Option<Self> {
        Self::load_user(name).or_else(|| Self::load_bundled(name))
    }

    fn user_path(name: &str) -> Option<PathBuf> {
        let dir = dirs::config_dir()?.join("verse-drill").join("themes");
        Some(dir.join(format!("{name}.toml")))
    }

    fn load_user(name: &str) -> Option<Self> {
        let path = Self::user_path(name)?;
        let content = fs::read_to_string(&path).ok()?;
        Self::parse(&content)
            .inspect_err(|e| tracing::warn!("ignoring {}: {e}", path.display()))
            .ok()
    }

    fn load_bundled(name: &str) -> Option<Self> {
        let file = ThemeAssets::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(&file.data).ok()?;
        Self::parse(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(str::to_string))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load_bundled("default").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}
