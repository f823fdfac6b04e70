use crate::error::{Result, TuiError};
use ratatui::style::{Color, Modifier, Style};

/// Series colors of the rating distribution chart, in category order.
pub const RATING_SERIES_HEX: [&str; 7] = [
    "#9b59b6", "#e74c3c", "#2ecc71", "#3498db", "#f39c12", "#1abc9c", "#e67e22",
];

/// Target airline bars in the sub-item comparison.
pub const TARGET_SERIES_HEX: &str = "#0095ff";
/// Average bars in the sub-item comparison.
pub const AVERAGE_SERIES_HEX: &str = "#00e096";

/// Word cloud shades for positive words.
pub const POSITIVE_PALETTE_HEX: [&str; 6] = [
    "#10b981", "#059669", "#34d399", "#6ee7b7", "#22c55e", "#16a34a",
];

/// Word cloud shades for negative words.
pub const NEGATIVE_PALETTE_HEX: [&str; 6] = [
    "#ef4444", "#dc2626", "#f87171", "#fca5a5", "#e11d48", "#be123c",
];

/// Parse a `#RRGGBB` color.
pub fn parse_hex_color(spec: &str) -> Result<Color> {
    let hex = spec.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(TuiError::InvalidColor {
            color: spec.to_string(),
        });
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| TuiError::InvalidColor {
            color: spec.to_string(),
        })
    };
    Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Like [`parse_hex_color`] but falls back to `fallback` for bad input.
pub fn hex_or(spec: &str, fallback: Color) -> Color {
    parse_hex_color(spec).unwrap_or(fallback)
}

pub fn palette(hexes: &[&str]) -> Vec<Color> {
    hexes.iter().map(|hex| hex_or(hex, Color::Gray)).collect()
}

/// Represents different UI component types for theming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Background,
    Border,
    Title,
    Text,
    Highlight,
    Selection,
    Error,
    Warning,
    Info,
    Success,
    Muted,
    Positive,
    Negative,
    Placeholder,
    MenuItem,
    MenuSelected,
    TileValue,
    TableHeader,
    Disabled,
}

/// Color theme configuration
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub name: String,
    pub background: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub highlight: Color,
    pub selection: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub success: Color,
    pub muted: Color,
    pub positive: Color,
    pub negative: Color,
    pub menu_selected: Color,
    pub tile_value: Color,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self::default_dark()
    }
}

impl ColorTheme {
    /// Default dark theme
    pub fn default_dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color::Rgb(26, 27, 38),
            border: Color::Rgb(68, 71, 90),
            title: Color::Rgb(199, 146, 234),
            text: Color::Rgb(192, 202, 245),
            highlight: Color::Rgb(93, 95, 239),
            selection: Color::Rgb(49, 50, 68),
            error: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(249, 226, 175),
            info: Color::Rgb(116, 199, 236),
            success: Color::Rgb(166, 227, 161),
            muted: Color::Rgb(108, 112, 134),
            positive: Color::Rgb(16, 185, 129),
            negative: Color::Rgb(239, 68, 68),
            menu_selected: Color::Rgb(93, 95, 239),
            tile_value: Color::Rgb(250, 179, 135),
        }
    }

    /// Default light theme
    pub fn default_light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color::Rgb(239, 241, 245),
            border: Color::Rgb(140, 143, 161),
            title: Color::Rgb(136, 57, 239),
            text: Color::Rgb(76, 79, 105),
            highlight: Color::Rgb(93, 95, 239),
            selection: Color::Rgb(220, 224, 232),
            error: Color::Rgb(210, 15, 57),
            warning: Color::Rgb(254, 100, 11),
            info: Color::Rgb(4, 165, 229),
            success: Color::Rgb(64, 160, 43),
            muted: Color::Rgb(156, 160, 176),
            positive: Color::Rgb(5, 150, 105),
            negative: Color::Rgb(220, 38, 38),
            menu_selected: Color::Rgb(93, 95, 239),
            tile_value: Color::Rgb(254, 100, 11),
        }
    }

    /// Get color for a specific component type
    pub fn get_color(&self, component: ComponentType) -> Color {
        match component {
            ComponentType::Background => self.background,
            ComponentType::Border => self.border,
            ComponentType::Title => self.title,
            ComponentType::Text | ComponentType::MenuItem => self.text,
            ComponentType::Highlight | ComponentType::TableHeader => self.highlight,
            ComponentType::Selection => self.selection,
            ComponentType::Error => self.error,
            ComponentType::Warning => self.warning,
            ComponentType::Info => self.info,
            ComponentType::Success => self.success,
            ComponentType::Muted | ComponentType::Placeholder | ComponentType::Disabled => {
                self.muted
            }
            ComponentType::Positive => self.positive,
            ComponentType::Negative => self.negative,
            ComponentType::MenuSelected => self.menu_selected,
            ComponentType::TileValue => self.tile_value,
        }
    }

    /// Get style for a specific component type
    pub fn get_style(&self, component: ComponentType) -> Style {
        let color = self.get_color(component);
        match component {
            ComponentType::Title | ComponentType::Highlight | ComponentType::TableHeader => {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            }
            ComponentType::Selection => Style::default().bg(color),
            ComponentType::Error => Style::default().fg(color).add_modifier(Modifier::BOLD),
            ComponentType::Positive | ComponentType::Negative => Style::default()
                .fg(color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ComponentType::Placeholder => Style::default().fg(color).add_modifier(Modifier::ITALIC),
            ComponentType::MenuSelected => Style::default()
                .fg(Color::White)
                .bg(color)
                .add_modifier(Modifier::BOLD),
            ComponentType::TileValue => Style::default().fg(color).add_modifier(Modifier::BOLD),
            ComponentType::Disabled => Style::default().fg(color).add_modifier(Modifier::DIM),
            _ => Style::default().fg(color),
        }
    }
}

/// Theme manager for handling multiple themes and theme switching
#[derive(Debug, Clone)]
pub struct ThemeManager {
    current_theme: ColorTheme,
    available_themes: Vec<ColorTheme>,
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeManager {
    /// Create a new theme manager with the dark and light themes
    pub fn new() -> Self {
        let dark = ColorTheme::default_dark();
        Self {
            current_theme: dark.clone(),
            available_themes: vec![dark, ColorTheme::default_light()],
        }
    }

    /// Get the current active theme
    pub fn current_theme(&self) -> &ColorTheme {
        &self.current_theme
    }

    pub fn available_themes(&self) -> &[ColorTheme] {
        &self.available_themes
    }

    /// Switch to theme by name
    pub fn set_theme(&mut self, theme_name: &str) -> Result<()> {
        let theme = self
            .available_themes
            .iter()
            .find(|t| t.name == theme_name)
            .cloned()
            .ok_or_else(|| TuiError::ThemeNotFound {
                theme: theme_name.to_string(),
            })?;
        self.current_theme = theme;
        Ok(())
    }

    /// Switch to next theme in the list
    pub fn next_theme(&mut self) {
        if let Some(current_index) = self
            .available_themes
            .iter()
            .position(|t| t.name == self.current_theme.name)
        {
            let next_index = (current_index + 1) % self.available_themes.len();
            self.current_theme = self.available_themes[next_index].clone();
        }
    }

    pub fn get_color(&self, component: ComponentType) -> Color {
        self.current_theme.get_color(component)
    }

    pub fn get_style(&self, component: ComponentType) -> Style {
        self.current_theme.get_style(component)
    }
}
