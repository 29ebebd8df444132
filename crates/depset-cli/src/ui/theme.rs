//! Colors and layout shared by all output.

use crossterm::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Colors {
    pub repo: Color,
    pub file: Color,
    pub secondary: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
}

#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Spaces per tree level.
    pub indent: usize,
    /// Width of the label column in key/value listings.
    pub label_width: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub colors: Colors,
    pub layout: Layout,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: Colors {
                repo: Color::White,
                file: Color::Cyan,
                secondary: Color::DarkGrey,
                warning: Color::Yellow,
                error: Color::Red,
                success: Color::Green,
            },
            layout: Layout {
                indent: 2,
                label_width: 12,
            },
        }
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
