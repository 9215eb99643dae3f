//! Cell formatting, carried alongside values but never read by evaluation.

use std::str::FromStr;

use crate::error::CoreError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub font_size: u32,
    pub color: String,
    pub background_color: String,
}

impl Default for Formatting {
    fn default() -> Self {
        Formatting {
            bold: false,
            italic: false,
            font_size: 12,
            color: "#000000".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

/// Boolean formatting flags that can be toggled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatOption {
    Bold,
    Italic,
}

impl FromStr for FormatOption {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bold" => Ok(FormatOption::Bold),
            "italic" => Ok(FormatOption::Italic),
            _ => Err(CoreError::UnknownFormatOption(s.to_string())),
        }
    }
}

impl Formatting {
    pub fn toggle(&mut self, option: FormatOption) {
        match option {
            FormatOption::Bold => self.bold = !self.bold,
            FormatOption::Italic => self.italic = !self.italic,
        }
    }
}
