//! Built-in color palettes.
//!
//! A diagram carries one [`Style`]. The default palette draws nodes as
//! outlines and marks accept states with a second, inner outline; the two
//! filled palettes paint node bodies instead and color accept states
//! differently.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

/// Error returned when parsing an unknown style name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown style `{0}` (expected `default`, `style1` or `style2`)")]
pub struct ParseStyleError(String);

/// Selects one of the predefined color schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Outline-only nodes, double outline for accept states
    #[default]
    Default,
    /// Blue nodes, green accept states
    Style1,
    /// Red nodes, orange accept states
    Style2,
}

impl Style {
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Style1 => "style1",
            Self::Style2 => "style2",
        }
    }

    /// Returns `true` for the palettes that paint node bodies.
    pub fn is_filled(self) -> bool {
        !matches!(self, Self::Default)
    }

    /// Color scheme applied to node bodies and labels.
    pub fn palette(self) -> Palette {
        let (normal, accept, initial, text) = match self {
            Self::Default => ("transparent", "transparent", "transparent", "black"),
            Self::Style1 => ("blue", "green", "blue", "white"),
            Self::Style2 => ("red", "orange", "red", "white"),
        };
        Palette {
            normal: Color::from_static(normal),
            accept: Color::from_static(accept),
            initial: Color::from_static(initial),
            text: Color::from_static(text),
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "style1" => Ok(Self::Style1),
            "style2" => Ok(Self::Style2),
            _ => Err(ParseStyleError(s.to_string())),
        }
    }
}

/// Node colors for one [`Style`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    normal: Color,
    accept: Color,
    initial: Color,
    text: Color,
}

impl Palette {
    /// Body color for a node with the given flags. Accept wins over initial.
    pub fn node_fill(&self, is_accept_state: bool, is_initial: bool) -> Color {
        if is_accept_state {
            self.accept
        } else if is_initial {
            self.initial
        } else {
            self.normal
        }
    }

    /// Label color drawn on top of node bodies
    pub fn text(&self) -> Color {
        self.text
    }
}

/// Stroke color of the selected entity.
pub fn selection_color() -> Color {
    Color::from_static("blue")
}

/// Stroke color of everything that is not selected.
pub fn ink_color() -> Color {
    Color::from_static("black")
}
