//! Interior design style catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A design style from the fixed catalog.
///
/// The first entry is the default selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignStyle {
    #[default]
    Modern,
    Minimalist,
    Scandinavian,
    Industrial,
    Bohemian,
    MidCenturyModern,
    Coastal,
    Farmhouse,
    Japandi,
    ArtDeco,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown design style: {0}")]
pub struct UnknownStyle(pub String);

impl DesignStyle {
    /// Every style in catalog order.
    pub const ALL: [DesignStyle; 10] = [
        DesignStyle::Modern,
        DesignStyle::Minimalist,
        DesignStyle::Scandinavian,
        DesignStyle::Industrial,
        DesignStyle::Bohemian,
        DesignStyle::MidCenturyModern,
        DesignStyle::Coastal,
        DesignStyle::Farmhouse,
        DesignStyle::Japandi,
        DesignStyle::ArtDeco,
    ];

    /// Human readable name, used verbatim in transform instructions.
    pub fn display_name(&self) -> &'static str {
        match self {
            DesignStyle::Modern => "Modern",
            DesignStyle::Minimalist => "Minimalist",
            DesignStyle::Scandinavian => "Scandinavian",
            DesignStyle::Industrial => "Industrial",
            DesignStyle::Bohemian => "Bohemian",
            DesignStyle::MidCenturyModern => "Mid-Century Modern",
            DesignStyle::Coastal => "Coastal",
            DesignStyle::Farmhouse => "Farmhouse",
            DesignStyle::Japandi => "Japandi",
            DesignStyle::ArtDeco => "Art Deco",
        }
    }
}

impl fmt::Display for DesignStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for DesignStyle {
    type Err = UnknownStyle;

    /// Accepts display names, kebab-case and snake_case, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |v: &str| {
            v.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        };
        let wanted = normalize(s);

        Self::ALL
            .into_iter()
            .find(|style| normalize(style.display_name()) == wanted)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}
