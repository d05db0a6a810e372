//! Tone labels for grid cells.
//!
//! Each axis has three fixed levels indexed by `coord + 1`:
//!
//! ```text
//!            x = -1     x = 0      x = 1
//! y = -1   Casual     Neutral    Formal     + Friendly
//! y =  0   Casual     Neutral    Formal     + Neutral
//! y =  1   Casual     Neutral    Formal     + Direct
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::coord::Coordinate;

/// Formality level (x axis).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Formality {
    Casual,
    Neutral,
    Formal,
}

impl Formality {
    /// Levels in axis order, `LEVELS[x + 1]`.
    pub const LEVELS: [Formality; 3] = [Formality::Casual, Formality::Neutral, Formality::Formal];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Display label used in prompts and the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Formality::Casual => "Casual",
            Formality::Neutral => "Neutral",
            Formality::Formal => "Formal",
        }
    }

    /// One-line description for tooltips.
    pub fn description(&self) -> &'static str {
        match self {
            Formality::Casual => "Relaxed, informal language",
            Formality::Neutral => "Standard, balanced tone",
            Formality::Formal => "Professional, structured language",
        }
    }
}

impl std::fmt::Display for Formality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Voice level (y axis).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Voice {
    Friendly,
    Neutral,
    Direct,
}

impl Voice {
    /// Levels in axis order, `LEVELS[y + 1]`.
    pub const LEVELS: [Voice; 3] = [Voice::Friendly, Voice::Neutral, Voice::Direct];

    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Display label used in prompts and the UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Friendly => "Friendly",
            Voice::Neutral => "Neutral",
            Voice::Direct => "Direct",
        }
    }

    /// One-line description for tooltips.
    pub fn description(&self) -> &'static str {
        match self {
            Voice::Friendly => "Warm, approachable tone",
            Voice::Neutral => "Balanced, objective tone",
            Voice::Direct => "Clear, concise communication",
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The (formality, voice) pair a coordinate names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToneDescriptor {
    pub formality: Formality,
    pub voice: Voice,
}

impl ToneDescriptor {
    /// Map a validated coordinate to its labels. Total over valid coordinates.
    pub fn describe(coord: Coordinate) -> Self {
        let (fx, vy) = coord.level_indices();
        Self {
            formality: Formality::LEVELS[fx],
            voice: Voice::LEVELS[vy],
        }
    }

    /// Short label, e.g. `"Casual + Friendly"`.
    pub fn label(&self) -> String {
        format!("{} + {}", self.formality, self.voice)
    }

    /// Two-sentence tooltip: formality description, then voice description.
    pub fn tooltip(&self) -> String {
        format!(
            "{}. {}.",
            self.formality.description(),
            self.voice.description()
        )
    }
}

impl From<Coordinate> for ToneDescriptor {
    fn from(coord: Coordinate) -> Self {
        Self::describe(coord)
    }
}

// ============================================================================
// Tests
// ============================================================================
