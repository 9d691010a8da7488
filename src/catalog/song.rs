use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Catalog-assigned identifier, unique across the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub u64);

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One record of the static catalog. Field names follow the dataset's JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    /// Song title
    pub song: String,
    pub movie: String,
    pub year: u16,
    pub composer: String,
    pub singer: String,
    pub lyricist: String,
}

/// Axis along which songs are filtered or grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Year,
    Singer,
    Composer,
    Lyricist,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Year,
        Dimension::Singer,
        Dimension::Composer,
        Dimension::Lyricist,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Singer => "singer",
            Dimension::Composer => "composer",
            Dimension::Lyricist => "lyricist",
        }
    }

    /// Plural form used for Others bucket labels ("Others (3 singers)")
    pub fn plural(self) -> &'static str {
        match self {
            Dimension::Year => "years",
            Dimension::Singer => "singers",
            Dimension::Composer => "composers",
            Dimension::Lyricist => "lyricists",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dimension '{0}' (expected year, singer, composer or lyricist)")]
pub struct ParseDimensionError(String);

impl FromStr for Dimension {
    type Err = ParseDimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" | "years" => Ok(Dimension::Year),
            "singer" | "singers" => Ok(Dimension::Singer),
            "composer" | "composers" => Ok(Dimension::Composer),
            "lyricist" | "lyricists" => Ok(Dimension::Lyricist),
            _ => Err(ParseDimensionError(s.to_string())),
        }
    }
}

/// A value tagged with the dimension it belongs to.
///
/// Chart clicks, checkbox toggles and aggregate keys all use this one type,
/// so a value can never be applied to the wrong dimension.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "dimension", content = "value", rename_all = "lowercase")]
pub enum DimensionValue {
    Year(u16),
    Singer(String),
    Composer(String),
    Lyricist(String),
}

impl DimensionValue {
    pub fn dimension(&self) -> Dimension {
        match self {
            DimensionValue::Year(_) => Dimension::Year,
            DimensionValue::Singer(_) => Dimension::Singer,
            DimensionValue::Composer(_) => Dimension::Composer,
            DimensionValue::Lyricist(_) => Dimension::Lyricist,
        }
    }

    /// Build a value for `dimension` from user text; years must parse as integers.
    pub fn parse(dimension: Dimension, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match dimension {
            Dimension::Year => raw.parse().ok().map(DimensionValue::Year),
            Dimension::Singer => Some(DimensionValue::Singer(raw.to_string())),
            Dimension::Composer => Some(DimensionValue::Composer(raw.to_string())),
            Dimension::Lyricist => Some(DimensionValue::Lyricist(raw.to_string())),
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Year(year) => write!(f, "{}", year),
            DimensionValue::Singer(name)
            | DimensionValue::Composer(name)
            | DimensionValue::Lyricist(name) => f.write_str(name),
        }
    }
}

/// `floor(year / 10) * 10`
pub fn decade_of(year: u16) -> u16 {
    year / 10 * 10
}

pub fn decade_label(decade: u16) -> String {
    format!("{}s", decade)
}

impl Song {
    pub fn decade(&self) -> u16 {
        decade_of(self.year)
    }

    /// Name stored for a person dimension; `None` for `Year`
    pub fn name_of(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Year => None,
            Dimension::Singer => Some(&self.singer),
            Dimension::Composer => Some(&self.composer),
            Dimension::Lyricist => Some(&self.lyricist),
        }
    }

    pub fn value_of(&self, dimension: Dimension) -> DimensionValue {
        match dimension {
            Dimension::Year => DimensionValue::Year(self.year),
            Dimension::Singer => DimensionValue::Singer(self.singer.clone()),
            Dimension::Composer => DimensionValue::Composer(self.composer.clone()),
            Dimension::Lyricist => DimensionValue::Lyricist(self.lyricist.clone()),
        }
    }

    /// Exact, case-sensitive comparison against the stored field
    pub fn has_value(&self, value: &DimensionValue) -> bool {
        match value {
            DimensionValue::Year(year) => self.year == *year,
            DimensionValue::Singer(name) => &self.singer == name,
            DimensionValue::Composer(name) => &self.composer == name,
            DimensionValue::Lyricist(name) => &self.lyricist == name,
        }
    }

    /// Fields a free-text search looks at
    pub fn search_fields(&self) -> [&str; 5] {
        [
            &self.movie,
            &self.song,
            &self.composer,
            &self.singer,
            &self.lyricist,
        ]
    }

    pub fn display_line(&self) -> String {
        format!("{} ({}, {}) - {}", self.song, self.movie, self.year, self.singer)
    }
}
