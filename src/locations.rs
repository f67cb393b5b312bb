//! Selectable route endpoints.
//!
//! Preset ids mirror the backend's location table; `R` and `C` are the two
//! special identifiers it understands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire id of the reusable "random node" identifier.
pub const RANDOM_ID: &str = "R";
/// Wire id of the custom-coordinates identifier.
pub const CUSTOM_ID: &str = "C";

/// Preset locations known to the backend, indexed by `id - 1`.
pub const PRESETS: &[&str] = &[
    "Taksim Square",
    "Sultanahmet (Blue Mosque)",
    "Galata Tower",
    "Grand Bazaar",
    "Hagia Sophia",
    "Topkapi Palace",
    "Eminonu Ferry Port",
    "Besiktas",
    "Kadikoy",
    "Ortakoy",
    "Balat",
    "Fatih Mosque",
    "Suleymaniye Mosque",
    "Dolmabahce Palace",
    "Istiklal Street",
    "Bakirkoy (Far West - European)",
    "Atakoy (West Coast - European)",
    "Uskudar (Asian Side)",
    "Umraniye (Far East - Asian)",
    "Pendik (Very Far East - Asian)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Preset,
    /// May legally appear on both ends of a route.
    Reusable,
    /// Requires custom latitude/longitude before submission.
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LocationId {
    /// 1-based index into [`PRESETS`].
    Preset(u8),
    Random,
    Custom,
}

impl LocationId {
    pub fn kind(self) -> LocationKind {
        match self {
            LocationId::Preset(_) => LocationKind::Preset,
            LocationId::Random => LocationKind::Reusable,
            LocationId::Custom => LocationKind::Custom,
        }
    }

    pub fn is_custom(self) -> bool {
        self.kind() == LocationKind::Custom
    }

    /// Whether this id may be chosen as both origin and destination.
    pub fn allows_same_endpoint(self) -> bool {
        matches!(self.kind(), LocationKind::Reusable | LocationKind::Custom)
    }

    /// Human-readable label for selection lists.
    pub fn label(self) -> String {
        match self {
            LocationId::Preset(n) => PRESETS
                .get(usize::from(n).saturating_sub(1))
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Location {n}")),
            LocationId::Random => "Random location".into(),
            LocationId::Custom => "Custom coordinates".into(),
        }
    }

    /// Every selectable id in display order: presets first, then the special ones.
    pub fn all() -> Vec<LocationId> {
        let mut ids: Vec<LocationId> = (1..=PRESETS.len() as u8).map(LocationId::Preset).collect();
        ids.push(LocationId::Random);
        ids.push(LocationId::Custom);
        ids
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationId::Preset(n) => f.pad(&n.to_string()),
            LocationId::Random => f.pad(RANDOM_ID),
            LocationId::Custom => f.pad(CUSTOM_ID),
        }
    }
}

impl From<LocationId> for String {
    fn from(id: LocationId) -> Self {
        id.to_string()
    }
}

impl FromStr for LocationId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(RANDOM_ID) {
            return Ok(LocationId::Random);
        }
        if s.eq_ignore_ascii_case(CUSTOM_ID) {
            return Ok(LocationId::Custom);
        }
        match s.parse::<u8>() {
            Ok(n) if n >= 1 && usize::from(n) <= PRESETS.len() => Ok(LocationId::Preset(n)),
            _ => Err(format!(
                "unknown location '{s}' (expected 1-{}, {RANDOM_ID} or {CUSTOM_ID})",
                PRESETS.len()
            )),
        }
    }
}

impl TryFrom<String> for LocationId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_ids() {
        assert_eq!("7".parse::<LocationId>(), Ok(LocationId::Preset(7)));
        assert_eq!("r".parse::<LocationId>(), Ok(LocationId::Random));
        assert_eq!("C".parse::<LocationId>(), Ok(LocationId::Custom));
        assert!("0".parse::<LocationId>().is_err());
        assert!("21".parse::<LocationId>().is_err());
        assert!("nowhere".parse::<LocationId>().is_err());
    }

    #[test]
    fn special_ids_allow_same_endpoint() {
        assert!(LocationId::Random.allows_same_endpoint());
        assert!(LocationId::Custom.allows_same_endpoint());
        assert!(!LocationId::Preset(3).allows_same_endpoint());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&LocationId::Preset(12)).unwrap();
        assert_eq!(json, "\"12\"");
        let back: LocationId = serde_json::from_str("\"R\"").unwrap();
        assert_eq!(back, LocationId::Random);
    }

    #[test]
    fn all_lists_presets_then_specials() {
        let ids = LocationId::all();
        assert_eq!(ids.len(), PRESETS.len() + 2);
        assert_eq!(ids[0].label(), "Taksim Square");
        assert_eq!(ids[ids.len() - 1], LocationId::Custom);
    }
}
