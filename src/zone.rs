//! The fixed 8×12 zone grid laid over the pitch. Rows `A`–`H` run across the width of the pitch;
//! columns `1`–`12` run along its length, toward the attacking goal. A [Zone] is addressed either
//! by its index in `[0, 95]` or by its canonical name, such as `C7`.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

pub const ROWS: usize = 8;
pub const COLS: usize = 12;
pub const ZONES: usize = ROWS * COLS;

const FIRST_ROW: char = 'A';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Zone(u8);

impl Zone {
    pub fn from_index(index: usize) -> Option<Self> {
        (index < ZONES).then_some(Self(index as u8))
    }

    pub fn from_coords(row: usize, col: usize) -> Option<Self> {
        if row < ROWS && col < COLS {
            Some(Self((row * COLS + col) as u8))
        } else {
            None
        }
    }

    /// Parses a zone name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Self> {
        let mut chars = name.trim().chars();
        let letter = chars.next()?.to_ascii_uppercase();
        if !(FIRST_ROW..='H').contains(&letter) {
            return None;
        }
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number: usize = digits.parse().ok()?;
        if number == 0 {
            return None;
        }
        Self::from_coords(letter as usize - FIRST_ROW as usize, number - 1)
    }

    pub fn all() -> impl Iterator<Item = Zone> {
        (0..ZONES).map(|index| Self(index as u8))
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub fn row(&self) -> usize {
        self.index() / COLS
    }

    #[inline(always)]
    pub fn col(&self) -> usize {
        self.index() % COLS
    }

    pub fn row_letter(&self) -> char {
        (FIRST_ROW as u8 + self.row() as u8) as char
    }

    pub fn name(&self) -> String {
        format!("{}{}", self.row_letter(), self.col() + 1)
    }

    /// The point-mirror of this zone across the centre of the pitch.
    #[inline(always)]
    pub fn opposite(&self) -> Zone {
        Self(((ROWS - 1 - self.row()) * COLS + (COLS - 1 - self.col())) as u8)
    }

    /// Zones in the two outermost rows on either flank.
    pub fn is_lateral(&self) -> bool {
        matches!(self.row_letter(), 'A' | 'B' | 'G' | 'H')
    }
}

pub fn index_to_name(index: usize) -> Option<String> {
    Zone::from_index(index).map(|zone| zone.name())
}

pub fn name_to_index(name: &str) -> Option<usize> {
    Zone::parse(name).map(|zone| zone.index())
}

impl Display for Zone {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.row_letter(), self.col() + 1)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid zone '{0}'")]
pub struct ZoneParseError(pub String);

impl FromStr for Zone {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::parse(s).ok_or_else(|| ZoneParseError(s.to_string()))
    }
}

impl Serialize for Zone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZoneRepr {
    Index(i64),
    Name(String),
}
impl ZoneRepr {
    fn resolve(&self) -> Option<Zone> {
        match self {
            ZoneRepr::Index(index) => usize::try_from(*index).ok().and_then(Zone::from_index),
            ZoneRepr::Name(name) => Zone::parse(name),
        }
    }
}

impl<'de> Deserialize<'de> for Zone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = ZoneRepr::deserialize(deserializer)?;
        repr.resolve().ok_or_else(|| match repr {
            ZoneRepr::Index(index) => D::Error::custom(format!("zone index {index} out of range")),
            ZoneRepr::Name(name) => D::Error::custom(format!("invalid zone '{name}'")),
        })
    }
}

/// Deserializes an optional zone, degrading an unrecognised name or index to `None`.
pub fn deserialize_lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Zone>, D::Error> {
    let repr = Option::<ZoneRepr>::deserialize(deserializer)?;
    Ok(repr.and_then(|repr| {
        let zone = repr.resolve();
        if zone.is_none() {
            match repr {
                ZoneRepr::Index(index) => warn!("ignoring out-of-range zone index {index}"),
                ZoneRepr::Name(name) => warn!("ignoring unparsable zone '{name}'"),
            }
        }
        zone
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for zone in Zone::all() {
            assert_eq!(zone, zone.opposite().opposite());
        }
    }

    #[test]
    fn opposite_mirrors_both_axes() {
        assert_eq!("H12", Zone::parse("A1").unwrap().opposite().name());
        assert_eq!("E6", Zone::parse("D7").unwrap().opposite().name());
        assert_eq!("A12", Zone::parse("H1").unwrap().opposite().name());
    }

    #[test]
    fn name_round_trip() {
        for index in 0..ZONES {
            assert_eq!(Some(index), name_to_index(&index_to_name(index).unwrap()));
        }
    }

    #[test]
    fn index_layout() {
        assert_eq!(Some(0), name_to_index("A1"));
        assert_eq!(Some(11), name_to_index("A12"));
        assert_eq!(Some(12), name_to_index("B1"));
        assert_eq!(Some(95), name_to_index("H12"));
        let zone = Zone::from_index(30).unwrap();
        assert_eq!((2, 6), (zone.row(), zone.col()));
        assert_eq!("C7", zone.to_string());
    }

    #[test]
    fn names_are_trimmed_and_case_insensitive() {
        assert_eq!(name_to_index("A1"), name_to_index(" a1 "));
        assert_eq!(name_to_index("G10"), name_to_index("g10\t"));
    }

    #[test]
    fn invalid_input_is_none() {
        assert_eq!(None, index_to_name(96));
        assert_eq!(None, index_to_name(usize::MAX));
        for name in ["", " ", "I1", "A0", "A13", "1A", "A", "A-1", "A 1", "AA1", "Ä1"] {
            assert_eq!(None, name_to_index(name), "{name:?}");
        }
    }

    #[test]
    fn laterality() {
        let lateral: Vec<_> = (0..ROWS)
            .map(|row| Zone::from_coords(row, 0).unwrap().is_lateral())
            .collect();
        assert_eq!(
            vec![true, true, false, false, false, false, true, true],
            lateral
        );
    }

    #[test]
    fn from_str() {
        assert_eq!(Zone::from_index(13).unwrap(), Zone::from_str("b2").unwrap());
        assert_eq!(
            "invalid zone 'Z9'",
            Zone::from_str("Z9").err().unwrap().to_string()
        );
    }

    #[test]
    fn serde_accepts_names_and_indices() {
        let zones: Vec<Zone> = serde_json::from_str(r#"["c7", 30, "H12"]"#).unwrap();
        assert_eq!(
            vec![
                Zone::from_index(30).unwrap(),
                Zone::from_index(30).unwrap(),
                Zone::from_index(95).unwrap()
            ],
            zones
        );
        assert_eq!(r#""C7""#, serde_json::to_string(&zones[0]).unwrap());
        assert!(serde_json::from_str::<Zone>("96").is_err());
    }

    #[test]
    fn lenient_degrades_to_none() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "deserialize_lenient")]
            zone: Option<Zone>,
        }
        let parse = |json: &str| serde_json::from_str::<Holder>(json).unwrap().zone;
        assert_eq!(None, parse(r#"{"zone": "X99"}"#));
        assert_eq!(None, parse(r#"{"zone": -1}"#));
        assert_eq!(None, parse(r#"{"zone": null}"#));
        assert_eq!(None, parse(r#"{}"#));
        assert_eq!(Zone::from_index(0), parse(r#"{"zone": " a1 "}"#));
    }
}
