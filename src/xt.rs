//! Expected threat (xT): a fixed, non-negative possession value per zone, broadly increasing
//! toward the attacking goal. The table is supplied externally; this module only validates and
//! reads it.

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::zone::{Zone, COLS, ROWS, ZONES};

#[rustfmt::skip]
const DEFAULT_GRID: [[f64; COLS]; ROWS] = [
    [0.00638303, 0.00779616, 0.00844854, 0.00977659, 0.01126267, 0.01248344, 0.01473596, 0.0174506, 0.02122129, 0.02756312, 0.03485072, 0.0379259],
    [0.00750072, 0.00878589, 0.00942382, 0.0105949, 0.01214719, 0.0138454, 0.01611813, 0.01870347, 0.02401521, 0.02953272, 0.04066992, 0.04647721],
    [0.0088799, 0.00977745, 0.01001304, 0.01110462, 0.01269174, 0.01429128, 0.01685596, 0.01935132, 0.0241224, 0.02855202, 0.05491138, 0.06442595],
    [0.00941056, 0.01082722, 0.01016549, 0.01132376, 0.01262646, 0.01484598, 0.01689528, 0.0199707, 0.02385149, 0.03511326, 0.10805102, 0.25745362],
    [0.00941056, 0.01082722, 0.01016549, 0.01132376, 0.01262646, 0.01484598, 0.01689528, 0.0199707, 0.02385149, 0.03511326, 0.10805102, 0.25745362],
    [0.0088799, 0.00977745, 0.01001304, 0.01110462, 0.01269174, 0.01429128, 0.01685596, 0.01935132, 0.0241224, 0.02855202, 0.05491138, 0.06442595],
    [0.00750072, 0.00878589, 0.00942382, 0.0105949, 0.01214719, 0.0138454, 0.01611813, 0.01870347, 0.02401521, 0.02953272, 0.04066992, 0.04647721],
    [0.00638303, 0.00779616, 0.00844854, 0.00977659, 0.01126267, 0.01248344, 0.01473596, 0.0174506, 0.02122129, 0.02756312, 0.03485072, 0.0379259],
];

#[derive(Debug, Error, PartialEq)]
pub enum InvalidXtTable {
    #[error("expected 96 values, got {0}")]
    WrongLength(usize),

    #[error("expected 8 rows, got {0}")]
    WrongRows(usize),

    #[error("expected 12 values in row {row}, got {cols}")]
    WrongCols { row: usize, cols: usize },

    #[error("invalid value {value} in zone {zone}")]
    InvalidValue { zone: Zone, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct XtTable([f64; ZONES]);

impl XtTable {
    /// xT of the given zone; a missing zone reads as zero.
    #[inline(always)]
    pub fn value(&self, zone: Option<Zone>) -> f64 {
        zone.map_or(0.0, |zone| self.0[zone.index()])
    }

    /// xT of the point-mirror of the given zone; the attacking-equivalent reading of a zone
    /// described from the defending side.
    #[inline(always)]
    pub fn opposite_value(&self, zone: Option<Zone>) -> f64 {
        self.value(zone.map(|zone| zone.opposite()))
    }

    pub fn by_name(&self, name: &str) -> f64 {
        self.value(Zone::parse(name))
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, InvalidXtTable> {
        if rows.len() != ROWS {
            return Err(InvalidXtTable::WrongRows(rows.len()));
        }
        if let Some((row, cols)) = rows.iter().enumerate().find(|(_, cols)| cols.len() != COLS) {
            return Err(InvalidXtTable::WrongCols {
                row,
                cols: cols.len(),
            });
        }
        Self::try_from(rows.concat())
    }
}

impl Default for XtTable {
    fn default() -> Self {
        let mut values = [0.0; ZONES];
        for (row, cols) in DEFAULT_GRID.iter().enumerate() {
            values[row * COLS..(row + 1) * COLS].copy_from_slice(cols);
        }
        Self(values)
    }
}

impl TryFrom<Vec<f64>> for XtTable {
    type Error = InvalidXtTable;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let values: [f64; ZONES] = values
            .try_into()
            .map_err(|values: Vec<f64>| InvalidXtTable::WrongLength(values.len()))?;
        for zone in Zone::all() {
            let value = values[zone.index()];
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidXtTable::InvalidValue { zone, value });
            }
        }
        Ok(Self(values))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum XtRepr {
    Flat(Vec<f64>),
    Grid(Vec<Vec<f64>>),
}

impl<'de> Deserialize<'de> for XtTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = match XtRepr::deserialize(deserializer)? {
            XtRepr::Flat(values) => XtTable::try_from(values),
            XtRepr::Grid(rows) => XtTable::from_rows(&rows),
        };
        table.map_err(serde::de::Error::custom)
    }
}
