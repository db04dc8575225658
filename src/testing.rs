//! Testing helpers.

use assert_float_eq::*;
use chrono::NaiveDate;

use crate::xt::XtTable;
use crate::zone::{Zone, COLS, ZONES};

/// A table that is zero everywhere except `A1` (0.01) and `H12` (0.25).
pub fn corner_table() -> XtTable {
    let mut values = vec![0.0; ZONES];
    values[0] = 0.01;
    values[ZONES - 1] = 0.25;
    XtTable::try_from(values).unwrap()
}

/// A table that is 0.01 in column 1, rising by 0.01 per column to 0.12 in column 12.
pub fn column_table() -> XtTable {
    let values = (0..ZONES).map(|index| (index % COLS + 1) as f64 / 100.0).collect::<Vec<_>>();
    XtTable::try_from(values).unwrap()
}

pub fn zone(name: &str) -> Zone {
    Zone::parse(name).unwrap_or_else(|| panic!("invalid zone {name}"))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn assert_slice_f64_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_absolute_eq!(expected, actual, epsilon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_tables() {
        let corner = corner_table();
        assert_eq!(0.01, corner.by_name("A1"));
        assert_eq!(0.25, corner.by_name("H12"));
        assert_eq!(0.0, corner.by_name("D6"));

        let column = column_table();
        assert_slice_f64_absolute(
            &[0.01, 0.05, 0.12],
            &[column.by_name("H1"), column.by_name("C5"), column.by_name("A12")],
            1e-12,
        );
    }
}
