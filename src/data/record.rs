//! Record Module
//! Row type of the exports dataset and the calendar-ordered month.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown month name: {0:?}")]
pub struct UnknownMonth(pub String);

/// Calendar month. Ordering follows the calendar, not the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Zero-based position in the calendar (January = 0).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Month> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    /// Three-letter axis label.
    pub fn short_name(self) -> &'static str {
        &self.name()[..3]
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = UnknownMonth;

    /// Accepts full names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Month::ALL
            .iter()
            .copied()
            .find(|m| {
                m.name().eq_ignore_ascii_case(needle) || m.short_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| UnknownMonth(s.to_string()))
    }
}

/// One (Year, Month, Product) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub product: String,
    pub year: i32,
    pub month: Month,
    pub production: f64,
    pub exports: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_sort_in_calendar_order() {
        let mut months: Vec<Month> = ["December", "April", "January", "August", "February"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        months.sort();
        assert_eq!(
            months,
            vec![
                Month::January,
                Month::February,
                Month::April,
                Month::August,
                Month::December
            ]
        );
    }

    #[test]
    fn parse_is_lenient_on_case_and_abbreviation() {
        assert_eq!(" march ".parse::<Month>().unwrap(), Month::March);
        assert_eq!("SEP".parse::<Month>().unwrap(), Month::September);
        assert_eq!(
            "Smarch".parse::<Month>(),
            Err(UnknownMonth("Smarch".to_string()))
        );
    }

    #[test]
    fn index_round_trips_through_all() {
        for (i, m) in Month::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
            assert_eq!(Month::from_index(i), Some(*m));
        }
        assert_eq!(Month::from_index(12), None);
        assert_eq!(Month::May.short_name(), "May");
    }
}
