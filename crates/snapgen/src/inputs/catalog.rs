//! Enumerated input values: the company list, quarters and the year window.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Companies offered by default.
pub const DEFAULT_COMPANIES: &[&str] = &[
    "Nutrien Ltd",
    "The Mosaic Company",
    "CF Industries Holdings",
    "Yara International ASA",
    "K+S Aktiengesellschaft",
    "ICL Group Ltd",
    "Dyno Nobel",
    "Corteva",
    "FMC Corporation",
    "Archer-Daniels-Midland Company",
    "Bunge Global SA",
    "Ingredion Incorporated",
    "Deere & Company",
    "AGCO Corporation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    /// Calendar quarter containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self::ALL[(date.month0() / 3) as usize]
    }

    pub fn number(self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}

impl FromStr for Quarter {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            other => Err(InputError::InvalidPeriod(format!("unknown quarter '{}'", other))),
        }
    }
}

/// A quarter of a year, written as `Q3 2024`. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub year: i32,
    pub quarter: Quarter,
}

impl ReportingPeriod {
    pub fn new(quarter: Quarter, year: i32) -> Self {
        Self { quarter, year }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(Quarter::of(date), date.year())
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quarter, self.year)
    }
}

impl FromStr for ReportingPeriod {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(quarter), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(InputError::InvalidPeriod(format!(
                "expected 'Q<n> <year>', got '{}'",
                s
            )));
        };
        let year = year
            .parse()
            .map_err(|_| InputError::InvalidPeriod(format!("invalid year '{}'", year)))?;
        Ok(Self::new(quarter.parse()?, year))
    }
}

/// Years a period may use: `current` and the `window` years before it,
/// newest first.
pub fn year_options(current: i32, window: u16) -> Vec<i32> {
    (0..=i32::from(window)).map(|offset| current - offset).collect()
}

/// Accepts `period` when its year lies in the window ending at `today`'s year
/// and its quarter has already started.
pub fn check_period(period: ReportingPeriod, today: NaiveDate, window: u16) -> Result<(), InputError> {
    let current = ReportingPeriod::containing(today);
    if !year_options(current.year, window).contains(&period.year) {
        return Err(InputError::InvalidPeriod(format!(
            "year {} is outside {}..={}",
            period.year,
            current.year - i32::from(window),
            current.year
        )));
    }
    if period > current {
        return Err(InputError::InvalidPeriod(format!(
            "{} has not started yet (current period is {})",
            period, current
        )));
    }
    Ok(())
}

/// Today formatted as `DD/MM/YYYY`.
pub fn default_prepared_date() -> String {
    Local::now().date_naive().format("%d/%m/%Y").to_string()
}
