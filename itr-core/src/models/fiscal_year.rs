use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid fiscal year '{0}', expected a label such as \"2024-25\"")]
pub struct InvalidFiscalYear(pub String);

/// An April-to-March financial year, identified by the calendar year it
/// starts in and written as `2024-25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FiscalYear(i32);

impl FiscalYear {
    pub const fn starting(year: i32) -> Self {
        Self(year)
    }

    pub fn start_year(&self) -> i32 {
        self.0
    }

    /// The year in which income of this fiscal year is assessed.
    pub fn assessment_year(&self) -> FiscalYear {
        FiscalYear(self.0 + 1)
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl FromStr for FiscalYear {
    type Err = InvalidFiscalYear;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidFiscalYear(s.to_string());

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if start.len() != 4 || end.len() != 2 || !all_digits(start) || !all_digits(end) {
            return Err(invalid());
        }
        let start: i32 = start.parse().map_err(|_| invalid())?;
        let end: i32 = end.parse().map_err(|_| invalid())?;
        if (start + 1).rem_euclid(100) != end {
            return Err(invalid());
        }

        Ok(FiscalYear(start))
    }
}

impl TryFrom<String> for FiscalYear {
    type Error = InvalidFiscalYear;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FiscalYear> for String {
    fn from(year: FiscalYear) -> Self {
        year.to_string()
    }
}
