use std::fmt;

use serde::{Deserialize, Serialize};

/// Statutory income tax return forms for individuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItrForm {
    /// Sahaj: resident salaried individuals with simple income.
    #[serde(rename = "ITR-1")]
    Itr1,
    /// No business income; capital gains, several properties.
    #[serde(rename = "ITR-2")]
    Itr2,
    /// Business or professional income.
    #[serde(rename = "ITR-3")]
    Itr3,
    /// Sugam: presumptive business income.
    #[serde(rename = "ITR-4")]
    Itr4,
}

impl ItrForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Itr1 => "ITR-1",
            Self::Itr2 => "ITR-2",
            Self::Itr3 => "ITR-3",
            Self::Itr4 => "ITR-4",
        }
    }
}

impl fmt::Display for ItrForm {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
