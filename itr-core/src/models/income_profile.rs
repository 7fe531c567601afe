use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeSource {
    Salary,
    Business,
    CapitalGainsShort,
    CapitalGainsLong,
    HouseProperty,
    OtherSources,
    ForeignAssets,
}

impl IncomeSource {
    pub fn is_capital_gains(&self) -> bool {
        matches!(self, Self::CapitalGainsShort | Self::CapitalGainsLong)
    }
}

/// Structured taxpayer profile consumed by the form selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeProfile {
    pub gross_income: Decimal,
    pub income_sources: BTreeSet<IncomeSource>,
    #[serde(default)]
    pub is_presumptive_business: bool,
    #[serde(default)]
    pub num_house_properties: u32,
    #[serde(default = "resident_by_default")]
    pub is_resident: bool,
    /// Capital gains from instruments that need the business-level schedules.
    #[serde(default)]
    pub has_complex_capital_gains: bool,
}

fn resident_by_default() -> bool {
    true
}

impl IncomeProfile {
    /// A resident profile with no properties and no special conditions.
    pub fn new(
        gross_income: Decimal,
        sources: impl IntoIterator<Item = IncomeSource>,
    ) -> Self {
        Self {
            gross_income,
            income_sources: sources.into_iter().collect(),
            is_presumptive_business: false,
            num_house_properties: 0,
            is_resident: true,
            has_complex_capital_gains: false,
        }
    }

    pub fn has_source(
        &self,
        source: IncomeSource,
    ) -> bool {
        self.income_sources.contains(&source)
    }

    pub fn has_capital_gains(&self) -> bool {
        self.income_sources.iter().any(IncomeSource::is_capital_gains)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn deserialize_applies_defaults() {
        let json = r#"{"gross_income": 600000, "income_sources": ["SALARY", "OTHER_SOURCES"]}"#;

        let profile: IncomeProfile = serde_json::from_str(json).unwrap();

        assert_eq!(
            profile,
            IncomeProfile::new(
                dec!(600000),
                [IncomeSource::Salary, IncomeSource::OtherSources]
            )
        );
    }

    #[test]
    fn deserialize_rejects_unknown_source() {
        let json = r#"{"gross_income": 1, "income_sources": ["LOTTERY"]}"#;

        assert!(serde_json::from_str::<IncomeProfile>(json).is_err());
    }

    #[test]
    fn has_capital_gains_detects_either_term() {
        let short = IncomeProfile::new(dec!(1), [IncomeSource::CapitalGainsShort]);
        let long = IncomeProfile::new(dec!(1), [IncomeSource::CapitalGainsLong]);
        let neither = IncomeProfile::new(dec!(1), [IncomeSource::Salary]);

        assert!(short.has_capital_gains());
        assert!(long.has_capital_gains());
        assert!(!neither.has_capital_gains());
    }
}
