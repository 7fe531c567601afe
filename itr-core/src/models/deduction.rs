use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::InvalidInput;

/// A deduction head recognised by the engine.
///
/// The wire identifiers returned by [`DeductionSection::as_str`] are the only
/// keys accepted at the boundary; anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeductionSection {
    /// Sec 80C: EPF, PPF, LIC, ELSS, NSC, tuition fees, home loan principal.
    #[serde(rename = "section_80c")]
    Section80C,
    /// Sec 80D: health insurance premiums.
    #[serde(rename = "section_80d")]
    Section80D,
    /// Sec 80E: interest on an education loan.
    #[serde(rename = "section_80e")]
    Section80E,
    /// Sec 80G: donations to specified funds and charities.
    #[serde(rename = "section_80g")]
    Section80G,
    /// Sec 80TTA: savings account interest.
    #[serde(rename = "section_80tta")]
    Section80Tta,
    /// Sec 24(b): interest on a housing loan.
    #[serde(rename = "home_loan_interest")]
    HomeLoanInterest,
    /// Flat deduction for salaried taxpayers.
    #[serde(rename = "standard_deduction")]
    StandardDeduction,
}

impl DeductionSection {
    pub const ALL: [DeductionSection; 7] = [
        DeductionSection::Section80C,
        DeductionSection::Section80D,
        DeductionSection::Section80E,
        DeductionSection::Section80G,
        DeductionSection::Section80Tta,
        DeductionSection::HomeLoanInterest,
        DeductionSection::StandardDeduction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section80C => "section_80c",
            Self::Section80D => "section_80d",
            Self::Section80E => "section_80e",
            Self::Section80G => "section_80g",
            Self::Section80Tta => "section_80tta",
            Self::HomeLoanInterest => "home_loan_interest",
            Self::StandardDeduction => "standard_deduction",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.as_str() == s)
    }
}

impl fmt::Display for DeductionSection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeductionSection {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidInput::UnknownDeductionSection(s.to_string()))
    }
}

/// Claimed amounts per deduction section, as declared by the taxpayer.
///
/// Amounts are raw claims; caps and regime eligibility are applied by the
/// calculator, not here. Deserialising from a map with an unrecognised key or
/// a negative amount fails with the corresponding [`InvalidInput`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Decimal>",
    into = "BTreeMap<String, Decimal>"
)]
pub struct DeductionClaim {
    claims: BTreeMap<DeductionSection, Decimal>,
}

impl DeductionClaim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::NegativeDeduction`] for a negative amount.
    pub fn with(
        mut self,
        section: DeductionSection,
        amount: Decimal,
    ) -> Result<Self, InvalidInput> {
        self.insert(section, amount)?;
        Ok(self)
    }

    /// Records a claim, replacing any earlier claim for the same section.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::NegativeDeduction`] for a negative amount.
    pub fn insert(
        &mut self,
        section: DeductionSection,
        amount: Decimal,
    ) -> Result<(), InvalidInput> {
        if amount < Decimal::ZERO {
            return Err(InvalidInput::NegativeDeduction { section, amount });
        }
        self.claims.insert(section, amount);
        Ok(())
    }

    pub fn get(
        &self,
        section: DeductionSection,
    ) -> Decimal {
        self.claims.get(&section).copied().unwrap_or(Decimal::ZERO)
    }

    /// Claims in section order.
    pub fn iter(&self) -> impl Iterator<Item = (DeductionSection, Decimal)> + '_ {
        self.claims.iter().map(|(section, amount)| (*section, *amount))
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Parses raw `identifier → amount` pairs received at the boundary.
    ///
    /// # Errors
    ///
    /// - [`InvalidInput::UnknownDeductionSection`] for an unrecognised key
    /// - [`InvalidInput::NegativeDeduction`] for a negative amount
    pub fn from_raw<'a, I>(raw: I) -> Result<Self, InvalidInput>
    where
        I: IntoIterator<Item = (&'a str, Decimal)>,
    {
        let mut claim = Self::new();
        for (key, amount) in raw {
            let section = key.parse::<DeductionSection>()?;
            claim.insert(section, amount)?;
        }
        Ok(claim)
    }
}

impl TryFrom<BTreeMap<String, Decimal>> for DeductionClaim {
    type Error = InvalidInput;

    fn try_from(raw: BTreeMap<String, Decimal>) -> Result<Self, Self::Error> {
        Self::from_raw(raw.iter().map(|(key, amount)| (key.as_str(), *amount)))
    }
}

impl From<DeductionClaim> for BTreeMap<String, Decimal> {
    fn from(claim: DeductionClaim) -> Self {
        claim
            .claims
            .into_iter()
            .map(|(section, amount)| (section.as_str().to_string(), amount))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_round_trips_every_identifier() {
        for section in DeductionSection::ALL {
            assert_eq!(DeductionSection::parse(section.as_str()), Some(section));
        }
    }

    #[test]
    fn parse_rejects_unknown_identifier() {
        let result = "section_99z".parse::<DeductionSection>();

        assert_eq!(
            result,
            Err(InvalidInput::UnknownDeductionSection("section_99z".to_string()))
        );
    }

    #[test]
    fn from_raw_rejects_unknown_key_instead_of_dropping_it() {
        let raw = [("section_80c", dec!(150000)), ("section_99z", dec!(10))];

        let result = DeductionClaim::from_raw(raw);

        assert_eq!(
            result,
            Err(InvalidInput::UnknownDeductionSection("section_99z".to_string()))
        );
    }

    #[test]
    fn from_raw_rejects_negative_amount() {
        let result = DeductionClaim::from_raw([("section_80d", dec!(-1))]);

        assert_eq!(
            result,
            Err(InvalidInput::NegativeDeduction {
                section: DeductionSection::Section80D,
                amount: dec!(-1),
            })
        );
    }

    #[test]
    fn get_defaults_to_zero_for_unclaimed_section() {
        let claim = DeductionClaim::new()
            .with(DeductionSection::Section80C, dec!(1000))
            .unwrap();

        assert_eq!(claim.get(DeductionSection::Section80C), dec!(1000));
        assert_eq!(claim.get(DeductionSection::Section80E), dec!(0));
    }

    #[test]
    fn deserialize_from_json_map() {
        let json = r#"{"section_80c": 150000, "home_loan_interest": "200000.50"}"#;

        let claim: DeductionClaim = serde_json::from_str(json).unwrap();

        assert_eq!(claim.get(DeductionSection::Section80C), dec!(150000));
        assert_eq!(claim.get(DeductionSection::HomeLoanInterest), dec!(200000.50));
    }

    #[test]
    fn deserialize_from_json_rejects_unknown_key() {
        let json = r#"{"section_99z": 1}"#;

        let err = serde_json::from_str::<DeductionClaim>(json).unwrap_err();

        assert!(
            err.to_string().contains("section_99z"),
            "unexpected error: {err}"
        );
    }
}
