use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DeductionClaim, Regime};
use crate::validation::{InvalidInput, check_gross_income};

fn default_regime() -> String {
    Regime::New.as_str().to_string()
}

/// Raw request body for a single-regime computation.
///
/// Fields are kept untyped so that an unknown regime or deduction key can be
/// reported as [`InvalidInput`] instead of a generic deserialisation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRequest {
    pub gross_income: Decimal,
    #[serde(default)]
    pub deductions: BTreeMap<String, Decimal>,
    #[serde(default = "default_regime")]
    pub regime: String,
}

impl TaxRequest {
    /// Validates the request into typed calculator inputs.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`] for a negative gross income, an unknown
    /// regime, an unrecognised deduction key or a negative claim.
    pub fn validate(&self) -> Result<(Decimal, DeductionClaim, Regime), InvalidInput> {
        let gross_income = check_gross_income(self.gross_income)?;
        let regime = self.regime.parse::<Regime>()?;
        let claim = DeductionClaim::from_raw(
            self.deductions
                .iter()
                .map(|(key, amount)| (key.as_str(), *amount)),
        )?;
        Ok((gross_income, claim, regime))
    }
}

/// Raw request body for a regime comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeRequest {
    pub gross_income: Decimal,
    #[serde(default)]
    pub deductions: BTreeMap<String, Decimal>,
}

impl RegimeRequest {
    /// Validates the request into typed comparison inputs.
    ///
    /// # Errors
    ///
    /// Same as [`TaxRequest::validate`], minus the regime check.
    pub fn validate(&self) -> Result<(Decimal, DeductionClaim), InvalidInput> {
        let gross_income = check_gross_income(self.gross_income)?;
        let claim = DeductionClaim::from_raw(
            self.deductions
                .iter()
                .map(|(key, amount)| (key.as_str(), *amount)),
        )?;
        Ok((gross_income, claim))
    }
}
