//! Old-versus-new regime recommendation.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::TaxCalculator;
use crate::models::{DeductionClaim, Regime, RegimeComparison, RegimeRequest};
use crate::validation::InvalidInput;

impl TaxCalculator<'_> {
    /// Computes both regimes from the same raw claims and recommends the one
    /// with the smaller total tax.
    ///
    /// The new regime silently zeroes sections it does not allow. Ties go to
    /// the new regime, which carries the lighter compliance burden.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::NegativeGrossIncome`] if `gross_income` is
    /// negative.
    pub fn recommend_regime(
        &self,
        gross_income: Decimal,
        deductions: &DeductionClaim,
    ) -> Result<RegimeComparison, InvalidInput> {
        let old_result = self.compute_tax(gross_income, deductions, Regime::Old)?;
        let new_result = self.compute_tax(gross_income, deductions, Regime::New)?;

        let recommended = if new_result.total_tax <= old_result.total_tax {
            Regime::New
        } else {
            Regime::Old
        };
        let savings = (old_result.total_tax - new_result.total_tax).abs();

        debug!(%recommended, %savings, "compared regimes");

        Ok(RegimeComparison {
            recommended,
            old_result,
            new_result,
            savings,
        })
    }

    /// Validates a raw comparison request and runs it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`] as described on [`RegimeRequest::validate`].
    pub fn recommend_request(
        &self,
        request: &RegimeRequest,
    ) -> Result<RegimeComparison, InvalidInput> {
        let (gross_income, deductions) = request.validate()?;
        self.recommend_regime(gross_income, &deductions)
    }
}
