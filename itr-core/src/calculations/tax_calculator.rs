//! Income tax computation under either regime.
//!
//! The calculation runs in the following steps:
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Allow each claim up to its cap if the section applies in the regime, else 0 |
//! | 2    | Total deductions (sum of allowed amounts, then combined ceilings) |
//! | 3    | Taxable income (gross − deductions, minimum 0) |
//! | 4    | Tax from the regime's progressive slabs |
//! | 5    | Section 87A rebate if taxable income ≤ threshold |
//! | 6    | Cess on tax after rebate |
//! | 7    | Total tax (step 4 − step 5 + step 6, rounded half-up to whole rupees) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use itr_core::calculations::TaxCalculator;
//! use itr_core::{DeductionClaim, DeductionSection, Regime, TaxRuleTable};
//!
//! let rules = TaxRuleTable::fy_2024_25();
//! let calculator = TaxCalculator::new(&rules);
//!
//! let claim = DeductionClaim::new()
//!     .with(DeductionSection::Section80C, dec!(150000))
//!     .unwrap()
//!     .with(DeductionSection::Section80D, dec!(25000))
//!     .unwrap();
//!
//! let result = calculator
//!     .compute_tax(dec!(1000000), &claim, Regime::Old)
//!     .unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(825000));
//! assert_eq!(result.tax_before_cess, dec!(77500));
//! assert_eq!(result.cess, dec!(3100));
//! assert_eq!(result.total_tax, dec!(80600));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{floor_at_zero, round_half_up, saturating_sum};
use crate::calculations::progressive_tax;
use crate::models::{
    AllowedDeduction, DeductionClaim, Regime, TaxNote, TaxRequest, TaxResult, TaxRuleTable,
};
use crate::validation::{InvalidInput, check_gross_income};

/// Calculator bound to one fiscal year's rule table.
///
/// Holds only a shared reference, so a single table can serve any number of
/// calculators on any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    rules: &'a TaxRuleTable,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(rules: &'a TaxRuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'a TaxRuleTable {
        self.rules
    }

    /// Computes the tax payable on `gross_income` under `regime`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::NegativeGrossIncome`] if `gross_income` is
    /// negative, and [`InvalidInput::AmountOutOfRange`] if the payable tax
    /// itself cannot be represented. Deduction keys and amounts are already
    /// validated by [`DeductionClaim`].
    pub fn compute_tax(
        &self,
        gross_income: Decimal,
        deductions: &DeductionClaim,
        regime: Regime,
    ) -> Result<TaxResult, InvalidInput> {
        let gross_income = check_gross_income(gross_income)?;

        let allowed = self.allowed_deductions(deductions, regime);
        let total_deductions = self.total_deductions(&allowed);
        let taxable_income = self.taxable_income(gross_income, total_deductions);

        let slab_tax = progressive_tax(self.rules.slabs(regime), taxable_income);
        let tax_before_cess = slab_tax.tax;

        let rebate_applied = self.rebate(regime, taxable_income, tax_before_cess);
        let tax_after_rebate = tax_before_cess - rebate_applied;
        let cess = self.cess(tax_after_rebate);
        let total_tax = self.total_tax(tax_after_rebate, cess)?;

        let notes = self
            .marginal_relief_note(regime, taxable_income)
            .into_iter()
            .collect();

        debug!(
            %regime,
            %gross_income,
            %total_deductions,
            %taxable_income,
            %total_tax,
            "computed tax"
        );

        Ok(TaxResult {
            gross_income,
            total_deductions,
            taxable_income,
            tax_before_cess,
            rebate_applied,
            tax_after_rebate,
            cess,
            total_tax,
            regime_used: regime,
            deductions: allowed,
            slab_breakdown: slab_tax.breakdown,
            notes,
        })
    }

    /// Validates a raw request and computes it.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`] as described on [`TaxRequest::validate`].
    pub fn compute_request(
        &self,
        request: &TaxRequest,
    ) -> Result<TaxResult, InvalidInput> {
        let (gross_income, deductions, regime) = request.validate()?;
        self.compute_tax(gross_income, &deductions, regime)
    }

    /// Allows each claim up to its cap, or 0 where the section does not apply.
    fn allowed_deductions(
        &self,
        deductions: &DeductionClaim,
        regime: Regime,
    ) -> Vec<AllowedDeduction> {
        deductions
            .iter()
            .map(|(section, claimed)| {
                let allowed = self
                    .rules
                    .deduction_rule(section)
                    .map_or(Decimal::ZERO, |rule| rule.allowed(claimed, regime));
                AllowedDeduction {
                    section,
                    claimed,
                    allowed,
                }
            })
            .collect()
    }

    /// Sums allowed amounts, counting each combined group at no more than its
    /// ceiling.
    ///
    /// Combined ceilings never share a section, so each excess is removed
    /// once. The sum saturates at [`Decimal::MAX`]; taxable income is 0 long
    /// before that.
    fn total_deductions(
        &self,
        allowed: &[AllowedDeduction],
    ) -> Decimal {
        let combined_caps = self.rules.combined_caps();
        let in_group = |d: &&AllowedDeduction| {
            combined_caps
                .iter()
                .any(|combined| combined.sections.contains(&d.section))
        };

        let ungrouped = allowed.iter().filter(|d| !in_group(d)).map(|d| d.allowed);
        let grouped = combined_caps.iter().map(|combined| {
            let members = allowed
                .iter()
                .filter(|d| combined.sections.contains(&d.section))
                .map(|d| d.allowed);
            saturating_sum(members).min(combined.cap)
        });

        saturating_sum(ungrouped.chain(grouped))
    }

    fn taxable_income(
        &self,
        gross_income: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        floor_at_zero(gross_income - total_deductions)
    }

    /// Section 87A: the threshold itself still qualifies.
    fn rebate(
        &self,
        regime: Regime,
        taxable_income: Decimal,
        tax_before_cess: Decimal,
    ) -> Decimal {
        let rebate = self.rules.rebate(regime);
        if taxable_income <= rebate.threshold {
            tax_before_cess.min(rebate.max_amount)
        } else {
            Decimal::ZERO
        }
    }

    fn marginal_relief_note(
        &self,
        regime: Regime,
        taxable_income: Decimal,
    ) -> Option<TaxNote> {
        let rebate = self.rules.rebate(regime);
        if rebate.max_amount.is_zero() {
            return None;
        }

        let excess = taxable_income - rebate.threshold;
        if excess > Decimal::ZERO && excess <= self.rules.marginal_relief_margin() {
            debug!(%regime, %excess, "marginal relief band; rebate not applied");
            Some(TaxNote::MarginalReliefNotApplied {
                threshold: rebate.threshold,
                excess,
            })
        } else {
            None
        }
    }

    fn cess(
        &self,
        tax_after_rebate: Decimal,
    ) -> Decimal {
        tax_after_rebate * self.rules.cess_rate()
    }

    fn total_tax(
        &self,
        tax_after_rebate: Decimal,
        cess: Decimal,
    ) -> Result<Decimal, InvalidInput> {
        tax_after_rebate
            .checked_add(cess)
            .map(round_half_up)
            .ok_or(InvalidInput::AmountOutOfRange)
    }
}
