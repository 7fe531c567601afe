use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{DeductionSection, Regime};

/// How much of one claim survived caps and regime eligibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedDeduction {
    pub section: DeductionSection,
    pub claimed: Decimal,
    pub allowed: Decimal,
}

/// Income taxed within one slab and the tax it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlabTax {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
    pub taxed_amount: Decimal,
    pub tax: Decimal,
}

/// Simplifications the engine made that a reader of the result should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaxNote {
    /// Taxable income is just above the rebate threshold, where the statute
    /// grants marginal relief. Relief is not computed: the rebate is a cliff.
    MarginalReliefNotApplied {
        threshold: Decimal,
        excess: Decimal,
    },
}

/// Outcome of a single tax computation.
///
/// Every field except `total_tax` is kept at full precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_income: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax_before_cess: Decimal,
    pub rebate_applied: Decimal,
    pub tax_after_rebate: Decimal,
    pub cess: Decimal,
    /// Rounded half-up to whole rupees.
    pub total_tax: Decimal,
    pub regime_used: Regime,
    pub deductions: Vec<AllowedDeduction>,
    pub slab_breakdown: Vec<SlabTax>,
    pub notes: Vec<TaxNote>,
}

/// Side-by-side computation under both regimes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeComparison {
    pub recommended: Regime,
    pub old_result: TaxResult,
    pub new_result: TaxResult,
    /// Absolute difference between the two totals.
    pub savings: Decimal,
}

impl RegimeComparison {
    pub fn result(
        &self,
        regime: Regime,
    ) -> &TaxResult {
        match regime {
            Regime::Old => &self.old_result,
            Regime::New => &self.new_result,
        }
    }
}
