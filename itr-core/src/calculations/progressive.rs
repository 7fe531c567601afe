//! Progressive bracket computation over an ordered slab table.

use rust_decimal::Decimal;

use crate::models::{SlabTax, TaxSlab};

/// Tax produced by walking a slab table, with the per-slab contributions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressiveTax {
    pub tax: Decimal,
    pub breakdown: Vec<SlabTax>,
}

/// Taxes `taxable_income` across `slabs`.
///
/// Each slab whose lower bound is below the income contributes
/// `rate × (min(income, upper) − lower)`; the walk stops at the first slab
/// that contains the income. Slabs must be ascending and contiguous, which
/// [`TaxRuleTable`](crate::TaxRuleTable) guarantees. No rounding is applied.
pub fn progressive_tax(
    slabs: &[TaxSlab],
    taxable_income: Decimal,
) -> ProgressiveTax {
    let mut tax = Decimal::ZERO;
    let mut breakdown = Vec::new();

    for slab in slabs {
        if slab.lower_bound >= taxable_income {
            break;
        }

        let top = slab
            .upper_bound
            .map_or(taxable_income, |upper| upper.min(taxable_income));
        let taxed_amount = top - slab.lower_bound;
        let slab_tax = taxed_amount * slab.rate;
        tax += slab_tax;

        breakdown.push(SlabTax {
            lower_bound: slab.lower_bound,
            upper_bound: slab.upper_bound,
            rate: slab.rate,
            taxed_amount,
            tax: slab_tax,
        });

        if !slab.is_exceeded_by(taxable_income) {
            break;
        }
    }

    ProgressiveTax { tax, breakdown }
}
