//! Versioned, immutable tax law data for one fiscal year.
//!
//! A [`TaxRuleTable`] can only be obtained through validation (see
//! [`TaxRuleTable::new`]), so every table handed to the calculator or the form
//! selector satisfies these invariants:
//!
//! - each regime has at least one slab, the first starting at zero;
//! - slabs are ascending and contiguous, each with `upper > lower`, and only
//!   the final slab is open-ended;
//! - rates and the cess rate lie in `[0, 1]`;
//! - deduction caps, combined caps, rebate figures, the marginal relief
//!   margin and the ITR-1 ceiling are non-negative;
//! - a rebate never exceeds the tax payable at its own threshold;
//! - each deduction section is configured at most once, and belongs to at
//!   most one combined cap.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::progressive_tax;
use crate::models::{DeductionSection, FiscalYear, Regime, TaxSlab};

/// Errors raised while validating a rule table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleTableError {
    #[error("{0} regime has no tax slabs")]
    EmptySlabs(Regime),

    #[error("{regime} regime slabs must start at 0, first slab starts at {lower_bound}")]
    FirstSlabNotAtZero { regime: Regime, lower_bound: Decimal },

    #[error("{regime} regime slab {index} has an upper bound not above its lower bound")]
    InvertedSlab { regime: Regime, index: usize },

    #[error("{regime} regime slab {index} does not start where the previous slab ends")]
    SlabGap { regime: Regime, index: usize },

    #[error("{regime} regime slab {index} is open-ended but is not the last slab")]
    UnboundedSlabNotLast { regime: Regime, index: usize },

    #[error("{0} regime slabs do not cover all income: the last slab must be open-ended")]
    BoundedFinalSlab(Regime),

    #[error("{regime} regime slab {index} has rate {rate} outside [0, 1]")]
    InvalidRate {
        regime: Regime,
        index: usize,
        rate: Decimal,
    },

    #[error("{0} regime rebate threshold and maximum must be non-negative")]
    NegativeRebate(Regime),

    #[error(
        "{regime} regime rebate of {max_amount} exceeds the {tax_at_threshold} \
         payable at its threshold"
    )]
    RebateExceedsTax {
        regime: Regime,
        max_amount: Decimal,
        tax_at_threshold: Decimal,
    },

    #[error("deduction cap for {0} must be non-negative")]
    NegativeCap(DeductionSection),

    #[error("deduction section {0} is configured more than once")]
    DuplicateDeduction(DeductionSection),

    #[error("combined cap {index} must name at least one section and be non-negative")]
    InvalidCombinedCap { index: usize },

    #[error("combined cap {index} repeats {section}, already limited by an earlier combined cap")]
    OverlappingCombinedCaps {
        index: usize,
        section: DeductionSection,
    },

    #[error("cess rate must be between 0 and 1, got {0}")]
    InvalidCessRate(Decimal),

    #[error("marginal relief margin must be non-negative, got {0}")]
    NegativeMarginalReliefMargin(Decimal),

    #[error("ITR-1 income ceiling must be non-negative, got {0}")]
    NegativeIncomeCeiling(Decimal),
}

/// Section 87A rebate: tax up to `max_amount` is waived when taxable income
/// does not exceed `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rebate {
    pub threshold: Decimal,
    pub max_amount: Decimal,
}

/// Slabs and rebate for a single regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeRules {
    pub slabs: Vec<TaxSlab>,
    pub rebate: Rebate,
}

/// Cap and regime eligibility for one deduction section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRule {
    pub section: DeductionSection,
    /// `None` means the claim is allowed in full.
    pub cap: Option<Decimal>,
    pub applies_in: BTreeSet<Regime>,
}

impl DeductionRule {
    pub fn new(
        section: DeductionSection,
        cap: Option<Decimal>,
        applies_in: impl IntoIterator<Item = Regime>,
    ) -> Self {
        Self {
            section,
            cap,
            applies_in: applies_in.into_iter().collect(),
        }
    }

    pub fn applies_in(
        &self,
        regime: Regime,
    ) -> bool {
        self.applies_in.contains(&regime)
    }

    /// Portion of `claimed` allowed under `regime`.
    pub fn allowed(
        &self,
        claimed: Decimal,
        regime: Regime,
    ) -> Decimal {
        if !self.applies_in(regime) {
            return Decimal::ZERO;
        }
        match self.cap {
            Some(cap) => claimed.min(cap),
            None => claimed,
        }
    }
}

/// A ceiling shared by several sections, applied after per-section clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedCap {
    pub sections: BTreeSet<DeductionSection>,
    pub cap: Decimal,
}

/// Unvalidated rule table contents, as assembled by a loader or by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRuleTableConfig {
    pub fiscal_year: FiscalYear,
    pub old_regime: RegimeRules,
    pub new_regime: RegimeRules,
    pub deductions: Vec<DeductionRule>,
    #[serde(default)]
    pub combined_caps: Vec<CombinedCap>,
    pub cess_rate: Decimal,
    pub marginal_relief_margin: Decimal,
    pub itr1_income_ceiling: Decimal,
}

impl TaxRuleTableConfig {
    fn regime(
        &self,
        regime: Regime,
    ) -> &RegimeRules {
        match regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }
}

/// Validated tax law data for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxRuleTable {
    fiscal_year: FiscalYear,
    old_regime: RegimeRules,
    new_regime: RegimeRules,
    deductions: BTreeMap<DeductionSection, DeductionRule>,
    combined_caps: Vec<CombinedCap>,
    cess_rate: Decimal,
    marginal_relief_margin: Decimal,
    itr1_income_ceiling: Decimal,
}

impl TaxRuleTable {
    /// Validates `config` and freezes it into a table.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleTableError`] found; see the module
    /// documentation for the invariants checked.
    pub fn new(config: TaxRuleTableConfig) -> Result<Self, RuleTableError> {
        for regime in Regime::ALL {
            validate_regime(regime, config.regime(regime))?;
        }

        let mut deductions = BTreeMap::new();
        for rule in config.deductions {
            if rule.cap.is_some_and(|cap| cap < Decimal::ZERO) {
                return Err(RuleTableError::NegativeCap(rule.section));
            }
            if deductions.contains_key(&rule.section) {
                return Err(RuleTableError::DuplicateDeduction(rule.section));
            }
            deductions.insert(rule.section, rule);
        }

        let mut capped_sections = BTreeSet::new();
        for (index, combined) in config.combined_caps.iter().enumerate() {
            if combined.sections.is_empty() || combined.cap < Decimal::ZERO {
                return Err(RuleTableError::InvalidCombinedCap { index });
            }
            for &section in &combined.sections {
                if !capped_sections.insert(section) {
                    return Err(RuleTableError::OverlappingCombinedCaps { index, section });
                }
            }
        }

        if config.cess_rate < Decimal::ZERO || config.cess_rate > Decimal::ONE {
            return Err(RuleTableError::InvalidCessRate(config.cess_rate));
        }
        if config.marginal_relief_margin < Decimal::ZERO {
            return Err(RuleTableError::NegativeMarginalReliefMargin(
                config.marginal_relief_margin,
            ));
        }
        if config.itr1_income_ceiling < Decimal::ZERO {
            return Err(RuleTableError::NegativeIncomeCeiling(
                config.itr1_income_ceiling,
            ));
        }

        Ok(Self {
            fiscal_year: config.fiscal_year,
            old_regime: config.old_regime,
            new_regime: config.new_regime,
            deductions,
            combined_caps: config.combined_caps,
            cess_rate: config.cess_rate,
            marginal_relief_margin: config.marginal_relief_margin,
            itr1_income_ceiling: config.itr1_income_ceiling,
        })
    }

    /// Law in force for FY 2024-25 (AY 2025-26).
    pub fn fy_2024_25() -> Self {
        let config = fy_2024_25_config();
        Self {
            fiscal_year: config.fiscal_year,
            old_regime: config.old_regime,
            new_regime: config.new_regime,
            deductions: config
                .deductions
                .into_iter()
                .map(|rule| (rule.section, rule))
                .collect(),
            combined_caps: config.combined_caps,
            cess_rate: config.cess_rate,
            marginal_relief_margin: config.marginal_relief_margin,
            itr1_income_ceiling: config.itr1_income_ceiling,
        }
    }

    pub fn fiscal_year(&self) -> FiscalYear {
        self.fiscal_year
    }

    pub fn regime(
        &self,
        regime: Regime,
    ) -> &RegimeRules {
        match regime {
            Regime::Old => &self.old_regime,
            Regime::New => &self.new_regime,
        }
    }

    pub fn slabs(
        &self,
        regime: Regime,
    ) -> &[TaxSlab] {
        &self.regime(regime).slabs
    }

    pub fn rebate(
        &self,
        regime: Regime,
    ) -> Rebate {
        self.regime(regime).rebate
    }

    /// `None` when the section is not part of this year's law.
    pub fn deduction_rule(
        &self,
        section: DeductionSection,
    ) -> Option<&DeductionRule> {
        self.deductions.get(&section)
    }

    pub fn deduction_rules(&self) -> impl Iterator<Item = &DeductionRule> {
        self.deductions.values()
    }

    pub fn combined_caps(&self) -> &[CombinedCap] {
        &self.combined_caps
    }

    pub fn cess_rate(&self) -> Decimal {
        self.cess_rate
    }

    pub fn marginal_relief_margin(&self) -> Decimal {
        self.marginal_relief_margin
    }

    pub fn itr1_income_ceiling(&self) -> Decimal {
        self.itr1_income_ceiling
    }
}

impl TryFrom<TaxRuleTableConfig> for TaxRuleTable {
    type Error = RuleTableError;

    fn try_from(config: TaxRuleTableConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

fn validate_regime(
    regime: Regime,
    rules: &RegimeRules,
) -> Result<(), RuleTableError> {
    let slabs = &rules.slabs;
    let first = slabs.first().ok_or(RuleTableError::EmptySlabs(regime))?;
    if !first.lower_bound.is_zero() {
        return Err(RuleTableError::FirstSlabNotAtZero {
            regime,
            lower_bound: first.lower_bound,
        });
    }

    let last_index = slabs.len() - 1;
    for (index, slab) in slabs.iter().enumerate() {
        if slab.rate < Decimal::ZERO || slab.rate > Decimal::ONE {
            return Err(RuleTableError::InvalidRate {
                regime,
                index,
                rate: slab.rate,
            });
        }
        match slab.upper_bound {
            Some(upper) if upper <= slab.lower_bound => {
                return Err(RuleTableError::InvertedSlab { regime, index });
            }
            Some(_) if index == last_index => {
                return Err(RuleTableError::BoundedFinalSlab(regime));
            }
            None if index != last_index => {
                return Err(RuleTableError::UnboundedSlabNotLast { regime, index });
            }
            _ => {}
        }
        if index > 0 && slabs[index - 1].upper_bound != Some(slab.lower_bound) {
            return Err(RuleTableError::SlabGap { regime, index });
        }
    }

    let rebate = rules.rebate;
    if rebate.threshold < Decimal::ZERO || rebate.max_amount < Decimal::ZERO {
        return Err(RuleTableError::NegativeRebate(regime));
    }
    let tax_at_threshold = progressive_tax(slabs, rebate.threshold).tax;
    if rebate.max_amount > tax_at_threshold {
        return Err(RuleTableError::RebateExceedsTax {
            regime,
            max_amount: rebate.max_amount,
            tax_at_threshold,
        });
    }

    Ok(())
}

/// Unvalidated contents of [`TaxRuleTable::fy_2024_25`].
pub fn fy_2024_25_config() -> TaxRuleTableConfig {
    use DeductionSection::*;

    TaxRuleTableConfig {
        fiscal_year: FiscalYear::starting(2024),
        old_regime: RegimeRules {
            slabs: vec![
                TaxSlab::new(dec!(0), Some(dec!(250000)), dec!(0)),
                TaxSlab::new(dec!(250000), Some(dec!(500000)), dec!(0.05)),
                TaxSlab::new(dec!(500000), Some(dec!(1000000)), dec!(0.20)),
                TaxSlab::new(dec!(1000000), None, dec!(0.30)),
            ],
            rebate: Rebate {
                threshold: dec!(500000),
                max_amount: dec!(12500),
            },
        },
        new_regime: RegimeRules {
            slabs: vec![
                TaxSlab::new(dec!(0), Some(dec!(300000)), dec!(0)),
                TaxSlab::new(dec!(300000), Some(dec!(600000)), dec!(0.05)),
                TaxSlab::new(dec!(600000), Some(dec!(900000)), dec!(0.10)),
                TaxSlab::new(dec!(900000), Some(dec!(1200000)), dec!(0.15)),
                TaxSlab::new(dec!(1200000), Some(dec!(1500000)), dec!(0.20)),
                TaxSlab::new(dec!(1500000), None, dec!(0.30)),
            ],
            rebate: Rebate {
                threshold: dec!(700000),
                max_amount: dec!(25000),
            },
        },
        deductions: vec![
            DeductionRule::new(Section80C, Some(dec!(150000)), [Regime::Old]),
            DeductionRule::new(Section80D, Some(dec!(25000)), [Regime::Old]),
            DeductionRule::new(Section80E, None, [Regime::Old]),
            DeductionRule::new(Section80G, None, [Regime::Old]),
            DeductionRule::new(Section80Tta, Some(dec!(10000)), [Regime::Old]),
            DeductionRule::new(HomeLoanInterest, Some(dec!(200000)), [Regime::Old]),
            DeductionRule::new(
                StandardDeduction,
                Some(dec!(50000)),
                [Regime::Old, Regime::New],
            ),
        ],
        combined_caps: Vec::new(),
        cess_rate: dec!(0.04),
        marginal_relief_margin: dec!(30000),
        itr1_income_ceiling: dec!(5000000),
    }
}
