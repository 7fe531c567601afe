//! The ordered decision rules behind form selection.
//!
//! Each rule is a plain predicate so it can be exercised on its own; the
//! order of [`FORM_RULES`] is what resolves overlaps between them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{IncomeProfile, IncomeSource, ItrForm, TaxRuleTable};

/// Stable identifier of a form-selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ComplexProfile,
    CapitalGainsOrMultipleProperties,
    PresumptiveBusiness,
    SimpleSalaried,
    Fallback,
}

impl RuleId {
    /// 1-based position in the evaluation order.
    pub fn number(&self) -> usize {
        match self {
            Self::ComplexProfile => 1,
            Self::CapitalGainsOrMultipleProperties => 2,
            Self::PresumptiveBusiness => 3,
            Self::SimpleSalaried => 4,
            Self::Fallback => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComplexProfile => "complex_profile",
            Self::CapitalGainsOrMultipleProperties => "capital_gains_or_multiple_properties",
            Self::PresumptiveBusiness => "presumptive_business",
            Self::SimpleSalaried => "simple_salaried",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named predicate and the form it selects.
#[derive(Debug, Clone, Copy)]
pub struct FormRule {
    pub id: RuleId,
    pub form: ItrForm,
    pub alternatives: &'static [ItrForm],
    pub reason: &'static str,
    predicate: fn(&IncomeProfile, &TaxRuleTable) -> bool,
}

impl FormRule {
    pub fn matches(
        &self,
        profile: &IncomeProfile,
        rules: &TaxRuleTable,
    ) -> bool {
        (self.predicate)(profile, rules)
    }
}

/// Rules evaluated top to bottom; the first match wins.
pub const FORM_RULES: [FormRule; 4] = [
    FormRule {
        id: RuleId::ComplexProfile,
        form: ItrForm::Itr3,
        alternatives: &[ItrForm::Itr2],
        reason: "Regular business income, complex capital gains, foreign assets or \
                 non-residency need the full return",
        predicate: is_complex_profile,
    },
    FormRule {
        id: RuleId::CapitalGainsOrMultipleProperties,
        form: ItrForm::Itr2,
        alternatives: &[ItrForm::Itr3],
        reason: "Capital gains or income from more than one house property",
        predicate: has_capital_gains_or_multiple_properties,
    },
    FormRule {
        id: RuleId::PresumptiveBusiness,
        form: ItrForm::Itr4,
        alternatives: &[ItrForm::Itr3],
        reason: "Business income declared under the presumptive taxation scheme",
        predicate: is_presumptive_business,
    },
    FormRule {
        id: RuleId::SimpleSalaried,
        form: ItrForm::Itr1,
        alternatives: &[ItrForm::Itr2],
        reason: "Salary, one house property and other sources within the ITR-1 income ceiling",
        predicate: is_simple_salaried,
    },
];

/// Applies when no rule in [`FORM_RULES`] matched.
pub const FALLBACK_RULE: FormRule = FormRule {
    id: RuleId::Fallback,
    form: ItrForm::Itr2,
    alternatives: &[ItrForm::Itr3],
    reason: "Income does not fit a simpler form",
    predicate: always,
};

pub fn is_complex_profile(
    profile: &IncomeProfile,
    _rules: &TaxRuleTable,
) -> bool {
    let regular_business =
        profile.has_source(IncomeSource::Business) && !profile.is_presumptive_business;

    regular_business
        || profile.has_complex_capital_gains
        || profile.has_source(IncomeSource::ForeignAssets)
        || !profile.is_resident
}

pub fn has_capital_gains_or_multiple_properties(
    profile: &IncomeProfile,
    _rules: &TaxRuleTable,
) -> bool {
    profile.has_capital_gains() || profile.num_house_properties > 1
}

pub fn is_presumptive_business(
    profile: &IncomeProfile,
    _rules: &TaxRuleTable,
) -> bool {
    profile.is_presumptive_business
}

pub fn is_simple_salaried(
    profile: &IncomeProfile,
    rules: &TaxRuleTable,
) -> bool {
    let simple_sources = profile.income_sources.iter().all(|source| {
        matches!(
            source,
            IncomeSource::Salary | IncomeSource::HouseProperty | IncomeSource::OtherSources
        )
    });

    simple_sources
        && profile.num_house_properties <= 1
        && profile.gross_income <= rules.itr1_income_ceiling()
}

fn always(
    _profile: &IncomeProfile,
    _rules: &TaxRuleTable,
) -> bool {
    true
}
