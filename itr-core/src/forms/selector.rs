use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::forms::rules::{FALLBACK_RULE, FORM_RULES, FormRule, RuleId};
use crate::models::{IncomeProfile, ItrForm, TaxRuleTable};
use crate::validation::{InvalidProfile, check_profile};

/// Whether one rule fired during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule: RuleId,
    pub matched: bool,
}

/// Selected form, acceptable alternatives, and the trail of rules evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItrRecommendation {
    pub recommended_form: ItrForm,
    pub alternative_forms: Vec<ItrForm>,
    pub reason: String,
    pub reasoning: Vec<RuleOutcome>,
}

impl ItrRecommendation {
    /// The rule that produced this recommendation.
    pub fn fired_rule(&self) -> Option<RuleId> {
        self.reasoning
            .iter()
            .find(|outcome| outcome.matched)
            .map(|outcome| outcome.rule)
    }
}

/// Picks the simplest correct return form for a profile.
#[derive(Debug, Clone, Copy)]
pub struct ItrFormSelector<'a> {
    rules: &'a TaxRuleTable,
}

impl<'a> ItrFormSelector<'a> {
    pub fn new(rules: &'a TaxRuleTable) -> Self {
        Self { rules }
    }

    /// Walks the decision rules in order and returns the first match.
    ///
    /// Every evaluated rule is recorded in `reasoning`, matched or not; rules
    /// after the first match are not evaluated.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProfile`] for an empty source set, negative income,
    /// or a profile that contradicts itself.
    pub fn select_form(
        &self,
        profile: &IncomeProfile,
    ) -> Result<ItrRecommendation, InvalidProfile> {
        check_profile(profile)?;

        let mut reasoning = Vec::with_capacity(FORM_RULES.len() + 1);
        for rule in &FORM_RULES {
            let matched = rule.matches(profile, self.rules);
            reasoning.push(RuleOutcome {
                rule: rule.id,
                matched,
            });
            if matched {
                return Ok(recommend(rule, reasoning));
            }
        }

        reasoning.push(RuleOutcome {
            rule: FALLBACK_RULE.id,
            matched: true,
        });
        Ok(recommend(&FALLBACK_RULE, reasoning))
    }
}

fn recommend(
    rule: &FormRule,
    reasoning: Vec<RuleOutcome>,
) -> ItrRecommendation {
    debug!(rule = %rule.id, form = %rule.form, "selected return form");

    ItrRecommendation {
        recommended_form: rule.form,
        alternative_forms: rule.alternatives.to_vec(),
        reason: rule.reason.to_string(),
        reasoning,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::IncomeSource;

    fn outcomes(fired: RuleId) -> Vec<RuleOutcome> {
        [
            RuleId::ComplexProfile,
            RuleId::CapitalGainsOrMultipleProperties,
            RuleId::PresumptiveBusiness,
            RuleId::SimpleSalaried,
            RuleId::Fallback,
        ]
        .into_iter()
        .take_while(|rule| rule.number() <= fired.number())
        .map(|rule| RuleOutcome {
            rule,
            matched: rule == fired,
        })
        .collect()
    }

    #[test]
    fn salaried_profile_selects_itr1() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let profile = IncomeProfile::new(dec!(600000), [IncomeSource::Salary]);

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr1);
        assert_eq!(recommendation.alternative_forms, vec![ItrForm::Itr2]);
        assert_eq!(recommendation.reasoning, outcomes(RuleId::SimpleSalaried));
        assert_eq!(recommendation.fired_rule(), Some(RuleId::SimpleSalaried));
    }

    #[test]
    fn long_term_gains_select_itr2_before_subset_check() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let profile = IncomeProfile::new(
            dec!(600000),
            [IncomeSource::Salary, IncomeSource::CapitalGainsLong],
        );

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr2);
        assert_eq!(recommendation.alternative_forms, vec![ItrForm::Itr3]);
        assert_eq!(
            recommendation.reasoning,
            outcomes(RuleId::CapitalGainsOrMultipleProperties)
        );
    }

    #[test]
    fn regular_business_selects_itr3() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let profile = IncomeProfile::new(
            dec!(1500000),
            [IncomeSource::Business, IncomeSource::CapitalGainsShort],
        );

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr3);
        assert_eq!(recommendation.alternative_forms, vec![ItrForm::Itr2]);
        assert_eq!(recommendation.reasoning, outcomes(RuleId::ComplexProfile));
    }

    #[test]
    fn non_resident_salaried_selects_itr3() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let mut profile = IncomeProfile::new(dec!(600000), [IncomeSource::Salary]);
        profile.is_resident = false;

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr3);
    }

    #[test]
    fn presumptive_business_selects_itr4() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let mut profile = IncomeProfile::new(
            dec!(1800000),
            [IncomeSource::Business, IncomeSource::OtherSources],
        );
        profile.is_presumptive_business = true;

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr4);
        assert_eq!(recommendation.alternative_forms, vec![ItrForm::Itr3]);
        assert_eq!(recommendation.reasoning, outcomes(RuleId::PresumptiveBusiness));
    }

    #[test]
    fn presumptive_business_with_capital_gains_selects_itr2() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let mut profile = IncomeProfile::new(
            dec!(1800000),
            [IncomeSource::Business, IncomeSource::CapitalGainsLong],
        );
        profile.is_presumptive_business = true;

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr2);
    }

    #[test]
    fn single_house_property_keeps_itr1() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let mut profile = IncomeProfile::new(
            dec!(2400000),
            [IncomeSource::Salary, IncomeSource::HouseProperty],
        );
        profile.num_house_properties = 1;

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr1);
    }

    #[test]
    fn multiple_house_properties_select_itr2() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let mut profile = IncomeProfile::new(
            dec!(2400000),
            [IncomeSource::Salary, IncomeSource::HouseProperty],
        );
        profile.num_house_properties = 3;

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr2);
    }

    #[test]
    fn salaried_above_ceiling_falls_back_to_itr2() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let profile = IncomeProfile::new(dec!(7500000), [IncomeSource::Salary]);

        let recommendation = selector.select_form(&profile).unwrap();

        assert_eq!(recommendation.recommended_form, ItrForm::Itr2);
        assert_eq!(recommendation.alternative_forms, vec![ItrForm::Itr3]);
        assert_eq!(recommendation.reasoning, outcomes(RuleId::Fallback));
        assert_eq!(recommendation.fired_rule(), Some(RuleId::Fallback));
    }

    #[test]
    fn empty_sources_are_rejected() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let profile = IncomeProfile::new(dec!(600000), Vec::<IncomeSource>::new());

        let result = selector.select_form(&profile);

        assert_eq!(result, Err(InvalidProfile::NoIncomeSources));
    }

    #[test]
    fn negative_income_is_rejected() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let profile = IncomeProfile::new(dec!(-600000), [IncomeSource::Salary]);

        let result = selector.select_form(&profile);

        assert_eq!(result, Err(InvalidProfile::NegativeGrossIncome(dec!(-600000))));
    }

    #[test]
    fn recommendation_serializes_with_form_labels() {
        let rules = TaxRuleTable::fy_2024_25();
        let selector = ItrFormSelector::new(&rules);
        let profile = IncomeProfile::new(dec!(600000), [IncomeSource::Salary]);

        let recommendation = selector.select_form(&profile).unwrap();
        let json = serde_json::to_value(&recommendation).unwrap();

        assert_eq!(json["recommended_form"], "ITR-1");
        assert_eq!(json["alternative_forms"][0], "ITR-2");
        assert_eq!(json["reasoning"][3]["rule"], "simple_salaried");
        assert_eq!(json["reasoning"][3]["matched"], true);
        assert_eq!(json["reasoning"][0]["matched"], false);
    }
}
