//! Boundary validation shared by the calculator and the form selector.
//!
//! Every error here is caused by caller input and is raised before any
//! computation starts, so a caller never sees a partial result.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{DeductionSection, IncomeProfile, IncomeSource};

/// Malformed input to the tax calculator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("gross income must be non-negative, got {0}")]
    NegativeGrossIncome(Decimal),

    #[error("unrecognised deduction section '{0}'")]
    UnknownDeductionSection(String),

    #[error("claimed amount for {section} must be non-negative, got {amount}")]
    NegativeDeduction {
        section: DeductionSection,
        amount: Decimal,
    },

    #[error("unknown regime '{0}', expected \"old\" or \"new\"")]
    UnknownRegime(String),

    #[error("income is too large for the tax payable to be represented")]
    AmountOutOfRange,
}

/// An income profile the form selector cannot reason about.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidProfile {
    #[error("income profile declares no income sources")]
    NoIncomeSources,

    #[error("gross income must be non-negative, got {0}")]
    NegativeGrossIncome(Decimal),

    #[error("presumptive business declared without BUSINESS income")]
    PresumptiveWithoutBusiness,

    #[error("complex capital gains declared without a capital gains income source")]
    ComplexGainsWithoutCapitalGains,

    #[error("HOUSE_PROPERTY income declared but the number of house properties is 0")]
    HousePropertyWithoutProperties,

    #[error("{0} house properties declared without HOUSE_PROPERTY income")]
    PropertiesWithoutHouseProperty(u32),
}

/// Checks the gross income accepted by the calculator.
pub fn check_gross_income(gross_income: Decimal) -> Result<Decimal, InvalidInput> {
    if gross_income < Decimal::ZERO {
        return Err(InvalidInput::NegativeGrossIncome(gross_income));
    }
    Ok(gross_income)
}

/// Checks that a profile is non-empty and internally consistent.
pub fn check_profile(profile: &IncomeProfile) -> Result<(), InvalidProfile> {
    if profile.income_sources.is_empty() {
        return Err(InvalidProfile::NoIncomeSources);
    }
    if profile.gross_income < Decimal::ZERO {
        return Err(InvalidProfile::NegativeGrossIncome(profile.gross_income));
    }
    if profile.is_presumptive_business && !profile.has_source(IncomeSource::Business) {
        return Err(InvalidProfile::PresumptiveWithoutBusiness);
    }
    if profile.has_complex_capital_gains && !profile.has_capital_gains() {
        return Err(InvalidProfile::ComplexGainsWithoutCapitalGains);
    }

    let declares_property = profile.has_source(IncomeSource::HouseProperty);
    match (declares_property, profile.num_house_properties) {
        (true, 0) => Err(InvalidProfile::HousePropertyWithoutProperties),
        (false, count) if count > 0 => Err(InvalidProfile::PropertiesWithoutHouseProperty(count)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn salaried() -> IncomeProfile {
        IncomeProfile::new(dec!(600000), [IncomeSource::Salary])
    }

    // =========================================================================
    // check_gross_income tests
    // =========================================================================

    #[test]
    fn gross_income_zero_is_valid() {
        assert_eq!(check_gross_income(dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn gross_income_negative_is_rejected() {
        assert_eq!(
            check_gross_income(dec!(-0.01)),
            Err(InvalidInput::NegativeGrossIncome(dec!(-0.01)))
        );
    }

    // =========================================================================
    // check_profile tests
    // =========================================================================

    #[test]
    fn profile_simple_salaried_is_valid() {
        assert_eq!(check_profile(&salaried()), Ok(()));
    }

    #[test]
    fn profile_without_sources_is_rejected() {
        let profile = IncomeProfile::new(dec!(600000), Vec::<IncomeSource>::new());

        assert_eq!(check_profile(&profile), Err(InvalidProfile::NoIncomeSources));
    }

    #[test]
    fn profile_with_negative_income_is_rejected() {
        let mut profile = salaried();
        profile.gross_income = dec!(-1);

        assert_eq!(
            check_profile(&profile),
            Err(InvalidProfile::NegativeGrossIncome(dec!(-1)))
        );
    }

    #[test]
    fn profile_presumptive_without_business_is_rejected() {
        let mut profile = salaried();
        profile.is_presumptive_business = true;

        assert_eq!(
            check_profile(&profile),
            Err(InvalidProfile::PresumptiveWithoutBusiness)
        );
    }

    #[test]
    fn profile_complex_gains_without_capital_gains_is_rejected() {
        let mut profile = salaried();
        profile.has_complex_capital_gains = true;

        assert_eq!(
            check_profile(&profile),
            Err(InvalidProfile::ComplexGainsWithoutCapitalGains)
        );
    }

    #[test]
    fn profile_house_property_without_count_is_rejected() {
        let profile = IncomeProfile::new(
            dec!(600000),
            [IncomeSource::Salary, IncomeSource::HouseProperty],
        );

        assert_eq!(
            check_profile(&profile),
            Err(InvalidProfile::HousePropertyWithoutProperties)
        );
    }

    #[test]
    fn profile_count_without_house_property_is_rejected() {
        let mut profile = salaried();
        profile.num_house_properties = 2;

        assert_eq!(
            check_profile(&profile),
            Err(InvalidProfile::PropertiesWithoutHouseProperty(2))
        );
    }
}
