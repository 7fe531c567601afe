mod deduction;
mod fiscal_year;
mod income_profile;
mod itr_form;
mod regime;
mod request;
mod rule_table;
mod tax_result;
mod tax_slab;

pub use deduction::{DeductionClaim, DeductionSection};
pub use fiscal_year::{FiscalYear, InvalidFiscalYear};
pub use income_profile::{IncomeProfile, IncomeSource};
pub use itr_form::ItrForm;
pub use regime::Regime;
pub use request::{RegimeRequest, TaxRequest};
pub use rule_table::{
    CombinedCap, DeductionRule, Rebate, RegimeRules, RuleTableError, TaxRuleTable,
    TaxRuleTableConfig, fy_2024_25_config,
};
pub use tax_result::{AllowedDeduction, RegimeComparison, SlabTax, TaxNote, TaxResult};
pub use tax_slab::TaxSlab;
