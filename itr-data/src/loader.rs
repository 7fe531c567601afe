use std::collections::BTreeSet;
use std::io::Read;

use itr_core::{
    CombinedCap, DeductionRule, DeductionSection, FiscalYear, Rebate, Regime, RegimeRules,
    RuleTableError, TaxRuleTable, TaxRuleTableConfig, TaxSlab,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Errors that can occur when loading a rule table from files.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleTableLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Unknown regime '{0}' in slab file (expected \"old\" or \"new\")")]
    UnknownRegime(String),

    #[error("Slab row for fiscal year {found} does not belong to rule file for {expected}")]
    FiscalYearMismatch {
        expected: FiscalYear,
        found: FiscalYear,
    },

    #[error("Invalid rule table: {0}")]
    InvalidTable(#[from] RuleTableError),
}

impl From<csv::Error> for RuleTableLoaderError {
    fn from(err: csv::Error) -> Self {
        RuleTableLoaderError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for RuleTableLoaderError {
    fn from(err: toml::de::Error) -> Self {
        RuleTableLoaderError::TomlParse(err.to_string())
    }
}

/// A single row of the slab CSV file.
///
/// - `fiscal_year`: the fiscal year label (e.g., 2024-25)
/// - `regime`: `old` or `new`
/// - `lower_bound`: where the slab starts
/// - `upper_bound`: where the slab ends (empty for the open-ended slab)
/// - `rate`: the slab rate as a decimal (e.g., 0.05 for 5%)
///
/// Rows for one regime must appear in ascending order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SlabRecord {
    pub fiscal_year: FiscalYear,
    pub regime: String,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Everything in a year's rule file except the slabs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RuleFile {
    pub fiscal_year: FiscalYear,
    pub cess_rate: Decimal,
    pub marginal_relief_margin: Decimal,
    pub itr1_income_ceiling: Decimal,
    pub rebate: RegimeRebates,
    #[serde(default, rename = "deduction")]
    pub deductions: Vec<DeductionEntry>,
    #[serde(default, rename = "combined_cap")]
    pub combined_caps: Vec<CombinedCap>,
}

/// The `[rebate.old]` and `[rebate.new]` tables.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct RegimeRebates {
    pub old: Rebate,
    pub new: Rebate,
}

/// One `[[deduction]]` entry. A missing `cap` means uncapped.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeductionEntry {
    pub section: DeductionSection,
    #[serde(default)]
    pub cap: Option<Decimal>,
    pub regimes: BTreeSet<Regime>,
}

impl From<DeductionEntry> for DeductionRule {
    fn from(entry: DeductionEntry) -> Self {
        DeductionRule::new(entry.section, entry.cap, entry.regimes)
    }
}

/// Loader for rule tables stored as a slab CSV plus a TOML rule file.
///
/// Neither file is useful alone: the CSV carries the slab schedule of both
/// regimes and the TOML file carries rebates, deduction caps and the scalar
/// rates. [`RuleTableLoader::build`] joins them and runs the same validation
/// as [`TaxRuleTable::new`].
pub struct RuleTableLoader;

impl RuleTableLoader {
    /// Parse slab records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a string slice. Surrounding whitespace in fields is ignored.
    pub fn parse_slabs<R: Read>(reader: R) -> Result<Vec<SlabRecord>, RuleTableLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: SlabRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse the TOML rule file.
    pub fn parse_rules(text: &str) -> Result<RuleFile, RuleTableLoaderError> {
        Ok(toml::from_str(text)?)
    }

    /// Join a rule file with its slab records into a validated table.
    ///
    /// Every slab record must carry the rule file's fiscal year. Slabs keep
    /// the order in which they appear in the CSV.
    pub fn build(
        rules: RuleFile,
        records: &[SlabRecord],
    ) -> Result<TaxRuleTable, RuleTableLoaderError> {
        let mut old_slabs = Vec::new();
        let mut new_slabs = Vec::new();

        for record in records {
            if record.fiscal_year != rules.fiscal_year {
                return Err(RuleTableLoaderError::FiscalYearMismatch {
                    expected: rules.fiscal_year,
                    found: record.fiscal_year,
                });
            }
            let regime = Regime::parse(&record.regime)
                .ok_or_else(|| RuleTableLoaderError::UnknownRegime(record.regime.clone()))?;
            let slab = TaxSlab::new(record.lower_bound, record.upper_bound, record.rate);
            match regime {
                Regime::Old => old_slabs.push(slab),
                Regime::New => new_slabs.push(slab),
            }
        }

        let config = TaxRuleTableConfig {
            fiscal_year: rules.fiscal_year,
            old_regime: RegimeRules {
                slabs: old_slabs,
                rebate: rules.rebate.old,
            },
            new_regime: RegimeRules {
                slabs: new_slabs,
                rebate: rules.rebate.new,
            },
            deductions: rules.deductions.into_iter().map(DeductionRule::from).collect(),
            combined_caps: rules.combined_caps,
            cess_rate: rules.cess_rate,
            marginal_relief_margin: rules.marginal_relief_margin,
            itr1_income_ceiling: rules.itr1_income_ceiling,
        };

        let table = TaxRuleTable::new(config)?;
        info!(
            fiscal_year = %table.fiscal_year(),
            old_slabs = table.slabs(Regime::Old).len(),
            new_slabs = table.slabs(Regime::New).len(),
            deductions = table.deduction_rules().count(),
            "loaded tax rule table"
        );

        Ok(table)
    }

    /// Parse both files and build the table in one step.
    pub fn load<R: Read>(
        slabs: R,
        rules: &str,
    ) -> Result<TaxRuleTable, RuleTableLoaderError> {
        let records = Self::parse_slabs(slabs)?;
        let rules = Self::parse_rules(rules)?;
        Self::build(rules, &records)
    }
}
