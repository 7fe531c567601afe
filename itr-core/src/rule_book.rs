use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{FiscalYear, TaxRuleTable};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleBookError {
    #[error("no rule table for fiscal year {requested}; available: {available:?}")]
    UnknownFiscalYear {
        requested: FiscalYear,
        available: Vec<FiscalYear>,
    },
}

/// Rule tables keyed by fiscal year.
///
/// Typical lifetime:
/// 1. Build once at startup with [`RuleBook::builtin`] or [`RuleBook::new`]
///    followed by [`RuleBook::insert`].
/// 2. Share it immutably; look tables up per request with [`RuleBook::get`].
#[derive(Debug, Clone, Default)]
pub struct RuleBook {
    tables: BTreeMap<FiscalYear, TaxRuleTable>,
}

impl RuleBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// A book holding every table shipped with the crate.
    pub fn builtin() -> Self {
        let mut book = Self::new();
        book.insert(TaxRuleTable::fy_2024_25());
        book
    }

    /// Adds a table, replacing any table for the same fiscal year.
    pub fn insert(
        &mut self,
        table: TaxRuleTable,
    ) {
        self.tables.insert(table.fiscal_year(), table);
    }

    /// Fiscal years with a table, oldest first.
    pub fn fiscal_years(&self) -> Vec<FiscalYear> {
        self.tables.keys().copied().collect()
    }

    /// The most recent table, if any.
    pub fn latest(&self) -> Option<&TaxRuleTable> {
        self.tables.values().next_back()
    }

    /// # Errors
    ///
    /// [`RuleBookError::UnknownFiscalYear`] when no table is registered for
    /// `year`.
    pub fn get(
        &self,
        year: FiscalYear,
    ) -> Result<&TaxRuleTable, RuleBookError> {
        self.tables
            .get(&year)
            .ok_or_else(|| RuleBookError::UnknownFiscalYear {
                requested: year,
                available: self.fiscal_years(),
            })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::fy_2024_25_config;

    #[test]
    fn builtin_contains_fy_2024_25() {
        let book = RuleBook::builtin();

        let table = book.get(FiscalYear::starting(2024)).unwrap();

        assert_eq!(table, &TaxRuleTable::fy_2024_25());
        assert_eq!(book.fiscal_years(), vec![FiscalYear::starting(2024)]);
    }

    #[test]
    fn get_unknown_year_lists_available_years() {
        let book = RuleBook::builtin();

        let result = book.get(FiscalYear::starting(2019));

        assert_eq!(
            result,
            Err(RuleBookError::UnknownFiscalYear {
                requested: FiscalYear::starting(2019),
                available: vec![FiscalYear::starting(2024)],
            })
        );
    }

    #[test]
    fn insert_replaces_table_for_same_year() {
        let mut book = RuleBook::builtin();
        let mut config = fy_2024_25_config();
        config.cess_rate = dec!(0.05);
        book.insert(TaxRuleTable::new(config).unwrap());

        let table = book.get(FiscalYear::starting(2024)).unwrap();

        assert_eq!(table.cess_rate(), dec!(0.05));
        assert_eq!(book.fiscal_years().len(), 1);
    }

    #[test]
    fn latest_returns_most_recent_year() {
        let mut book = RuleBook::builtin();
        let mut config = fy_2024_25_config();
        config.fiscal_year = FiscalYear::starting(2025);
        book.insert(TaxRuleTable::new(config).unwrap());

        let latest = book.latest().unwrap();

        assert_eq!(latest.fiscal_year(), FiscalYear::starting(2025));
    }

    #[test]
    fn empty_book_has_no_latest() {
        assert!(RuleBook::new().latest().is_none());
    }
}
