use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A contiguous income bracket taxed at a single marginal rate.
///
/// `upper_bound` is `None` for the open-ended top slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub lower_bound: Decimal,
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxSlab {
    pub fn new(
        lower_bound: Decimal,
        upper_bound: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Whether `income` reaches past the top of this slab.
    pub fn is_exceeded_by(
        &self,
        income: Decimal,
    ) -> bool {
        self.upper_bound.is_some_and(|upper| income > upper)
    }
}
