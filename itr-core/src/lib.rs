pub mod calculations;
pub mod forms;
pub mod models;
pub mod rule_book;
pub mod validation;

pub use calculations::TaxCalculator;
pub use forms::{ItrFormSelector, ItrRecommendation, RuleId, RuleOutcome};
pub use models::*;
pub use rule_book::{RuleBook, RuleBookError};
pub use validation::{InvalidInput, InvalidProfile};
