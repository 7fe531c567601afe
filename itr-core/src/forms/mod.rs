//! Return form selection (ITR-1 to ITR-4).
//!
//! Selection walks [`rules::FORM_RULES`] in order and falls back to
//! [`rules::FALLBACK_RULE`]:
//!
//! | # | Rule | Form | Alternatives |
//! |---|------|------|--------------|
//! | 1 | `complex_profile` | ITR-3 | ITR-2 |
//! | 2 | `capital_gains_or_multiple_properties` | ITR-2 | ITR-3 |
//! | 3 | `presumptive_business` | ITR-4 | ITR-3 |
//! | 4 | `simple_salaried` | ITR-1 | ITR-2 |
//! | 5 | `fallback` | ITR-2 | ITR-3 |

pub mod rules;
mod selector;

pub use rules::{FormRule, RuleId};
pub use selector::{ItrFormSelector, ItrRecommendation, RuleOutcome};
