//! Tax computation for Indian individual income tax.
//!
//! This module provides the progressive slab walk, the regime-aware
//! [`TaxCalculator`] and the old-versus-new regime comparison.

pub mod common;
mod progressive;
mod regime_comparison;
mod tax_calculator;

pub use progressive::{ProgressiveTax, progressive_tax};
pub use tax_calculator::TaxCalculator;
