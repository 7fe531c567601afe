pub mod loader;
pub mod logging;

pub use loader::{
    DeductionEntry, RegimeRebates, RuleFile, RuleTableLoader, RuleTableLoaderError, SlabRecord,
};
