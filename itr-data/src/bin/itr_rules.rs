use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use itr_core::{Regime, RuleBook, TaxRuleTable};
use itr_data::{RuleTableLoader, logging};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Validate a fiscal year's tax rules and print a summary.
///
/// The slab CSV file should have the following columns:
/// - fiscal_year: The fiscal year label (e.g., 2024-25)
/// - regime: The tax regime (old or new)
/// - lower_bound: Where the slab starts
/// - upper_bound: Where the slab ends (empty for the open-ended slab)
/// - rate: The slab rate as a decimal (e.g., 0.05)
///
/// The rule file is TOML holding the cess rate, rebates and deduction caps.
#[derive(Parser, Debug)]
#[command(name = "itr-rules")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing the slab schedule of both regimes
    #[arg(short, long)]
    slabs: PathBuf,

    /// Path to the TOML rule file for the same fiscal year
    #[arg(short, long)]
    rules: PathBuf,

    /// Log filter, e.g. "debug" or "itr_data=trace" (defaults to RUST_LOG, then info)
    #[arg(long)]
    log_level: Option<String>,

    /// Append log output to this file as well as stdout
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.log_level.as_deref(), args.log_file.as_deref())
        .context("Failed to initialize logging")?;

    let slabs = File::open(&args.slabs)
        .with_context(|| format!("Failed to open: {}", args.slabs.display()))?;
    let records = RuleTableLoader::parse_slabs(slabs)
        .with_context(|| format!("Failed to parse CSV: {}", args.slabs.display()))?;
    info!(path = %args.slabs.display(), records = records.len(), "parsed slab file");

    let text = fs::read_to_string(&args.rules)
        .with_context(|| format!("Failed to read: {}", args.rules.display()))?;
    let rules = RuleTableLoader::parse_rules(&text)
        .with_context(|| format!("Failed to parse rules: {}", args.rules.display()))?;

    let table = RuleTableLoader::build(rules, &records).context("Rule table is invalid")?;

    print_summary(&table);

    let builtin = RuleBook::builtin();
    match builtin.get(table.fiscal_year()) {
        Ok(shipped) if shipped == &table => {
            println!("\nMatches the built-in table for {}.", table.fiscal_year());
        }
        Ok(_) => {
            warn!(
                fiscal_year = %table.fiscal_year(),
                "loaded rules differ from the built-in table"
            );
            println!("\nDiffers from the built-in table for {}.", table.fiscal_year());
        }
        Err(_) => {
            println!("\nNo built-in table for {}.", table.fiscal_year());
        }
    }

    Ok(())
}

fn print_summary(table: &TaxRuleTable) {
    println!(
        "Fiscal year {} (assessment year {})",
        table.fiscal_year(),
        table.fiscal_year().assessment_year()
    );

    for regime in Regime::ALL {
        let rebate = table.rebate(regime);
        println!("\n{regime} regime");
        for slab in table.slabs(regime) {
            let upper = slab
                .upper_bound
                .map_or_else(|| "and above".to_string(), |upper| format!("to {upper}"));
            println!(
                "  {:>10} {:<14} {:>3}%",
                slab.lower_bound.to_string(),
                upper,
                percent(slab.rate)
            );
        }
        println!(
            "  rebate up to {} when taxable income is at most {}",
            rebate.max_amount, rebate.threshold
        );
    }

    println!("\nDeductions");
    for rule in table.deduction_rules() {
        let cap = rule
            .cap
            .map_or_else(|| "uncapped".to_string(), |cap| cap.to_string());
        let regimes: Vec<&str> = rule.applies_in.iter().map(Regime::as_str).collect();
        println!(
            "  {:<20} {:>10}  {}",
            rule.section.as_str(),
            cap,
            regimes.join(", ")
        );
    }
    for combined in table.combined_caps() {
        let sections: Vec<&str> = combined.sections.iter().map(|s| s.as_str()).collect();
        println!("  combined cap {} on {}", combined.cap, sections.join(" + "));
    }

    println!(
        "\nCess {}%, marginal relief margin {}, ITR-1 ceiling {}",
        percent(table.cess_rate()),
        table.marginal_relief_margin(),
        table.itr1_income_ceiling()
    );
}

fn percent(rate: Decimal) -> String {
    (rate * Decimal::ONE_HUNDRED).normalize().to_string()
}
