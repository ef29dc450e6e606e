pub mod extract;
pub mod init;
pub mod report;
pub mod rules;
pub mod verify;

use clap::{Parser, Subcommand};

use crate::error::{PlanfeedError, Result};
use crate::extractor::Filter;
use crate::mapper::RuleSet;
use crate::settings::{load_settings, shellexpand_path};
use crate::workbook;

#[derive(Parser)]
#[command(
    name = "planfeed",
    about = "Extracts budget-period transactions from a cashflow workbook into app-ready data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save a default workbook and rules file.
    Init {
        /// Workbook to use when commands omit one
        #[arg(long)]
        workbook: Option<String>,
        /// Rules file applied in front of the built-in mapping table
        #[arg(long)]
        rules: Option<String>,
    },
    /// Extract one budget period into JSON and/or a TypeScript fragment.
    Extract {
        /// Workbook path (.xlsx, or a CSV export of the Transactions sheet)
        workbook: Option<String>,
        /// Budget period index (column I)
        #[arg(long)]
        period: Option<i64>,
        /// Window start: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// Window end: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Write the records as a JSON array
        #[arg(long)]
        json: Option<String>,
        /// Write the records as a TypeScript array-literal fragment
        #[arg(long)]
        ts: Option<String>,
        /// Extra mapping rules (JSON array)
        #[arg(long)]
        rules: Option<String>,
    },
    /// Tabular reports over one budget period.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Inspect the category mapping table.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Check an emitted JSON file against the record invariants.
    Verify {
        /// Path to a JSON array of records
        file: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Per-category and per-type totals.
    Summary {
        workbook: Option<String>,
        #[arg(long)]
        period: Option<i64>,
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long = "to")]
        to_date: Option<String>,
        #[arg(long)]
        rules: Option<String>,
    },
    /// Budget vs actual per category with OVER/UNDER/OK statuses.
    Variance {
        workbook: Option<String>,
        #[arg(long)]
        period: Option<i64>,
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long = "to")]
        to_date: Option<String>,
        #[arg(long)]
        rules: Option<String>,
    },
    /// Raw budget lines and the category each maps to.
    Budget {
        workbook: Option<String>,
        #[arg(long)]
        rules: Option<String>,
    },
    /// Records that fell back to the `other` category.
    Unmapped {
        workbook: Option<String>,
        #[arg(long)]
        period: Option<i64>,
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long = "to")]
        to_date: Option<String>,
        #[arg(long)]
        rules: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Show the effective mapping table.
    List {
        /// Workbook whose "Category Mapping" sheet should be included
        workbook: Option<String>,
        #[arg(long)]
        rules: Option<String>,
    },
    /// Resolve one label against the mapping table.
    Check {
        /// Raw category label or description text
        label: String,
        workbook: Option<String>,
        #[arg(long)]
        rules: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

// Window bounds are compared as strings against row dates, so anything
// that is not YYYY-MM-DD would match nothing instead of erroring.
fn parse_iso_bound(raw: &str, flag: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| PlanfeedError::Other(format!("{flag} must be YYYY-MM-DD, got '{raw}'")))
}

pub(crate) fn build_filter(
    period: Option<i64>,
    from_date: Option<&str>,
    to_date: Option<&str>,
) -> Result<Filter> {
    if let Some(n) = period {
        return Ok(Filter::Period(n));
    }
    match (from_date, to_date) {
        (Some(from), Some(to)) => Ok(Filter::Dates {
            from: parse_iso_bound(from, "--from")?,
            to: parse_iso_bound(to, "--to")?,
        }),
        (Some(_), None) => Err(PlanfeedError::Other(
            "--from requires --to (both date boundaries must be specified)".to_string(),
        )),
        (None, Some(_)) => Err(PlanfeedError::Other(
            "--to requires --from (both date boundaries must be specified)".to_string(),
        )),
        (None, None) => Err(PlanfeedError::Other(
            "specify --period N or a --from/--to date window".to_string(),
        )),
    }
}

/// Assemble the effective rule table: workbook "Category Mapping" sheet
/// first, then the rules file, then the built-ins.
pub(crate) fn build_ruleset(
    workbook_path: Option<&std::path::Path>,
    rules_arg: Option<&str>,
) -> Result<RuleSet> {
    let mut rules = RuleSet::builtin();

    let rules_path = match rules_arg {
        Some(p) => Some(shellexpand_path(p)),
        None => {
            let settings = load_settings();
            if settings.rules_file.is_empty() {
                None
            } else {
                Some(shellexpand_path(&settings.rules_file))
            }
        }
    };
    if let Some(path) = rules_path {
        rules.load_file(std::path::Path::new(&path))?;
    }

    if let Some(path) = workbook_path {
        let overrides = workbook::load_mapping_overrides(path)?;
        if !overrides.is_empty() {
            rules.prepend_exact(overrides);
        }
    }
    Ok(rules)
}
