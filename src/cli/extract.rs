use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{build_filter, build_ruleset};
use crate::emit;
use crate::error::Result;
use crate::extractor::{self, Extraction};
use crate::fmt::money;
use crate::models::TxnType;
use crate::settings::resolve_workbook;
use crate::workbook;

#[allow(clippy::too_many_arguments)]
pub fn run(
    workbook_arg: Option<String>,
    period: Option<i64>,
    from_date: Option<String>,
    to_date: Option<String>,
    json: Option<String>,
    ts: Option<String>,
    rules_arg: Option<String>,
) -> Result<()> {
    let path = resolve_workbook(workbook_arg.as_deref())?;
    let filter = build_filter(period, from_date.as_deref(), to_date.as_deref())?;
    let rules = build_ruleset(Some(&path), rules_arg.as_deref())?;

    let loaded = workbook::load_transactions(&path)?;
    let extraction = extractor::extract(&loaded.rows, &filter, &rules, &loaded.stats);

    let checksum = workbook::checksum(&path)?;
    println!(
        "Source: {} (sha256: {})",
        path.display(),
        &checksum[..12.min(checksum.len())]
    );
    print_summary(&extraction, &filter.describe());

    if let Some(out) = json {
        let content = emit::to_json(&extraction.records)?;
        emit::write_file(Path::new(&out), &content)?;
        println!("Wrote {} records to {out}", extraction.records.len());
    }
    if let Some(out) = ts {
        let content = emit::to_ts_fragment(&extraction.records);
        emit::write_file(Path::new(&out), &content)?;
        println!("Wrote TypeScript fragment to {out}");
    }
    Ok(())
}

fn print_summary(extraction: &Extraction, window: &str) {
    let records = &extraction.records;
    let stats = &extraction.stats;

    println!(
        "Extracted {} transactions ({window}); scanned {}, skipped {}",
        records.len(),
        stats.scanned,
        stats.skipped()
    );
    if stats.skipped() > 0 {
        println!(
            "  skipped: {} missing date, {} missing amount, {} zero amount, {} unknown type",
            stats.missing_date, stats.missing_amount, stats.zero_amount, stats.unknown_type
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Count", "Total"]);
    for ct in extractor::category_totals(records) {
        table.add_row(vec![
            Cell::new(ct.category.as_str()),
            Cell::new(ct.count),
            Cell::new(money(ct.total)),
        ]);
    }
    println!("\nBy Category\n{table}");

    let mut ttable = Table::new();
    ttable.set_header(vec!["Type", "Count", "Total"]);
    for tt in extractor::type_totals(records) {
        let total = match tt.txn_type {
            TxnType::Income => money(tt.total).green().to_string(),
            TxnType::Outflow => money(tt.total).red().to_string(),
            TxnType::Transfer => money(tt.total),
        };
        ttable.add_row(vec![
            Cell::new(tt.txn_type.as_str()),
            Cell::new(tt.count),
            Cell::new(total),
        ]);
    }
    println!("\nBy Type\n{ttable}");

    let net = extractor::net(records);
    let net_str = if net >= 0.0 {
        money(net).green().to_string()
    } else {
        money(net).red().to_string()
    };
    println!("\nNet (income - outflow - transfers): {net_str}");
}
