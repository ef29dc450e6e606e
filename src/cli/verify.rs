use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{PlanfeedError, Result};
use crate::verify;

pub fn run(file: &str) -> Result<()> {
    let summary = verify::verify_file(std::path::Path::new(file))?;

    if summary.violations.is_empty() {
        println!(
            "{} — {} records, all invariants hold",
            "OK".green().bold(),
            summary.records
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Record", "Problem"]);
    for v in &summary.violations {
        table.add_row(vec![Cell::new(&v.record), Cell::new(&v.message)]);
    }
    println!("Invariant Violations\n{table}");
    Err(PlanfeedError::Invariants(summary.violations.len()))
}
