use comfy_table::{Cell, Table};

use crate::cli::build_ruleset;
use crate::error::Result;
use crate::settings::resolve_workbook;

fn workbook_path(arg: Option<&str>) -> Option<std::path::PathBuf> {
    // Rules commands work without any workbook; only use one if it was
    // named explicitly or saved in settings.
    resolve_workbook(arg).ok()
}

pub fn list(workbook_arg: Option<String>, rules_arg: Option<String>) -> Result<()> {
    let path = workbook_path(workbook_arg.as_deref());
    let rules = build_ruleset(path.as_deref(), rules_arg.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Pattern", "Match", "Category"]);
    for (i, rule) in rules.rules().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.pattern),
            Cell::new(rule.match_kind.as_str()),
            Cell::new(rule.category.as_str()),
        ]);
    }
    println!(
        "Category Mapping Rules ({}, first match wins)\n{table}",
        rules.rules().len()
    );
    Ok(())
}

pub fn check(label: &str, workbook_arg: Option<String>, rules_arg: Option<String>) -> Result<()> {
    let path = workbook_path(workbook_arg.as_deref());
    let rules = build_ruleset(path.as_deref(), rules_arg.as_deref())?;

    match rules.map_text(label) {
        Some(category) => println!("{label} -> {}", category.as_str()),
        None => println!(
            "{label} -> no rule matched (expenses fall back to other, transfers to savings)"
        ),
    }
    Ok(())
}
