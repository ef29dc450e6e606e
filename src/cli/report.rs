use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{build_filter, build_ruleset};
use crate::error::Result;
use crate::extractor;
use crate::fmt::money;
use crate::mapper::{section_default, RuleSet};
use crate::models::{Category, Transaction};
use crate::settings::resolve_workbook;
use crate::variance::{self, VarianceStatus};
use crate::workbook;

fn load_records(
    workbook_arg: Option<&str>,
    period: Option<i64>,
    from_date: Option<&str>,
    to_date: Option<&str>,
    rules_arg: Option<&str>,
) -> Result<(Vec<Transaction>, RuleSet, std::path::PathBuf)> {
    let path = resolve_workbook(workbook_arg)?;
    let filter = build_filter(period, from_date, to_date)?;
    let rules = build_ruleset(Some(&path), rules_arg)?;
    let loaded = workbook::load_transactions(&path)?;
    let extraction = extractor::extract(&loaded.rows, &filter, &rules, &loaded.stats);
    Ok((extraction.records, rules, path))
}

pub fn summary(
    workbook_arg: Option<String>,
    period: Option<i64>,
    from_date: Option<String>,
    to_date: Option<String>,
    rules_arg: Option<String>,
) -> Result<()> {
    let (records, _, _) = load_records(
        workbook_arg.as_deref(),
        period,
        from_date.as_deref(),
        to_date.as_deref(),
        rules_arg.as_deref(),
    )?;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Count", "Total"]);
    for ct in extractor::category_totals(&records) {
        table.add_row(vec![
            Cell::new(ct.category.as_str()),
            Cell::new(ct.count),
            Cell::new(money(ct.total)),
        ]);
    }
    println!("By Category ({} transactions)\n{table}", records.len());

    let mut ttable = Table::new();
    ttable.set_header(vec!["Type", "Count", "Total"]);
    for tt in extractor::type_totals(&records) {
        ttable.add_row(vec![
            Cell::new(tt.txn_type.as_str()),
            Cell::new(tt.count),
            Cell::new(money(tt.total)),
        ]);
    }
    println!("\nBy Type\n{ttable}");
    println!("\nNet: {}", money(extractor::net(&records)));
    Ok(())
}

pub fn variance(
    workbook_arg: Option<String>,
    period: Option<i64>,
    from_date: Option<String>,
    to_date: Option<String>,
    rules_arg: Option<String>,
) -> Result<()> {
    let (records, rules, path) = load_records(
        workbook_arg.as_deref(),
        period,
        from_date.as_deref(),
        to_date.as_deref(),
        rules_arg.as_deref(),
    )?;
    let lines = workbook::load_budget_lines(&path)?;
    let budgets = variance::budget_by_category(&lines, &rules);
    let report = variance::variance_report(&budgets, &records);

    let mut table = Table::new();
    table.set_header(vec!["Category", "Budget", "Actual", "Variance", "%", "Status"]);
    for row in &report.rows {
        let status = match row.status {
            VarianceStatus::Over => row.status.as_str().red().bold().to_string(),
            VarianceStatus::Under => row.status.as_str().yellow().to_string(),
            VarianceStatus::Ok => row.status.as_str().green().to_string(),
        };
        table.add_row(vec![
            Cell::new(row.category.as_str()),
            Cell::new(money(row.budget)),
            Cell::new(money(row.actual)),
            Cell::new(money(row.variance)),
            Cell::new(format!("{:.1}%", row.variance_pct)),
            Cell::new(status),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL".bold()),
        Cell::new(money(report.total_budget)),
        Cell::new(money(report.total_actual)),
        Cell::new(money(report.total_variance)),
        Cell::new(""),
        Cell::new(""),
    ]);
    println!("Budget vs Actual\n{table}");
    Ok(())
}

pub fn budget(workbook_arg: Option<String>, rules_arg: Option<String>) -> Result<()> {
    let path = resolve_workbook(workbook_arg.as_deref())?;
    let rules = build_ruleset(Some(&path), rules_arg.as_deref())?;
    let lines = workbook::load_budget_lines(&path)?;

    if lines.is_empty() {
        println!("No budget lines found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Section", "Item", "Budget", "Category"]);
    let mut total = 0.0;
    for line in &lines {
        let category = rules
            .map_text(&line.item)
            .or_else(|| section_default(&line.section))
            .unwrap_or(Category::Other);
        table.add_row(vec![
            Cell::new(&line.section),
            Cell::new(&line.item),
            Cell::new(money(line.budget)),
            Cell::new(category.as_str()),
        ]);
        total += line.budget;
    }
    table.add_row(vec![
        Cell::new("TOTAL".bold()),
        Cell::new(""),
        Cell::new(money(total)),
        Cell::new(""),
    ]);
    println!("Budget Lines\n{table}");
    Ok(())
}

pub fn unmapped(
    workbook_arg: Option<String>,
    period: Option<i64>,
    from_date: Option<String>,
    to_date: Option<String>,
    rules_arg: Option<String>,
) -> Result<()> {
    let (records, _, _) = load_records(
        workbook_arg.as_deref(),
        period,
        from_date.as_deref(),
        to_date.as_deref(),
        rules_arg.as_deref(),
    )?;

    let unmapped: Vec<&Transaction> = records
        .iter()
        .filter(|r| r.category == Category::Other)
        .collect();
    if unmapped.is_empty() {
        println!("No unmapped transactions: every row resolved to a category.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Label", "Raw label", "Amount"]);
    let mut total = 0.0;
    for r in &unmapped {
        table.add_row(vec![
            Cell::new(&r.id),
            Cell::new(&r.date),
            Cell::new(&r.label),
            Cell::new(&r.notes),
            Cell::new(money(r.amount)),
        ]);
        total += r.amount;
    }
    println!(
        "Unmapped Transactions ({}, total {})\n{table}",
        unmapped.len(),
        money(total)
    );
    println!("\nAdd rules for these labels to drive the `other` count to zero.");
    Ok(())
}
