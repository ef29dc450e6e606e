use std::collections::HashMap;

use crate::extractor::category_totals;
use crate::mapper::{section_default, RuleSet};
use crate::models::{BudgetLine, Category, Transaction, ALL_CATEGORIES};

/// Fixed tolerance band around the budget before a category is called
/// over or under.
pub const TOLERANCE_GBP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceStatus {
    Over,
    Under,
    Ok,
}

impl VarianceStatus {
    pub fn of(variance: f64) -> Self {
        if variance > TOLERANCE_GBP {
            Self::Over
        } else if variance < -TOLERANCE_GBP {
            Self::Under
        } else {
            Self::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Over => "OVER",
            Self::Under => "UNDER",
            Self::Ok => "OK",
        }
    }
}

pub struct VarianceRow {
    pub category: Category,
    pub budget: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_pct: f64,
    pub status: VarianceStatus,
}

pub struct VarianceReport {
    pub rows: Vec<VarianceRow>,
    pub total_budget: f64,
    pub total_actual: f64,
    pub total_variance: f64,
}

/// Sum budget lines into app categories. Item names go through the rule
/// table first; unmatched items inherit their section's category.
pub fn budget_by_category(lines: &[BudgetLine], rules: &RuleSet) -> HashMap<Category, f64> {
    let mut budgets = HashMap::new();
    for line in lines {
        let category = rules
            .map_text(&line.item)
            .or_else(|| section_default(&line.section))
            .unwrap_or(Category::Other);
        *budgets.entry(category).or_insert(0.0) += line.budget;
    }
    budgets
}

/// Budget vs actual per category, `variance = actual − budget`.
pub fn variance_report(budgets: &HashMap<Category, f64>, records: &[Transaction]) -> VarianceReport {
    let actuals: HashMap<Category, f64> = category_totals(records)
        .into_iter()
        .map(|ct| (ct.category, ct.total))
        .collect();

    let mut rows = Vec::new();
    let mut total_budget = 0.0;
    let mut total_actual = 0.0;
    for category in ALL_CATEGORIES {
        let budget = budgets.get(&category).copied().unwrap_or(0.0);
        let actual = actuals.get(&category).copied().unwrap_or(0.0);
        if budget == 0.0 && actual == 0.0 {
            continue;
        }
        let variance = actual - budget;
        let variance_pct = if budget != 0.0 {
            variance / budget.abs() * 100.0
        } else {
            0.0
        };
        rows.push(VarianceRow {
            category,
            budget,
            actual,
            variance,
            variance_pct,
            status: VarianceStatus::of(variance),
        });
        total_budget += budget;
        total_actual += actual;
    }

    VarianceReport {
        rows,
        total_budget,
        total_actual,
        total_variance: total_actual - total_budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxnType;

    #[test]
    fn test_status_tolerance_band() {
        assert_eq!(VarianceStatus::of(5.0), VarianceStatus::Ok);
        assert_eq!(VarianceStatus::of(-5.0), VarianceStatus::Ok);
        assert_eq!(VarianceStatus::of(0.0), VarianceStatus::Ok);
        assert_eq!(VarianceStatus::of(5.01), VarianceStatus::Over);
        assert_eq!(VarianceStatus::of(-5.01), VarianceStatus::Under);
    }

    fn line(section: &str, item: &str, budget: f64) -> BudgetLine {
        BudgetLine {
            section: section.to_string(),
            item: item.to_string(),
            budget,
        }
    }

    #[test]
    fn test_budget_mapping_uses_rules_then_section() {
        let lines = vec![
            line("FIXED", "Rent", 550.0),
            line("FIXED", "Insurance", 175.0),
            line("GIVING", "Tithe", 410.0),
            // No rule for this item name; the VARIABLE section decides
            line("VARIABLE", "Day to day", 300.0),
        ];
        let budgets = budget_by_category(&lines, &RuleSet::builtin());
        assert_eq!(budgets.get(&Category::Bill).copied(), Some(725.0));
        assert_eq!(budgets.get(&Category::Giving).copied(), Some(410.0));
        assert_eq!(budgets.get(&Category::Allowance).copied(), Some(300.0));
    }

    fn txn(category: Category, amount: f64) -> Transaction {
        Transaction {
            id: "txn-1".to_string(),
            date: "2026-01-01".to_string(),
            label: String::new(),
            amount,
            txn_type: TxnType::Outflow,
            category,
            notes: String::new(),
            linked_rule_id: None,
        }
    }

    #[test]
    fn test_variance_report() {
        let mut budgets = HashMap::new();
        budgets.insert(Category::Bill, 2440.0);
        budgets.insert(Category::Giving, 815.0);
        let records = vec![
            txn(Category::Bill, 1829.55),
            txn(Category::Giving, 906.16),
        ];
        let report = variance_report(&budgets, &records);
        assert_eq!(report.rows.len(), 2);

        let bill = report.rows.iter().find(|r| r.category == Category::Bill).unwrap();
        assert!((bill.variance - (1829.55 - 2440.0)).abs() < 1e-9);
        assert_eq!(bill.status, VarianceStatus::Under);

        let giving = report.rows.iter().find(|r| r.category == Category::Giving).unwrap();
        assert!((giving.variance - (906.16 - 815.0)).abs() < 1e-9);
        assert_eq!(giving.status, VarianceStatus::Over);

        assert!((report.total_budget - 3255.0).abs() < 1e-9);
        assert!((report.total_variance - (report.total_actual - report.total_budget)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rows_are_omitted() {
        let budgets = HashMap::new();
        let records = vec![txn(Category::Allowance, 12.0)];
        let report = variance_report(&budgets, &records);
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].category, Category::Allowance);
        assert_eq!(report.rows[0].variance_pct, 0.0);
    }
}
