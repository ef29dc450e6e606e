use crate::mapper::RuleSet;
use crate::models::{Category, RawRow, Transaction, TxnType, ALL_CATEGORIES};
use crate::workbook::LoadStats;

/// Which slice of the Transactions sheet to extract.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Column I period index.
    Period(i64),
    /// Inclusive ISO date window.
    Dates { from: String, to: String },
}

impl Filter {
    fn keeps(&self, row: &RawRow) -> bool {
        match self {
            Self::Period(n) => row.period == Some(*n),
            Self::Dates { from, to } => {
                // ISO dates compare correctly as strings
                row.date.as_str() >= from.as_str() && row.date.as_str() <= to.as_str()
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Period(n) => format!("period {n}"),
            Self::Dates { from, to } => format!("{from} .. {to}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct ExtractStats {
    pub scanned: usize,
    pub missing_date: usize,
    pub missing_amount: usize,
    pub outside_filter: usize,
    pub zero_amount: usize,
    pub unknown_type: usize,
}

impl ExtractStats {
    pub fn skipped(&self) -> usize {
        self.missing_date + self.missing_amount + self.zero_amount + self.unknown_type
    }
}

pub struct Extraction {
    pub records: Vec<Transaction>,
    pub stats: ExtractStats,
}

/// The whole pipeline: filter rows, resolve types and categories, sort
/// newest-first, then assign sequence ids so output order and ids agree.
pub fn extract(rows: &[RawRow], filter: &Filter, rules: &RuleSet, load_stats: &LoadStats) -> Extraction {
    let mut stats = ExtractStats {
        scanned: load_stats.scanned,
        missing_date: load_stats.missing_date,
        missing_amount: load_stats.missing_amount,
        ..Default::default()
    };

    let mut records = Vec::new();
    for row in rows {
        if !filter.keeps(row) {
            stats.outside_filter += 1;
            continue;
        }
        if row.amount == 0.0 {
            stats.zero_amount += 1;
            continue;
        }

        let type_lower = row.txn_type.trim().to_lowercase();
        let (txn_type, category) = if type_lower.contains("transfer") {
            let cat = rules
                .map_row(&row.raw_category, &row.description)
                .unwrap_or(Category::Savings);
            (TxnType::Transfer, cat)
        } else if type_lower == "income" {
            (TxnType::Income, Category::Income)
        } else if type_lower == "expense" {
            let cat = rules
                .map_row(&row.raw_category, &row.description)
                .unwrap_or(Category::Other);
            (TxnType::Outflow, cat)
        } else {
            stats.unknown_type += 1;
            continue;
        };

        let label = if row.description.is_empty() {
            row.raw_category.clone()
        } else {
            row.description.clone()
        };
        let linked_rule_id = match txn_type {
            TxnType::Transfer => Some(category.as_str().to_string()),
            _ => None,
        };
        records.push(Transaction {
            id: String::new(),
            date: row.date.clone(),
            label,
            amount: row.amount.abs(),
            txn_type,
            category,
            notes: row.raw_category.clone(),
            linked_rule_id,
        });
    }

    // Newest first, stable within a day
    records.sort_by(|a, b| b.date.cmp(&a.date));
    for (i, record) in records.iter_mut().enumerate() {
        record.id = format!("txn-{}", i + 1);
    }

    Extraction { records, stats }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

pub struct CategoryTotal {
    pub category: Category,
    pub count: usize,
    pub total: f64,
}

pub fn category_totals(records: &[Transaction]) -> Vec<CategoryTotal> {
    ALL_CATEGORIES
        .iter()
        .map(|&category| {
            let matching = records.iter().filter(|r| r.category == category);
            let (count, total) = matching.fold((0usize, 0.0f64), |(c, t), r| (c + 1, t + r.amount));
            CategoryTotal {
                category,
                count,
                total,
            }
        })
        .filter(|ct| ct.count > 0)
        .collect()
}

pub struct TypeTotal {
    pub txn_type: TxnType,
    pub count: usize,
    pub total: f64,
}

pub fn type_totals(records: &[Transaction]) -> Vec<TypeTotal> {
    [TxnType::Income, TxnType::Outflow, TxnType::Transfer]
        .iter()
        .map(|&txn_type| {
            let matching = records.iter().filter(|r| r.txn_type == txn_type);
            let (count, total) = matching.fold((0usize, 0.0f64), |(c, t), r| (c + 1, t + r.amount));
            TypeTotal {
                txn_type,
                count,
                total,
            }
        })
        .collect()
}

/// Income minus outflows minus transfers out.
pub fn net(records: &[Transaction]) -> f64 {
    records.iter().fold(0.0, |acc, r| match r.txn_type {
        TxnType::Income => acc + r.amount,
        TxnType::Outflow | TxnType::Transfer => acc - r.amount,
    })
}
