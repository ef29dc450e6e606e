use std::path::Path;

use calamine::{Data, Reader};
use sha2::{Digest, Sha256};

use crate::error::{PlanfeedError, Result};
use crate::models::{BudgetLine, Category, RawRow};

pub const TRANSACTIONS_SHEET: &str = "Transactions";
pub const BUDGET_SHEET: &str = "Budget by Period";
pub const MAPPING_SHEET: &str = "Category Mapping";

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('£', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

/// ISO first, then UK day-first.
pub fn parse_date_str(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(d) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    chrono::NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = chrono::NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
    let date = base + chrono::Duration::days(serial as i64);
    date.format("%Y-%m-%d").to_string()
}

fn cell_to_date(cell: &Data) -> Option<String> {
    match cell {
        Data::Float(f) if *f > 0.0 => Some(excel_serial_to_date(*f)),
        Data::Int(i) if *i > 0 => Some(excel_serial_to_date(*i as f64)),
        Data::DateTime(dt) => Some(excel_serial_to_date(dt.as_f64())),
        Data::String(s) | Data::DateTimeIso(s) => parse_date_str(s),
        _ => None,
    }
}

fn cell_to_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_amount(s),
        _ => None,
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_to_period(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => Some(*f as i64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Transactions sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LoadStats {
    pub scanned: usize,
    pub missing_date: usize,
    pub missing_amount: usize,
}

pub struct LoadedRows {
    pub rows: Vec<RawRow>,
    pub stats: LoadStats,
}

/// Walk the Transactions sheet (or a CSV export of it) into raw rows.
/// Columns, 1-indexed: A=date, B=type, C=category label, D=description,
/// E=amount, I=period index.
pub fn load_transactions(path: &Path) -> Result<LoadedRows> {
    if is_csv(path) {
        load_transactions_csv(path)
    } else {
        load_transactions_xlsx(path)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"))
}

fn open_workbook(path: &Path) -> Result<calamine::Sheets<std::io::BufReader<std::fs::File>>> {
    calamine::open_workbook_auto(path)
        .map_err(|e| PlanfeedError::Workbook(format!("failed to open {}: {e}", path.display())))
}

fn worksheet(
    workbook: &mut calamine::Sheets<std::io::BufReader<std::fs::File>>,
    name: &str,
) -> Result<calamine::Range<Data>> {
    if !workbook.sheet_names().iter().any(|n| n == name) {
        return Err(PlanfeedError::MissingSheet(name.to_string()));
    }
    workbook
        .worksheet_range(name)
        .map_err(|e| PlanfeedError::Workbook(format!("failed to read sheet {name}: {e}")))
}

fn load_transactions_xlsx(path: &Path) -> Result<LoadedRows> {
    let mut workbook = open_workbook(path)?;
    let range = worksheet(&mut workbook, TRANSACTIONS_SHEET)?;

    let mut rows = Vec::new();
    let mut stats = LoadStats::default();
    for row in range.rows().skip(1) {
        if row.len() < 5 || row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        stats.scanned += 1;
        let Some(date) = cell_to_date(&row[0]) else {
            stats.missing_date += 1;
            continue;
        };
        let Some(amount) = cell_to_f64(&row[4]) else {
            stats.missing_amount += 1;
            continue;
        };
        rows.push(RawRow {
            date,
            txn_type: cell_to_string(&row[1]),
            raw_category: cell_to_string(&row[2]),
            description: cell_to_string(&row[3]),
            amount,
            period: row.get(8).and_then(cell_to_period),
        });
    }
    Ok(LoadedRows { rows, stats })
}

fn load_transactions_csv(path: &Path) -> Result<LoadedRows> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let mut rows = Vec::new();
    let mut stats = LoadStats::default();
    for result in rdr.records() {
        let record = result?;
        if record.len() < 5 {
            continue;
        }
        // Header row, wherever it sits
        if record[0].trim() == "Date" {
            continue;
        }
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        stats.scanned += 1;
        let Some(date) = parse_date_str(&record[0]) else {
            stats.missing_date += 1;
            continue;
        };
        let Some(amount) = parse_amount(&record[4]) else {
            stats.missing_amount += 1;
            continue;
        };
        rows.push(RawRow {
            date,
            txn_type: record[1].trim().to_string(),
            raw_category: record[2].trim().to_string(),
            description: record[3].trim().to_string(),
            amount,
            period: record.get(8).and_then(|p| p.trim().parse().ok()),
        });
    }
    Ok(LoadedRows { rows, stats })
}

// ---------------------------------------------------------------------------
// Budget by Period sheet
// ---------------------------------------------------------------------------

/// Columns, 1-indexed: A=section (INCOME/FIXED/GIVING/VARIABLE/SAVINGS/
/// ONE-OFF), B=item name, D=budgeted amount.
pub fn load_budget_lines(path: &Path) -> Result<Vec<BudgetLine>> {
    if is_csv(path) {
        return Err(PlanfeedError::MissingSheet(BUDGET_SHEET.to_string()));
    }
    let mut workbook = open_workbook(path)?;
    let range = worksheet(&mut workbook, BUDGET_SHEET)?;

    let mut lines = Vec::new();
    for row in range.rows().skip(1) {
        if row.len() < 4 {
            continue;
        }
        let section = cell_to_string(&row[0]);
        let item = cell_to_string(&row[1]);
        if section.is_empty() || item.is_empty() {
            continue;
        }
        let Some(budget) = cell_to_f64(&row[3]) else {
            continue;
        };
        lines.push(BudgetLine {
            section,
            item,
            budget,
        });
    }
    Ok(lines)
}

// ---------------------------------------------------------------------------
// Category Mapping sheet (optional overrides)
// ---------------------------------------------------------------------------

/// Two columns: raw label, app category. Absent sheet means no overrides.
pub fn load_mapping_overrides(path: &Path) -> Result<Vec<(String, Category)>> {
    if is_csv(path) {
        return Ok(Vec::new());
    }
    let mut workbook = open_workbook(path)?;
    if !workbook.sheet_names().iter().any(|n| n == MAPPING_SHEET) {
        return Ok(Vec::new());
    }
    let range = worksheet(&mut workbook, MAPPING_SHEET)?;

    let mut pairs = Vec::new();
    for row in range.rows() {
        if row.len() < 2 {
            continue;
        }
        let label = cell_to_string(&row[0]);
        // Header and junk rows fall out here: "Category" is not a category.
        let Some(category) = Category::parse(&cell_to_string(&row[1])) else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        pairs.push((label, category));
    }
    Ok(pairs)
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

pub fn checksum(path: &Path) -> Result<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("£410.00"), Some(410.0));
        assert_eq!(parse_amount("  -42.50  "), Some(-42.5));
        assert_eq!(parse_amount("(500.00)"), Some(-500.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("not_a_number"), None);
    }

    #[test]
    fn test_parse_date_str() {
        assert_eq!(parse_date_str("2026-01-15"), Some("2026-01-15".to_string()));
        assert_eq!(parse_date_str("15/01/2026"), Some("2026-01-15".to_string()));
        assert_eq!(parse_date_str("30/02/2026"), None);
        assert_eq!(parse_date_str("soon"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), "2025-01-10");
    }

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_transactions_csv() {
        let dir = tempfile::tempdir().unwrap();
        let content = "\
Date,Type,Category,Description,Amount,F,G,H,Period
2025-12-22,Income,Income - FM,December salary,2000,,,,1
2025-12-23,Expense,Tithe,Tithe for December,-410,,,,1
2026-01-28,Expense,Rent,Rent for January,-550,,,,2
";
        let path = write_csv(dir.path(), "txns.csv", content);
        let loaded = load_transactions(&path).unwrap();
        assert_eq!(loaded.rows.len(), 3);
        assert_eq!(loaded.stats.scanned, 3);
        assert_eq!(loaded.rows[0].txn_type, "Income");
        assert_eq!(loaded.rows[1].raw_category, "Tithe");
        assert_eq!(loaded.rows[1].amount, -410.0);
        assert_eq!(loaded.rows[2].period, Some(2));
    }

    #[test]
    fn test_load_transactions_csv_skips_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let content = "\
Date,Type,Category,Description,Amount,F,G,H,Period
,Expense,Rent,missing date,-550,,,,1
2025-12-23,Expense,Rent,missing amount,,,,,1
2025-12-24,Expense,Rent,good,-550,,,,1
";
        let path = write_csv(dir.path(), "txns.csv", content);
        let loaded = load_transactions(&path).unwrap();
        assert_eq!(loaded.rows.len(), 1);
        assert_eq!(loaded.stats.missing_date, 1);
        assert_eq!(loaded.stats.missing_amount, 1);
        assert_eq!(loaded.stats.scanned, 3);
    }

    #[test]
    fn test_load_transactions_csv_uk_dates() {
        let dir = tempfile::tempdir().unwrap();
        let content = "Date,Type,Category,Description,Amount\n\
                       22/12/2025,Expense,Fuel,Fuel for Renault Scenic,-60\n";
        let path = write_csv(dir.path(), "txns.csv", content);
        let loaded = load_transactions(&path).unwrap();
        assert_eq!(loaded.rows[0].date, "2025-12-22");
        assert_eq!(loaded.rows[0].period, None);
    }

    #[test]
    fn test_budget_lines_unavailable_for_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "txns.csv", "Date,Type,Category,Description,Amount\n");
        let err = load_budget_lines(&path).unwrap_err();
        assert!(err.to_string().contains("Budget by Period"));
    }

    #[test]
    fn test_checksum_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "a.csv", "hello\n");
        let c1 = checksum(&path).unwrap();
        let c2 = checksum(&path).unwrap();
        assert_eq!(c1, c2);
        assert_eq!(c1.len(), 64);
    }
}
