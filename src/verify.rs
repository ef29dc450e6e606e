use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::error::{PlanfeedError, Result};
use crate::models::Category;

pub struct Violation {
    pub record: String,
    pub message: String,
}

pub struct VerifySummary {
    pub records: usize,
    pub violations: Vec<Violation>,
}

const TYPES: [&str; 3] = ["income", "outflow", "transfer"];

/// Check an emitted JSON array against the data-model invariants. Works on
/// raw JSON values so one malformed record produces a diagnostic instead
/// of failing the whole file.
pub fn verify_records(array: &[Value]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen_ids = HashSet::new();

    for (i, value) in array.iter().enumerate() {
        let fallback_id = format!("record #{}", i + 1);
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback_id);
        let mut fail = |message: String| {
            violations.push(Violation {
                record: id.clone(),
                message,
            });
        };

        let Some(obj) = value.as_object() else {
            fail("not a JSON object".to_string());
            continue;
        };

        if !seen_ids.insert(id.clone()) {
            fail("duplicate id".to_string());
        }

        match obj.get("date").and_then(Value::as_str) {
            Some(d) if chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok() => {}
            Some(d) => fail(format!("bad date '{d}'")),
            None => fail("missing date".to_string()),
        }

        match obj.get("amount").and_then(Value::as_f64) {
            Some(a) if a.is_finite() && a >= 0.0 => {}
            Some(a) => fail(format!("negative or non-finite amount {a}")),
            None => fail("missing amount".to_string()),
        }

        let txn_type = obj.get("type").and_then(Value::as_str);
        match txn_type {
            Some(t) if TYPES.contains(&t) => {}
            Some(t) => fail(format!("unknown type '{t}'")),
            None => fail("missing type".to_string()),
        }

        match obj.get("category").and_then(Value::as_str) {
            Some(c) if Category::parse(c).is_some() => {}
            Some(c) => fail(format!("unknown category '{c}'")),
            None => fail("missing category".to_string()),
        }

        if txn_type == Some("transfer") {
            match obj.get("linkedRuleId") {
                Some(Value::String(s)) if !s.is_empty() => {}
                _ => fail("transfer without linkedRuleId".to_string()),
            }
        }
    }

    violations
}

pub fn verify_file(path: &Path) -> Result<VerifySummary> {
    let content = std::fs::read_to_string(path)?;
    let parsed: Value = serde_json::from_str(&content)?;
    let Some(array) = parsed.as_array() else {
        return Err(PlanfeedError::Other(format!(
            "{} is not a JSON array of records",
            path.display()
        )));
    };
    Ok(VerifySummary {
        records: array.len(),
        violations: verify_records(array),
    })
}
