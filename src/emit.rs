use std::path::Path;

use crate::error::Result;
use crate::models::Transaction;

/// Pretty-printed JSON array, trailing newline, byte-stable across runs.
pub fn to_json(records: &[Transaction]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(records)?;
    json.push('\n');
    Ok(json)
}

fn escape_ts(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The pasteable array-literal fragment for the app's static data module.
/// One object per line, indented to sit inside the existing array.
pub fn to_ts_fragment(records: &[Transaction]) -> String {
    let mut out = String::new();
    for r in records {
        let linked = match &r.linked_rule_id {
            Some(id) => format!("\"{}\"", escape_ts(id)),
            None => "undefined".to_string(),
        };
        out.push_str(&format!(
            "    {{ id: \"{}\", date: \"{}\", label: \"{}\", amount: {}, type: \"{}\", category: \"{}\", notes: \"{}\", linkedRuleId: {} }},\n",
            r.id,
            r.date,
            escape_ts(&r.label),
            r.amount,
            r.txn_type.as_str(),
            r.category.as_str(),
            escape_ts(&r.notes),
            linked,
        ));
    }
    out
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}
