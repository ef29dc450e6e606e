use serde::{Deserialize, Serialize};

/// Direction of a transaction relative to the budget pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Outflow,
    Transfer,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Outflow => "outflow",
            Self::Transfer => "transfer",
        }
    }
}

/// The app's fixed budget taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Income,
    Bill,
    Giving,
    Allowance,
    Savings,
    Other,
}

/// Report/display order, matching the downstream app's category list.
pub const ALL_CATEGORIES: [Category; 6] = [
    Category::Income,
    Category::Bill,
    Category::Giving,
    Category::Allowance,
    Category::Savings,
    Category::Other,
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Bill => "bill",
            Self::Giving => "giving",
            Self::Allowance => "allowance",
            Self::Savings => "savings",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "bill" => Some(Self::Bill),
            "giving" => Some(Self::Giving),
            "allowance" => Some(Self::Allowance),
            "savings" => Some(Self::Savings),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// One record in the downstream app's static data array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub label: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    pub category: Category,
    pub notes: String,
    pub linked_rule_id: Option<String>,
}

/// Intermediate representation of one Transactions-sheet row before
/// filtering and category mapping.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub date: String,
    pub txn_type: String,
    pub raw_category: String,
    pub description: String,
    pub amount: f64,
    pub period: Option<i64>,
}

/// One line of the "Budget by Period" sheet.
#[derive(Debug, Clone)]
pub struct BudgetLine {
    pub section: String,
    pub item: String,
    pub budget: f64,
}
