//! Record types produced by the interpretation pipeline
//!
//! Every field of every record is always populated: coercion supplies a
//! documented default for anything the model omitted or garbled, so callers
//! never see a partial record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction/type of a financial transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
    Bill,
    Investment,
    Installment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Bill => "Bill",
            Self::Investment => "Investment",
            Self::Installment => "Installment",
        }
    }

    /// Parse a model-provided type string. Unknown values fall back to
    /// `Expense`, the safe default for a spending tracker.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim() {
            "Income" => Self::Income,
            "Expense" => Self::Expense,
            "Bill" => Self::Bill,
            "Investment" => Self::Investment,
            "Installment" => Self::Installment,
            _ => Self::Expense,
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }
}

impl Default for TransactionType {
    fn default() -> Self {
        Self::Expense
    }
}

/// One normalized financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Category from the active allow-list, or the fallback constant
    pub category: String,
    pub transaction_type: TransactionType,
    /// Base-currency value with unit suffixes already expanded
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
}

/// One normalized precious-metal purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalPurchaseRecord {
    /// Brand from the fixed allow-list, or "Other Brand"
    pub brand: String,
    pub weight_grams: f64,
    pub amount: f64,
    pub quantity: i64,
    pub savings_goal: String,
    pub date: NaiveDate,
}

/// Result of a multi-record (receipt) interpretation
///
/// An empty `transactions` list is a valid, successful outcome (zero
/// transactions detected), distinguished from gateway/extraction failure.
/// `note` carries the model's explanation when it declined to extract.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome<R> {
    pub transactions: Vec<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl<R> BatchOutcome<R> {
    pub fn empty_with_note(note: impl Into<String>) -> Self {
        Self {
            transactions: Vec::new(),
            note: Some(note.into()),
        }
    }
}
