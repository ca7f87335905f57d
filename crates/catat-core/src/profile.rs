//! Domain profiles
//!
//! The financial and precious-metal pipelines share their whole shape
//! (prompt, gateway call, extraction, coercion) and differ only in
//! vocabulary, prompt template, and record schema. A [`DomainProfile`]
//! captures exactly that difference, so the interpreter is written once and
//! parameterized per route instead of duplicated per domain.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::coerce;
use crate::models::{MetalPurchaseRecord, TransactionRecord, TransactionType};
use crate::prompts::PromptId;

/// How the model was asked to shape its single-record text reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextReplyFormat {
    /// A fenced (or bare) JSON object.
    FencedJson,
    /// Line-oriented `key: value` pairs.
    KeyValueLines,
}

/// Which prompt variant produced the object being normalized.
///
/// The two variants carry separate category tables; see the table constants
/// below for where they disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceVariant {
    Text,
    Receipt,
}

/// Allow-lists for one categorical vocabulary, split by direction.
pub struct CategoryTable {
    pub income: &'static [&'static str],
    pub expense: &'static [&'static str],
    pub income_fallback: &'static str,
    pub expense_fallback: &'static str,
}

impl CategoryTable {
    /// Case-sensitive exact match against the direction's allow-list.
    pub fn resolve(&self, raw: &str, income: bool) -> String {
        if income {
            coerce::allow_listed(raw, self.income, self.income_fallback)
        } else {
            coerce::allow_listed(raw, self.expense, self.expense_fallback)
        }
    }
}

const INCOME_CATEGORIES: &[&str] = &[
    "Salary",
    "Business",
    "Side Hustle",
    "Dividends",
    "Interest",
    "Commission",
];

const EXPENSE_CATEGORIES: &[&str] = &[
    "Food & Beverage",
    "Social Life",
    "Transportation",
    "Apparel",
    "Personal Care",
    "Health",
    "Education",
    "Gifts",
    "Pets",
    "Self-Development",
    "Accessories",
    "Internet",
    "Electricity",
    "Water",
    "Mobile Phone",
    "Health Insurance",
    "Waste Disposal",
    "Gas",
    "Stocks",
    "Mortgage",
    "Vehicle Loan",
];

const RECEIPT_EXPENSE_CATEGORIES: &[&str] = &[
    "Food & Beverage",
    "Social Life",
    "Childcare",
    "Transportation",
    "Apparel",
    "Personal Care",
    "Health",
    "Education",
    "Gifts",
    "Pets",
    "Self-Development",
    "Accessories",
    "Internet",
    "Electricity",
    "Water",
    "Mobile Phone",
    "Life Insurance",
    "Health Insurance",
    "Waste Disposal",
    "Gas",
    "Stocks",
    "Mortgage",
    "Vehicle Loan",
];

const INCOME_WITH_FALLBACK: &[&str] = &[
    "Salary",
    "Business",
    "Side Hustle",
    "Dividends",
    "Interest",
    "Commission",
    "Other Income",
];

/// Text-variant table: carries "Other Income" as an income-side member and
/// fallback.
pub const FINANCIAL_TEXT_CATEGORIES: CategoryTable = CategoryTable {
    income: INCOME_WITH_FALLBACK,
    expense: EXPENSE_CATEGORIES,
    income_fallback: "Other Income",
    expense_fallback: "Other",
};

/// Receipt-variant table: no "Other Income"; receipts that claim income
/// collapse to the plain fallback. Kept separate from the text table on
/// purpose; the two vocabularies are configured per variant, not merged.
pub const FINANCIAL_RECEIPT_CATEGORIES: CategoryTable = CategoryTable {
    income: INCOME_CATEGORIES,
    expense: RECEIPT_EXPENSE_CATEGORIES,
    income_fallback: "Other",
    expense_fallback: "Other",
};

pub const DESCRIPTION_FALLBACK: &str = "Unspecified";

pub const METAL_BRANDS: &[&str] = &[
    "Antam",
    "UBS",
    "PAMP",
    "Galeri24",
    "Wonderful Wish",
    "Big Gold",
    "Lotus Archi",
    "Hartadinata",
    "King Halim",
    "Antam Retro",
    "Semar Nusantara",
];

pub const BRAND_FALLBACK: &str = "Other Brand";

pub const SAVINGS_GOALS: &[&str] = &[
    "Emergency Fund",
    "Children's Education",
    "Investment",
    "Retirement",
    "Hajj & Umrah",
    "Home",
    "Wedding",
    "Car",
    "Vacation",
    "Gadget",
];

pub const SAVINGS_FALLBACK: &str = "Not Applicable";

static NULL: Value = Value::Null;

fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a Value {
    obj.get(key).unwrap_or(&NULL)
}

/// One interpretation domain: record schema, prompts, and normalization.
pub trait DomainProfile {
    type Record: Serialize + Send + Sync;

    const NAME: &'static str;

    fn text_prompt() -> PromptId;
    fn receipt_prompt() -> PromptId;
    fn text_reply_format() -> TextReplyFormat;

    /// Build a fully-populated record from one extracted object.
    /// Total: every coercion failure resolves to a field default.
    fn record_from_object(
        obj: &Map<String, Value>,
        variant: SourceVariant,
        today: NaiveDate,
    ) -> Self::Record;
}

/// Financial transactions: category/type/amount/date/description.
pub struct Financial;

impl DomainProfile for Financial {
    type Record = TransactionRecord;

    const NAME: &'static str = "financial";

    fn text_prompt() -> PromptId {
        PromptId::FinancialText
    }

    fn receipt_prompt() -> PromptId {
        PromptId::FinancialReceipt
    }

    fn text_reply_format() -> TextReplyFormat {
        TextReplyFormat::FencedJson
    }

    fn record_from_object(
        obj: &Map<String, Value>,
        variant: SourceVariant,
        today: NaiveDate,
    ) -> TransactionRecord {
        let transaction_type =
            TransactionType::parse_or_default(&coerce::text(field(obj, "transaction_type"), ""));
        let table = match variant {
            SourceVariant::Text => &FINANCIAL_TEXT_CATEGORIES,
            SourceVariant::Receipt => &FINANCIAL_RECEIPT_CATEGORIES,
        };
        let raw_category = coerce::text(field(obj, "category"), "");
        TransactionRecord {
            category: table.resolve(&raw_category, transaction_type.is_income()),
            transaction_type,
            amount: coerce::amount(field(obj, "amount")),
            date: coerce::date(field(obj, "date"), today),
            description: coerce::text(field(obj, "description"), DESCRIPTION_FALLBACK),
        }
    }
}

/// Precious-metal purchases: brand/weight/amount/quantity/savings goal.
pub struct PreciousMetal;

impl DomainProfile for PreciousMetal {
    type Record = MetalPurchaseRecord;

    const NAME: &'static str = "precious-metal";

    fn text_prompt() -> PromptId {
        PromptId::MetalText
    }

    fn receipt_prompt() -> PromptId {
        PromptId::MetalReceipt
    }

    fn text_reply_format() -> TextReplyFormat {
        TextReplyFormat::KeyValueLines
    }

    fn record_from_object(
        obj: &Map<String, Value>,
        _variant: SourceVariant,
        today: NaiveDate,
    ) -> MetalPurchaseRecord {
        let raw_brand = coerce::text(field(obj, "brand"), "");
        MetalPurchaseRecord {
            brand: coerce::allow_listed(
                coerce::strip_metal_prefix(&raw_brand),
                METAL_BRANDS,
                BRAND_FALLBACK,
            ),
            weight_grams: coerce::weight_grams(field(obj, "weight_grams")),
            amount: coerce::amount(field(obj, "amount")),
            quantity: coerce::quantity(field(obj, "quantity")),
            savings_goal: coerce::allow_listed(
                coerce::text(field(obj, "savings_goal"), "").as_str(),
                SAVINGS_GOALS,
                SAVINGS_FALLBACK,
            ),
            date: coerce::date(field(obj, "date"), today),
        }
    }
}
