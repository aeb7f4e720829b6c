use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::period::DateSpec;

/// Identifier of the account holder a message came from (a phone number in
/// the chat deployment).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        AccountId(s.to_string())
    }
}

/// Opaque handle a caller gives each stored record so the interpreter can
/// point back at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordHandle(pub u64);

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Expense,
    Income,
    Debt,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Expense => write!(f, "expense"),
            RecordKind::Income => write!(f, "income"),
            RecordKind::Debt => write!(f, "debt"),
        }
    }
}

/// An expense, income or open debt as the caller stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub handle: RecordHandle,
    pub owner: AccountId,
    pub kind: RecordKind,
    pub description: String,
    pub value: Money,
    pub category: Option<String>,
    pub due: DateSpec,
    pub recorded_at: NaiveDateTime,
}

impl StoredRecord {
    pub fn new(
        handle: RecordHandle,
        owner: AccountId,
        kind: RecordKind,
        description: &str,
        value: Money,
        recorded_at: NaiveDateTime,
    ) -> Self {
        StoredRecord {
            handle,
            owner,
            kind,
            description: description.to_string(),
            value,
            category: None,
            due: DateSpec::Unspecified,
            recorded_at,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_due(mut self, due: DateSpec) -> Self {
        self.due = due;
        self
    }
}
