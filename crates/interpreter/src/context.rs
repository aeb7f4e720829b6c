use chrono::{NaiveDate, NaiveDateTime};
use zapfin_core::{AccountId, StoredRecord};

/// An incoming chat message as the transport hands it over.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub text: String,
    pub sender_id: AccountId,
    pub received_at: NaiveDateTime,
}

impl RawMessage {
    pub fn new(text: &str, sender_id: AccountId, received_at: NaiveDateTime) -> Self {
        RawMessage {
            text: text.to_string(),
            sender_id,
            received_at,
        }
    }
}

/// Caller-supplied state an interpretation may look at.
///
/// `debts` and `expenses` may hold other accounts' records too; lookups only
/// ever consider entries owned by `account_id`.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub account_id: &'a AccountId,
    pub now: NaiveDateTime,
    pub debts: &'a [StoredRecord],
    pub expenses: &'a [StoredRecord],
}

impl<'a> Context<'a> {
    pub fn new(account_id: &'a AccountId, now: NaiveDateTime) -> Self {
        Context {
            account_id,
            now,
            debts: &[],
            expenses: &[],
        }
    }

    pub fn with_debts(mut self, debts: &'a [StoredRecord]) -> Self {
        self.debts = debts;
        self
    }

    pub fn with_expenses(mut self, expenses: &'a [StoredRecord]) -> Self {
        self.expenses = expenses;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}
