//! Per-account ledger and the consistency contract every posting must meet.
//!
//! A [`Posting`] is the whole effect of one message. [`AccountLedger::apply`]
//! validates it completely before touching any state, so a rejected posting
//! leaves the ledger exactly as it was and an accepted one lands in a single
//! step.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::Money;
use super::period::{DateRange, DateSpec};
use super::record::{AccountId, RecordHandle, RecordKind, StoredRecord};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Posting has nothing to apply")]
    EmptyPosting,
    #[error("Negative amount in posting: {0}")]
    NegativeAmount(Money),
    #[error("Record not found: {0}")]
    RecordNotFound(RecordHandle),
    #[error("Debt {handle} is worth {expected} but the payment records {actual}")]
    PaymentMismatch {
        handle: RecordHandle,
        expected: Money,
        actual: Money,
    },
    #[error("Amount too large for the ledger")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub description: String,
    pub value: Money,
    pub category: Option<String>,
}

impl NewEntry {
    pub fn new(description: &str, value: Money, category: Option<&str>) -> Self {
        NewEntry {
            description: description.to_string(),
            value,
            category: category.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDebt {
    pub description: String,
    pub value: Money,
    pub due: DateSpec,
}

/// Everything one message changes on an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Replaces the balance before incomes and expenses are applied.
    pub set_balance: Option<Money>,
    pub expenses: Vec<NewEntry>,
    pub incomes: Vec<NewEntry>,
    pub new_debt: Option<NewDebt>,
    pub settle_debt: Option<RecordHandle>,
    pub remove_expense: Option<RecordHandle>,
}

impl Posting {
    pub fn is_empty(&self) -> bool {
        self.set_balance.is_none()
            && self.expenses.is_empty()
            && self.incomes.is_empty()
            && self.new_debt.is_none()
            && self.settle_debt.is_none()
            && self.remove_expense.is_none()
    }

    pub fn total_expenses(&self) -> Option<Money> {
        Money::checked_sum(self.expenses.iter().map(|e| e.value))
    }

    pub fn total_incomes(&self) -> Option<Money> {
        Money::checked_sum(self.incomes.iter().map(|e| e.value))
    }
}

/// Outcome of a successful [`AccountLedger::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub previous: Money,
    pub balance: Money,
    pub created: Vec<RecordHandle>,
    pub removed: Vec<StoredRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoSummary {
    pub incoming: Money,
    pub outgoing: Money,
}

#[derive(Debug, Clone)]
pub struct AccountLedger {
    owner: AccountId,
    balance: Money,
    expenses: Vec<StoredRecord>,
    incomes: Vec<StoredRecord>,
    debts: Vec<StoredRecord>,
    next_handle: u64,
}

impl AccountLedger {
    pub fn new(owner: AccountId) -> Self {
        AccountLedger {
            owner,
            balance: Money::zero(),
            expenses: Vec::new(),
            incomes: Vec::new(),
            debts: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn expenses(&self) -> &[StoredRecord] {
        &self.expenses
    }

    pub fn incomes(&self) -> &[StoredRecord] {
        &self.incomes
    }

    pub fn open_debts(&self) -> &[StoredRecord] {
        &self.debts
    }

    pub fn total_debts(&self) -> Money {
        self.debts.iter().map(|d| d.value).sum()
    }

    pub fn expenses_in(&self, range: DateRange) -> impl Iterator<Item = &StoredRecord> {
        self.expenses
            .iter()
            .filter(move |e| range.contains(e.recorded_at.date()))
    }

    pub fn total_spent(&self, range: DateRange) -> Money {
        self.expenses_in(range).map(|e| e.value).sum()
    }

    pub fn io_summary(&self, range: DateRange) -> IoSummary {
        IoSummary {
            incoming: self
                .incomes
                .iter()
                .filter(|i| range.contains(i.recorded_at.date()))
                .map(|i| i.value)
                .sum(),
            outgoing: self.total_spent(range),
        }
    }

    /// Validate the whole posting, then apply it as one step.
    pub fn apply(&mut self, posting: Posting, at: NaiveDateTime) -> Result<Applied, LedgerError> {
        let removed_value = self.validate(&posting)?;

        let previous = self.balance;
        let base = posting.set_balance.unwrap_or(previous);
        let balance = Self::next_balance(base, &posting, removed_value).ok_or(LedgerError::Overflow)?;

        let mut created = Vec::new();
        let mut removed = Vec::new();

        if let Some(handle) = posting.settle_debt {
            if let Some(pos) = self.debts.iter().position(|d| d.handle == handle) {
                removed.push(self.debts.remove(pos));
            }
        }
        if let Some(handle) = posting.remove_expense {
            if let Some(pos) = self.expenses.iter().position(|e| e.handle == handle) {
                removed.push(self.expenses.remove(pos));
            }
        }
        for entry in posting.expenses {
            let record = self.record(RecordKind::Expense, entry, at);
            created.push(record.handle);
            self.expenses.push(record);
        }
        for entry in posting.incomes {
            let record = self.record(RecordKind::Income, entry, at);
            created.push(record.handle);
            self.incomes.push(record);
        }
        if let Some(debt) = posting.new_debt {
            let entry = NewEntry {
                description: debt.description,
                value: debt.value,
                category: None,
            };
            let record = self.record(RecordKind::Debt, entry, at).with_due(debt.due);
            created.push(record.handle);
            self.debts.push(record);
        }

        self.balance = balance;
        Ok(Applied {
            previous,
            balance,
            created,
            removed,
        })
    }

    fn next_balance(base: Money, posting: &Posting, removed_value: Money) -> Option<Money> {
        base.checked_add(posting.total_incomes()?)?
            .checked_sub(posting.total_expenses()?)?
            .checked_add(removed_value)
    }

    /// Returns the value given back to the balance by an expense removal.
    fn validate(&self, posting: &Posting) -> Result<Money, LedgerError> {
        if posting.is_empty() {
            return Err(LedgerError::EmptyPosting);
        }

        let values = posting
            .expenses
            .iter()
            .chain(posting.incomes.iter())
            .map(|e| e.value)
            .chain(posting.new_debt.iter().map(|d| d.value));
        for value in values {
            if value.is_negative() {
                return Err(LedgerError::NegativeAmount(value));
            }
        }

        if let Some(handle) = posting.settle_debt {
            let debt = self
                .debts
                .iter()
                .find(|d| d.handle == handle)
                .ok_or(LedgerError::RecordNotFound(handle))?;
            let paid = posting.total_expenses().ok_or(LedgerError::Overflow)?;
            if paid != debt.value {
                return Err(LedgerError::PaymentMismatch {
                    handle,
                    expected: debt.value,
                    actual: paid,
                });
            }
        }

        match posting.remove_expense {
            Some(handle) => self
                .expenses
                .iter()
                .find(|e| e.handle == handle)
                .map(|e| e.value)
                .ok_or(LedgerError::RecordNotFound(handle)),
            None => Ok(Money::zero()),
        }
    }

    fn record(&mut self, kind: RecordKind, entry: NewEntry, at: NaiveDateTime) -> StoredRecord {
        let handle = RecordHandle(self.next_handle);
        self.next_handle += 1;
        let mut record = StoredRecord::new(
            handle,
            self.owner.clone(),
            kind,
            &entry.description,
            entry.value,
            at,
        );
        record.category = entry.category;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn ledger() -> AccountLedger {
        AccountLedger::new(AccountId::new("5511999990000"))
    }

    fn expense(desc: &str, cents: i64) -> NewEntry {
        NewEntry::new(desc, Money::from_cents(cents), Some("Other"))
    }

    fn debt(desc: &str, cents: i64) -> Posting {
        Posting {
            new_debt: Some(NewDebt {
                description: desc.to_string(),
                value: Money::from_cents(cents),
                due: DateSpec::day_month(15, 11, None),
            }),
            ..Posting::default()
        }
    }

    #[test]
    fn set_balance_replaces_base() {
        let mut l = ledger();
        let applied = l
            .apply(Posting { set_balance: Some(Money::from_cents(50000)), ..Posting::default() }, at(1))
            .unwrap();
        assert_eq!(applied.previous, Money::zero());
        assert_eq!(l.balance(), Money::from_cents(50000));
    }

    #[test]
    fn multiple_expenses_hit_balance_once_by_sum() {
        let mut l = ledger();
        l.apply(Posting { set_balance: Some(Money::from_cents(10000)), ..Posting::default() }, at(1))
            .unwrap();
        let applied = l
            .apply(
                Posting {
                    expenses: vec![expense("Mercado", 5000), expense("Uber", 2000)],
                    ..Posting::default()
                },
                at(2),
            )
            .unwrap();
        assert_eq!(applied.balance, Money::from_cents(3000));
        assert_eq!(applied.created.len(), 2);
        assert_eq!(l.expenses().len(), 2);
    }

    #[test]
    fn income_adds_to_balance() {
        let mut l = ledger();
        l.apply(
            Posting { incomes: vec![NewEntry::new("Salário", Money::from_cents(350000), None)], ..Posting::default() },
            at(5),
        )
        .unwrap();
        assert_eq!(l.balance(), Money::from_cents(350000));
        assert_eq!(l.incomes().len(), 1);
    }

    #[test]
    fn registering_a_debt_leaves_balance_alone() {
        let mut l = ledger();
        let applied = l.apply(debt("Conta de luz", 18000), at(3)).unwrap();
        assert_eq!(applied.balance, Money::zero());
        assert_eq!(l.total_debts(), Money::from_cents(18000));
        assert_eq!(l.open_debts()[0].due, DateSpec::day_month(15, 11, None));
    }

    #[test]
    fn paying_a_debt_converts_it_to_an_expense() {
        let mut l = ledger();
        let created = l.apply(debt("Conta de luz", 18000), at(3)).unwrap().created[0];
        let applied = l
            .apply(
                Posting {
                    expenses: vec![expense("Pagamento: Conta de luz", 18000)],
                    settle_debt: Some(created),
                    ..Posting::default()
                },
                at(4),
            )
            .unwrap();
        assert_eq!(applied.balance, Money::from_cents(-18000));
        assert!(l.open_debts().is_empty());
        assert_eq!(applied.removed[0].description, "Conta de luz");
    }

    #[test]
    fn payment_must_match_debt_value() {
        let mut l = ledger();
        let created = l.apply(debt("Internet", 10000), at(3)).unwrap().created[0];
        let err = l
            .apply(
                Posting {
                    expenses: vec![expense("Pagamento: Internet", 9000)],
                    settle_debt: Some(created),
                    ..Posting::default()
                },
                at(4),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::PaymentMismatch { .. }));
        // Rejected postings leave state untouched.
        assert_eq!(l.open_debts().len(), 1);
        assert!(l.expenses().is_empty());
        assert_eq!(l.balance(), Money::zero());
    }

    #[test]
    fn removing_last_expense_returns_value() {
        let mut l = ledger();
        let created = l
            .apply(Posting { expenses: vec![expense("Pizza", 4500)], ..Posting::default() }, at(2))
            .unwrap()
            .created[0];
        let applied = l
            .apply(Posting { remove_expense: Some(created), ..Posting::default() }, at(2))
            .unwrap();
        assert_eq!(applied.balance, Money::zero());
        assert!(l.expenses().is_empty());
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let mut l = ledger();
        let err = l
            .apply(Posting { remove_expense: Some(RecordHandle(42)), ..Posting::default() }, at(2))
            .unwrap_err();
        assert_eq!(err, LedgerError::RecordNotFound(RecordHandle(42)));
    }

    #[test]
    fn negative_and_empty_postings_are_rejected() {
        let mut l = ledger();
        assert_eq!(l.apply(Posting::default(), at(1)).unwrap_err(), LedgerError::EmptyPosting);
        let err = l
            .apply(Posting { expenses: vec![expense("X", -100)], ..Posting::default() }, at(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NegativeAmount(_)));
    }

    #[test]
    fn balance_equals_base_plus_incomes_minus_expenses() {
        let mut l = ledger();
        let postings = vec![
            Posting { set_balance: Some(Money::from_cents(100000)), ..Posting::default() },
            Posting { expenses: vec![expense("A", 1234), expense("B", 766)], ..Posting::default() },
            Posting { incomes: vec![NewEntry::new("Freela", Money::from_cents(50000), None)], ..Posting::default() },
            Posting { expenses: vec![expense("C", 9999)], ..Posting::default() },
        ];
        for p in postings {
            l.apply(p, at(10)).unwrap();
        }
        let spent: Money = l.expenses().iter().map(|e| e.value).sum();
        let earned: Money = l.incomes().iter().map(|i| i.value).sum();
        assert_eq!(l.balance(), Money::from_cents(100000) + earned - spent);
    }

    #[test]
    fn period_queries_filter_by_date() {
        let mut l = ledger();
        l.apply(Posting { expenses: vec![expense("Old", 1000)], ..Posting::default() }, at(1))
            .unwrap();
        l.apply(Posting { expenses: vec![expense("New", 2000)], ..Posting::default() }, at(15))
            .unwrap();
        l.apply(
            Posting { incomes: vec![NewEntry::new("Pix", Money::from_cents(500), None)], ..Posting::default() },
            at(15),
        )
        .unwrap();
        let range = DateRange::new(at(10).date(), at(20).date());
        assert_eq!(l.total_spent(range), Money::from_cents(2000));
        let io = l.io_summary(range);
        assert_eq!(io.incoming, Money::from_cents(500));
        assert_eq!(io.outgoing, Money::from_cents(2000));
    }

    #[test]
    fn oversized_amounts_are_rejected_not_panicking() {
        let mut l = ledger();
        let huge = Money::from_decimal(rust_decimal::Decimal::MAX);
        let posting = Posting {
            expenses: vec![
                NewEntry::new("Bar", huge, Some("Other")),
                NewEntry::new("Uber", huge, Some("Other")),
            ],
            ..Posting::default()
        };
        assert_eq!(l.apply(posting, at(1)).unwrap_err(), LedgerError::Overflow);
        assert!(l.expenses().is_empty());
        assert_eq!(l.balance(), Money::zero());

        l.apply(Posting { incomes: vec![NewEntry::new("Pix", huge, None)], ..Posting::default() }, at(1))
            .unwrap();
        let err = l
            .apply(Posting { incomes: vec![NewEntry::new("Pix", huge, None)], ..Posting::default() }, at(2))
            .unwrap_err();
        assert_eq!(err, LedgerError::Overflow);
        assert_eq!(l.balance(), huge);
        assert_eq!(l.incomes().len(), 1);
    }

    #[test]
    fn handles_are_unique_per_ledger() {
        let mut l = ledger();
        let a = l
            .apply(Posting { expenses: vec![expense("A", 100)], ..Posting::default() }, at(1))
            .unwrap();
        let b = l.apply(debt("B", 100), at(1)).unwrap();
        assert_ne!(a.created[0], b.created[0]);
    }
}
