use zapfin_core::{NewDebt, NewEntry, Posting};

use crate::intent::Intent;

pub const PAYMENT_PREFIX: &str = "Pagamento";

/// The ledger change an intent asks for, or `None` for queries and for
/// references to records that were not found.
pub fn posting_for(intent: &Intent) -> Option<Posting> {
    let posting = match intent {
        Intent::SetBalance { value } => Posting {
            set_balance: Some(*value),
            ..Posting::default()
        },
        Intent::RegisterExpense {
            value,
            description,
            category,
        } => Posting {
            expenses: vec![NewEntry::new(description, *value, Some(category))],
            ..Posting::default()
        },
        Intent::RegisterMultipleExpenses { expenses } => Posting {
            expenses: expenses
                .iter()
                .map(|c| NewEntry::new(&c.description, c.value, Some(&c.category)))
                .collect(),
            ..Posting::default()
        },
        Intent::RegisterIncome { value, description } => Posting {
            incomes: vec![NewEntry::new(description, *value, None)],
            ..Posting::default()
        },
        Intent::RegisterDebt {
            value,
            description,
            due,
        } => Posting {
            new_debt: Some(NewDebt {
                description: description.clone(),
                value: *value,
                due: *due,
            }),
            ..Posting::default()
        },
        Intent::PayDebt { debt } => {
            let handle = debt.record_handle.filter(|_| debt.found)?;
            let value = debt.value?;
            let description = debt.matched_description.as_deref().unwrap_or_default();
            Posting {
                settle_debt: Some(handle),
                expenses: vec![NewEntry::new(
                    &format!("{PAYMENT_PREFIX}: {description}"),
                    value,
                    None,
                )],
                ..Posting::default()
            }
        }
        Intent::DeleteLastExpense { target } => Posting {
            remove_expense: Some(target.record_handle.filter(|_| target.found)?),
            ..Posting::default()
        },
        _ => return None,
    };
    Some(posting)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use zapfin_classify::RecordMatch;
    use zapfin_core::{AccountId, AccountLedger, DateSpec, LedgerError, Money, RecordHandle};

    use super::*;
    use crate::config::InterpreterConfig;
    use crate::context::Context;
    use crate::resolver::Interpreter;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn m(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    /// Interpret `text` against the ledger's current records and apply it.
    fn send(interpreter: &Interpreter, ledger: &mut AccountLedger, text: &str, hour: u32) -> Intent {
        let owner = ledger.owner().clone();
        let debts = ledger.open_debts().to_vec();
        let expenses = ledger.expenses().to_vec();
        let ctx = Context::new(&owner, at(hour))
            .with_debts(&debts)
            .with_expenses(&expenses);
        let intent = interpreter.interpret(text, &ctx);
        if let Some(posting) = posting_for(&intent) {
            ledger.apply(posting, at(hour)).unwrap();
        }
        intent
    }

    #[test]
    fn queries_post_nothing() {
        assert_eq!(posting_for(&Intent::ShowBalance), None);
        assert_eq!(posting_for(&Intent::Unrecognized), None);
        assert_eq!(
            posting_for(&Intent::PayDebt {
                debt: RecordMatch::not_found("luz")
            }),
            None
        );
    }

    #[test]
    fn multiple_expenses_change_balance_once() {
        let interpreter = Interpreter::rule_based(InterpreterConfig::default());
        let mut ledger = AccountLedger::new(AccountId::from("alice"));

        send(&interpreter, &mut ledger, "tenho 500 na conta", 8);
        assert_eq!(ledger.balance(), m(50000));

        send(&interpreter, &mut ledger, "gastei 50 no mercado e 20 no uber", 9);
        assert_eq!(ledger.balance(), m(43000));
        assert_eq!(ledger.expenses().len(), 2);
    }

    #[test]
    fn debt_lifecycle() {
        let interpreter = Interpreter::rule_based(InterpreterConfig::default());
        let mut ledger = AccountLedger::new(AccountId::from("alice"));

        send(&interpreter, &mut ledger, "tenho 1000 na conta", 8);
        send(&interpreter, &mut ledger, "conta de luz 180 vence 15/11", 9);
        assert_eq!(ledger.total_debts(), m(18000));
        assert_eq!(ledger.open_debts()[0].due, DateSpec::day_month(15, 11, None));
        assert_eq!(ledger.balance(), m(100000));

        let intent = send(&interpreter, &mut ledger, "paguei a conta de luz", 10);
        assert!(matches!(intent, Intent::PayDebt { ref debt } if debt.found));
        assert!(ledger.open_debts().is_empty());
        assert_eq!(ledger.balance(), m(82000));
        assert_eq!(ledger.expenses()[0].description, "Pagamento: Luz");
        assert_eq!(ledger.expenses()[0].value, m(18000));
    }

    #[test]
    fn delete_last_gives_value_back() {
        let interpreter = Interpreter::rule_based(InterpreterConfig::default());
        let mut ledger = AccountLedger::new(AccountId::from("alice"));

        send(&interpreter, &mut ledger, "tenho 300 na conta", 8);
        send(&interpreter, &mut ledger, "gastei 40 na pizza", 9);
        send(&interpreter, &mut ledger, "gastei 25 no cinema", 10);
        assert_eq!(ledger.balance(), m(23500));

        send(&interpreter, &mut ledger, "apagar último", 11);
        assert_eq!(ledger.balance(), m(26000));
        assert_eq!(ledger.expenses().len(), 1);
        assert_eq!(ledger.expenses()[0].description, "Pizza");
    }

    #[test]
    fn income_adds_to_balance() {
        let interpreter = Interpreter::rule_based(InterpreterConfig::default());
        let mut ledger = AccountLedger::new(AccountId::from("alice"));
        send(&interpreter, &mut ledger, "recebi 2.500 do salário", 8);
        assert_eq!(ledger.balance(), m(250000));
        assert_eq!(ledger.incomes()[0].description, "Entrada");
    }

    #[test]
    fn stale_payment_is_rejected_without_changes() {
        let mut ledger = AccountLedger::new(AccountId::from("alice"));
        let stale = Intent::PayDebt {
            debt: RecordMatch {
                found: true,
                matched_description: Some("Internet".to_string()),
                value: Some(m(10000)),
                record_handle: Some(RecordHandle(42)),
                query: "internet".to_string(),
                score: 1.0,
            },
        };
        let posting = posting_for(&stale).unwrap();
        assert_eq!(
            ledger.apply(posting, at(8)),
            Err(LedgerError::RecordNotFound(RecordHandle(42)))
        );
        assert_eq!(ledger.balance(), Money::zero());
        assert!(ledger.expenses().is_empty());
    }
}
