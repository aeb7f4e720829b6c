use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use chrono::NaiveDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use zapfin_core::{AccountId, AccountLedger, Money};
use zapfin_interpreter::{posting_for, Context, Intent, Interpreter, RawMessage};

use crate::reply::{render, Effect};

/// Outcome of one message.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub text: String,
    pub intent: Intent,
    pub effect: Effect,
    pub reply: String,
}

/// In-memory ledgers, one lock per account.
///
/// Interpret, post and reply all happen while the account's lock is held,
/// so a message never sees another message's half-applied update. Different
/// accounts never contend.
#[derive(Default)]
pub struct LedgerBook {
    accounts: Mutex<HashMap<AccountId, Arc<Mutex<AccountLedger>>>>,
}

impl LedgerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ledger(&self, account: &AccountId) -> Arc<Mutex<AccountLedger>> {
        let mut accounts = self.accounts.lock().await;
        accounts
            .entry(account.clone())
            .or_insert_with(|| Arc::new(Mutex::new(AccountLedger::new(account.clone()))))
            .clone()
    }

    pub async fn balance(&self, account: &AccountId) -> Money {
        self.ledger(account).await.lock().await.balance()
    }

    pub async fn handle(&self, interpreter: &Interpreter, message: &RawMessage) -> Exchange {
        let ledger = self.ledger(&message.sender_id).await;
        let mut ledger = ledger.lock().await;

        let intent = {
            let ctx = Context::new(&message.sender_id, message.received_at)
                .with_debts(ledger.open_debts())
                .with_expenses(ledger.expenses());
            interpreter.interpret(&message.text, &ctx)
        };

        let effect = match posting_for(&intent) {
            None => Effect::Unchanged,
            Some(posting) => match ledger.apply(posting, message.received_at) {
                Ok(applied) => {
                    debug!(
                        account = %message.sender_id,
                        previous = %applied.previous,
                        balance = %applied.balance,
                        "posting applied"
                    );
                    Effect::Applied(applied)
                }
                Err(e) => {
                    warn!(account = %message.sender_id, "posting rejected: {e}");
                    Effect::Rejected(e)
                }
            },
        };

        let reply = render(&intent, &effect, &ledger, message.received_at);
        Exchange {
            text: message.text.clone(),
            intent,
            effect,
            reply,
        }
    }
}

/// Parse a replay script: one `account|message` per line. Blank lines and
/// lines starting with `#` are skipped.
pub fn parse_script(content: &str, received_at: NaiveDateTime) -> anyhow::Result<Vec<RawMessage>> {
    let mut messages = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((account, text)) = line.split_once('|') else {
            bail!("line {}: expected `account|message`", number + 1);
        };
        let account = account.trim();
        if account.is_empty() {
            bail!("line {}: missing account", number + 1);
        }
        messages.push(RawMessage::new(text.trim(), AccountId::from(account), received_at));
    }
    Ok(messages)
}

/// Run every account's messages in order on its own task; accounts proceed
/// concurrently. Transcripts come back keyed by account.
pub async fn replay(
    interpreter: Arc<Interpreter>,
    book: Arc<LedgerBook>,
    messages: Vec<RawMessage>,
) -> anyhow::Result<BTreeMap<AccountId, Vec<Exchange>>> {
    let mut by_account: BTreeMap<AccountId, Vec<RawMessage>> = BTreeMap::new();
    for message in messages {
        by_account.entry(message.sender_id.clone()).or_default().push(message);
    }

    let mut tasks = Vec::new();
    for (account, messages) in by_account {
        let interpreter = Arc::clone(&interpreter);
        let book = Arc::clone(&book);
        let task = tokio::spawn(async move {
            let mut transcript = Vec::with_capacity(messages.len());
            for message in &messages {
                transcript.push(book.handle(&interpreter, message).await);
            }
            transcript
        });
        tasks.push((account, task));
    }

    let mut transcripts = BTreeMap::new();
    for (account, task) in tasks {
        let transcript = task
            .await
            .with_context(|| format!("replay task for {account} failed"))?;
        transcripts.insert(account, transcript);
    }
    Ok(transcripts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use zapfin_core::LedgerError;
    use zapfin_interpreter::InterpreterConfig;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn interpreter() -> Arc<Interpreter> {
        Arc::new(Interpreter::rule_based(InterpreterConfig::default()))
    }

    #[test]
    fn parses_script_lines() {
        let script = "# comment\nalice|tenho 500 na conta\n\n bob | gastei 20 no uber \n";
        let messages = parse_script(script, now()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender_id, AccountId::from("bob"));
        assert_eq!(messages[1].text, "gastei 20 no uber");
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_script("alice tenho 500", now()).is_err());
        assert!(parse_script("|tenho 500", now()).is_err());
    }

    #[tokio::test]
    async fn handle_applies_and_replies() {
        let book = LedgerBook::new();
        let interpreter = interpreter();
        let alice = AccountId::from("alice");

        book.handle(&interpreter, &RawMessage::new("tenho 500 na conta", alice.clone(), now()))
            .await;
        let exchange = book
            .handle(&interpreter, &RawMessage::new("gastei 50 no mercado", alice.clone(), now()))
            .await;

        assert!(matches!(exchange.effect, Effect::Applied(_)));
        assert!(exchange.reply.contains("R$ 450,00"));
        assert_eq!(book.balance(&alice).await, Money::from_cents(45000));
    }

    #[tokio::test]
    async fn unknown_debt_leaves_ledger_alone() {
        let book = LedgerBook::new();
        let alice = AccountId::from("alice");
        let exchange = book
            .handle(&interpreter(), &RawMessage::new("paguei o aluguel", alice.clone(), now()))
            .await;
        assert_eq!(exchange.effect, Effect::Unchanged);
        assert_eq!(exchange.reply, "Você não tem nenhuma dívida para pagar.");
    }

    #[tokio::test]
    async fn oversized_amounts_are_rejected_and_the_account_keeps_working() {
        let book = LedgerBook::new();
        let interpreter = interpreter();
        let alice = AccountId::from("alice");
        let huge = "gastei 79228162514264337593543950335 no bar e 79228162514264337593543950335 no uber";

        let exchange = book.handle(&interpreter, &RawMessage::new(huge, alice.clone(), now())).await;
        assert_eq!(exchange.effect, Effect::Rejected(LedgerError::Overflow));
        assert!(exchange.reply.starts_with("❌"));

        book.handle(&interpreter, &RawMessage::new("gastei 20 no uber", alice.clone(), now()))
            .await;
        assert_eq!(book.balance(&alice).await, Money::from_cents(-2000));
    }

    #[tokio::test]
    async fn replay_keeps_accounts_apart() {
        let script = "\
            alice|tenho 1000 na conta\n\
            bob|tenho 200 na conta\n\
            alice|gastei 50 no mercado e 20 no uber\n\
            bob|recebi 300 do freela\n\
            alice|conta de luz 180 vence dia 25\n\
            alice|paguei a conta de luz\n";
        let book = Arc::new(LedgerBook::new());
        let transcripts = replay(interpreter(), Arc::clone(&book), parse_script(script, now()).unwrap())
            .await
            .unwrap();

        assert_eq!(transcripts[&AccountId::from("alice")].len(), 4);
        assert_eq!(transcripts[&AccountId::from("bob")].len(), 2);
        assert_eq!(book.balance(&AccountId::from("alice")).await, Money::from_cents(75000));
        assert_eq!(book.balance(&AccountId::from("bob")).await, Money::from_cents(50000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_messages_on_one_account_all_land() {
        let book = Arc::new(LedgerBook::new());
        let interpreter = interpreter();
        let alice = AccountId::from("alice");

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let book = Arc::clone(&book);
            let interpreter = Arc::clone(&interpreter);
            let alice = alice.clone();
            tasks.push(tokio::spawn(async move {
                book.handle(&interpreter, &RawMessage::new("gastei 10 no café", alice, now()))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(book.balance(&alice).await, Money::from_cents(-20000));
        let ledger = book.ledger(&alice).await;
        assert_eq!(ledger.lock().await.expenses().len(), 20);
    }
}
