//! The ordered rule table the resolver walks.
//!
//! Each [`Rule`] has a trigger (does the message talk about this?), a guard
//! (is it safe to read it this way?) and a builder. The first rule whose
//! trigger and guard pass and whose builder yields an intent decides the
//! message. Order is significant: report phrases beat transactions, paying
//! beats registering, debts beat income, and anything with money that is
//! not otherwise claimed becomes an expense.

use zapfin_classify::{FallbackLabel, RecordMatcher};
use zapfin_core::{Money, ReportPeriod};
use zapfin_parse::{extract_date, find_values, fold, parse_values_outside_dates, strip_dates};

use crate::config::Vocabulary;
use crate::context::Context;
use crate::intent::Intent;
use crate::resolver::Interpreter;

/// Bumped whenever rules are added, removed or reordered.
pub const RULE_TABLE_VERSION: u32 = 1;

/// Confidence reported for intents decided by a literal rule.
pub const RULE_CONFIDENCE: f32 = 1.0;

/// A message prepared once for every rule to inspect.
pub struct Scope<'a> {
    pub text: &'a str,
    pub folded: String,
    /// Money mentioned outside any date.
    pub values: Vec<Money>,
    pub ctx: &'a Context<'a>,
    pub interpreter: &'a Interpreter,
}

impl<'a> Scope<'a> {
    pub fn new(interpreter: &'a Interpreter, text: &'a str, ctx: &'a Context<'a>) -> Self {
        Scope {
            text,
            folded: fold(text),
            values: parse_values_outside_dates(text),
            ctx,
            interpreter,
        }
    }

    fn vocab(&self) -> &Vocabulary {
        self.interpreter.vocabulary()
    }

    fn has_value(&self) -> bool {
        !self.values.is_empty()
    }

    fn mentions(&self, phrases: &[String]) -> bool {
        phrases.iter().any(|p| contains_phrase(&self.folded, p))
    }

    fn mentions_inflected(&self, phrases: &[String]) -> bool {
        phrases.iter().any(|p| contains_inflected(&self.folded, p))
    }

    fn period(&self) -> Option<ReportPeriod> {
        let vocab = self.vocab();
        if self.mentions(&vocab.period_day) {
            Some(ReportPeriod::Day)
        } else if self.mentions(&vocab.period_week) {
            Some(ReportPeriod::Week)
        } else if self.mentions(&vocab.period_month) {
            Some(ReportPeriod::Month)
        } else {
            None
        }
    }
}

pub type Check = fn(&Scope) -> bool;
pub type Build = fn(&Scope) -> Option<(Intent, f32)>;

pub struct Rule {
    pub name: &'static str,
    pub trigger: Check,
    pub guard: Check,
    pub build: Build,
}

pub static RULES: &[Rule] = &[
    Rule { name: "greeting", trigger: is_greeting, guard: always, build: greeting },
    Rule { name: "help", trigger: asks_help, guard: always, build: help },
    Rule { name: "show_balance", trigger: asks_balance, guard: not_setting_balance, build: show_balance },
    Rule { name: "show_summary", trigger: asks_summary, guard: always, build: show_summary },
    Rule { name: "delete_last_expense", trigger: asks_delete_last, guard: always, build: delete_last_expense },
    Rule { name: "tip", trigger: asks_tip, guard: always, build: tip },
    Rule { name: "show_debts", trigger: asks_debts, guard: always, build: show_debts },
    Rule { name: "show_io_summary", trigger: asks_io_summary, guard: has_period, build: show_io_summary },
    Rule { name: "show_period_report", trigger: asks_period_report, guard: has_period, build: show_period_report },
    Rule { name: "pay_debt", trigger: mentions_payment, guard: payment_resolves, build: pay_debt },
    Rule { name: "set_balance", trigger: mentions_set_balance, guard: plain_balance_statement, build: set_balance },
    Rule { name: "register_debt", trigger: mentions_debt, guard: value_without_expense_marker, build: register_debt },
    Rule { name: "register_income", trigger: mentions_income, guard: value_without_expense_marker, build: register_income },
    Rule { name: "register_expense", trigger: has_value, guard: always, build: register_expenses },
    Rule { name: "fallback_classifier", trigger: has_no_value, guard: always, build: classify },
    Rule { name: "unrecognized", trigger: always, guard: always, build: unrecognized },
];

/// Whole-word occurrence of `phrase` in `text`; both already folded.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    phrase_at_word_start(text, phrase, &[""])
}

/// Like [`contains_phrase`], but the last word may also carry a plural or
/// verb ending: "parcela" finds "parcelas", "vence" finds "vencem".
pub fn contains_inflected(text: &str, phrase: &str) -> bool {
    phrase_at_word_start(text, phrase, &["", "s", "m"])
}

fn phrase_at_word_start(text: &str, phrase: &str, endings: &[&str]) -> bool {
    if phrase.is_empty() {
        return false;
    }
    text.match_indices(phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        if before.is_some_and(char::is_alphanumeric) {
            return false;
        }
        let rest = &text[start + phrase.len()..];
        endings.iter().any(|ending| {
            rest.strip_prefix(ending)
                .is_some_and(|after| !after.chars().next().is_some_and(char::is_alphanumeric))
        })
    })
}

fn certain(intent: Intent) -> Option<(Intent, f32)> {
    Some((intent, RULE_CONFIDENCE))
}

// Triggers and guards

fn always(_: &Scope) -> bool {
    true
}

fn has_value(s: &Scope) -> bool {
    s.has_value()
}

fn has_no_value(s: &Scope) -> bool {
    !s.has_value()
}

fn has_period(s: &Scope) -> bool {
    s.period().is_some()
}

fn is_greeting(s: &Scope) -> bool {
    let bare = s.folded.trim_matches(|c: char| !c.is_alphanumeric());
    s.vocab().greetings.iter().any(|g| g == bare)
}

fn asks_help(s: &Scope) -> bool {
    s.mentions(&s.vocab().help)
}

fn asks_balance(s: &Scope) -> bool {
    s.mentions(&s.vocab().show_balance)
}

/// "meu saldo é 500" states a balance rather than asking for it.
fn not_setting_balance(s: &Scope) -> bool {
    !(s.has_value() && s.mentions(&s.vocab().set_balance))
}

fn asks_summary(s: &Scope) -> bool {
    s.mentions(&s.vocab().summary)
}

fn asks_delete_last(s: &Scope) -> bool {
    s.mentions(&s.vocab().delete_last)
}

fn asks_tip(s: &Scope) -> bool {
    s.mentions(&s.vocab().tip)
}

fn asks_debts(s: &Scope) -> bool {
    s.mentions(&s.vocab().show_debts)
}

fn asks_io_summary(s: &Scope) -> bool {
    s.mentions(&s.vocab().io_summary)
}

fn asks_period_report(s: &Scope) -> bool {
    s.mentions(&s.vocab().period_report)
}

fn mentions_payment(s: &Scope) -> bool {
    s.mentions(&s.vocab().pay_debt)
}

/// Without an amount "paguei a luz" can only mean a debt. With one, it is a
/// debt payment only if it names a known debt; otherwise it is an expense.
fn payment_resolves(s: &Scope) -> bool {
    !s.has_value() || find_debt(s).found
}

fn mentions_set_balance(s: &Scope) -> bool {
    s.mentions(&s.vocab().set_balance)
}

fn has_expense_marker(s: &Scope) -> bool {
    s.mentions(&s.vocab().expense_markers)
}

fn value_without_expense_marker(s: &Scope) -> bool {
    s.has_value() && !has_expense_marker(s)
}

/// "tenho 500 na conta" sets the balance; "tenho uma conta de luz de 180",
/// "tenho 3 parcelas de 200" and "tenho 500 de salário" do not. Naming
/// where the money sits ("na conta de poupança") outweighs a debt word.
fn plain_balance_statement(s: &Scope) -> bool {
    value_without_expense_marker(s)
        && !mentions_income(s)
        && (s.mentions(&s.vocab().account_context) || !mentions_debt(s))
}

fn mentions_debt(s: &Scope) -> bool {
    s.mentions_inflected(&s.vocab().register_debt)
}

fn mentions_income(s: &Scope) -> bool {
    s.mentions_inflected(&s.vocab().income)
}

// Builders

fn greeting(_: &Scope) -> Option<(Intent, f32)> {
    certain(Intent::Greeting)
}

fn help(_: &Scope) -> Option<(Intent, f32)> {
    certain(Intent::Help)
}

fn show_balance(_: &Scope) -> Option<(Intent, f32)> {
    certain(Intent::ShowBalance)
}

fn show_summary(_: &Scope) -> Option<(Intent, f32)> {
    certain(Intent::ShowSummary)
}

fn delete_last_expense(s: &Scope) -> Option<(Intent, f32)> {
    let target = RecordMatcher::latest(s.ctx.expenses, s.ctx.account_id);
    certain(Intent::DeleteLastExpense { target })
}

fn tip(_: &Scope) -> Option<(Intent, f32)> {
    certain(Intent::Tip)
}

fn show_debts(_: &Scope) -> Option<(Intent, f32)> {
    certain(Intent::ShowDebts)
}

fn show_io_summary(s: &Scope) -> Option<(Intent, f32)> {
    let period = s.period()?;
    certain(Intent::ShowIoSummary { period })
}

fn show_period_report(s: &Scope) -> Option<(Intent, f32)> {
    let period = s.period()?;
    certain(Intent::ShowPeriodReport { period })
}

fn find_debt(s: &Scope) -> zapfin_classify::RecordMatch {
    s.interpreter
        .matcher()
        .find(s.text, s.ctx.debts, s.ctx.account_id)
}

fn pay_debt(s: &Scope) -> Option<(Intent, f32)> {
    let debt = find_debt(s);
    let confidence = if debt.found { debt.score } else { RULE_CONFIDENCE };
    Some((Intent::PayDebt { debt }, confidence))
}

fn set_balance(s: &Scope) -> Option<(Intent, f32)> {
    let value = *s.values.first()?;
    certain(Intent::SetBalance { value })
}

/// The debt's amount and the text left to describe it. A number right
/// before an installment word counts installments ("3 parcelas de 200")
/// and is dropped rather than read as money.
fn debt_amount(s: &Scope) -> Option<(Money, String)> {
    let text = strip_dates(s.text);
    let tokens = find_values(&text);
    let is_count = |end: usize| {
        let next = fold(&text[end..]);
        next.split_whitespace()
            .next()
            .is_some_and(|word| s.vocab().installment_words.iter().any(|p| contains_inflected(word, p)))
    };
    let amount = tokens.iter().find(|t| !is_count(t.end)).or(tokens.first())?;

    let mut rest = String::with_capacity(text.len());
    let mut cursor = 0;
    for count in tokens.iter().filter(|t| t.start != amount.start && is_count(t.end)) {
        rest.push_str(&text[cursor..count.start]);
        rest.push(' ');
        cursor = count.end;
    }
    rest.push_str(&text[cursor..]);
    Some((amount.value, rest))
}

fn register_debt(s: &Scope) -> Option<(Intent, f32)> {
    let (value, rest) = debt_amount(s)?;
    let description = s.interpreter.normalizer().normalize_or(
        &rest,
        Some(value),
        &s.vocab().debt_placeholder,
    );
    let due = extract_date(s.text, s.ctx.today());
    certain(Intent::RegisterDebt {
        value,
        description,
        due,
    })
}

fn register_income(s: &Scope) -> Option<(Intent, f32)> {
    let value = *s.values.first()?;
    let description = s.interpreter.normalizer().normalize_or(
        s.text,
        Some(value),
        &s.vocab().income_placeholder,
    );
    certain(Intent::RegisterIncome { value, description })
}

fn register_expenses(s: &Scope) -> Option<(Intent, f32)> {
    let mut candidates = s.interpreter.extract_transactions(s.text);
    match candidates.len() {
        0 => None,
        1 => {
            let only = candidates.remove(0);
            certain(Intent::RegisterExpense {
                value: only.value,
                description: only.description,
                category: only.category,
            })
        }
        _ => certain(Intent::RegisterMultipleExpenses {
            expenses: candidates,
        }),
    }
}

fn classify(s: &Scope) -> Option<(Intent, f32)> {
    let prediction = s.interpreter.classifier().classify(s.text);
    if prediction.confidence < s.vocab().fallback_threshold {
        return None;
    }
    let intent = match prediction.label {
        FallbackLabel::Greeting => Intent::Greeting,
        FallbackLabel::ShowBalance => Intent::ShowBalance,
        FallbackLabel::ShowDebts => Intent::ShowDebts,
        FallbackLabel::Tip => Intent::Tip,
        FallbackLabel::ShowBudget => Intent::ShowBudget,
    };
    Some((intent, prediction.confidence))
}

fn unrecognized(_: &Scope) -> Option<(Intent, f32)> {
    Some((Intent::Unrecognized, 0.0))
}
