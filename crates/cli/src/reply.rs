use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDateTime};
use zapfin_core::{AccountLedger, Applied, LedgerError, Money, ReportPeriod};
use zapfin_interpreter::Intent;

pub const COMMANDS_MESSAGE: &str = "Olá! Sou sua assistente financeira pessoal. 💸

Você pode falar comigo como se estivesse conversando com alguém!

*Exemplos do que você pode me dizer:*
- `gastei 25,50 no almoço`
- `recebi 3500 do salário`
- `tenho uma conta de luz de 180 que vence 15/09`
- `paguei a conta de luz`
- `qual meu saldo?`
- `o que gastei hoje?`

*Principais Comandos:*
📊 *RELATÓRIOS*
- `saldo`: Para ver seu saldo atual.
- `resumo financeiro`: Visão geral com saldo e dívidas.
- `gastos hoje` (ou `semana`/`mês`): Lista seus gastos.
- `entradas e saídas hoje` (ou `semana`/`mês`): Mostra o balanço.
- `minhas dívidas`: Lista suas dívidas pendentes.

⚙️ *AÇÕES*
- `apagar último gasto`: Remove o último gasto registrado.
- `paguei [descrição da dívida]`: Marca uma dívida como paga e registra o gasto.
- `dica`: Te dou uma dica financeira.

Qualquer dúvida, é só chamar! 😊";

pub const FINANCIAL_TIPS: &[&str] = &[
    "Anote todos os seus gastos, até os pequenos. Isso te ajuda a entender para onde seu dinheiro está indo.",
    "Crie um orçamento mensal. A regra 50/30/20 (50% necessidades, 30% desejos, 20% poupança) é um bom começo!",
    "Antes de uma compra por impulso, espere 24 horas. Muitas vezes, a vontade passa e você economiza.",
    "Tenha uma reserva de emergência. O ideal é ter o equivalente a 3 a 6 meses do seu custo de vida guardado.",
    "Compare preços antes de comprar. A internet facilita muito a pesquisa e a economia.",
    "Evite usar o cartão de crédito para compras do dia a dia. É mais fácil perder o controle dos gastos assim.",
    "Defina metas financeiras claras, como 'guardar R$1000 para uma viagem'. Metas te mantêm motivado.",
];

/// What happened to the ledger while handling a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Nothing to apply (queries, unknown references).
    Unchanged,
    Applied(Applied),
    Rejected(LedgerError),
}

/// Tip of the day; rotates with the calendar so replays are reproducible.
pub fn tip_for(now: NaiveDateTime) -> &'static str {
    FINANCIAL_TIPS[now.ordinal0() as usize % FINANCIAL_TIPS.len()]
}

/// Render the chat reply for `intent` after `effect` was applied to `ledger`.
pub fn render(intent: &Intent, effect: &Effect, ledger: &AccountLedger, now: NaiveDateTime) -> String {
    if let Effect::Rejected(err) = effect {
        return format!("❌ Ops, não consegui registrar isso: {err}.");
    }
    let today = now.format("%d/%m");
    let balance = ledger.balance();

    match intent {
        Intent::Greeting => "Olá! Como posso te ajudar hoje? 😊".to_string(),
        Intent::Help => COMMANDS_MESSAGE.to_string(),
        Intent::ShowBalance => format!("💵 Seu saldo atual é de *{balance}*."),
        Intent::SetBalance { .. } => format!("✅ Saldo atualizado! Seu saldo agora é *{balance}*."),
        Intent::ShowSummary => format!(
            "📊 *Resumo Financeiro*\n\n- Saldo em conta: *{balance}*\n- Total de dívidas: *{}*",
            ledger.total_debts()
        ),
        Intent::ShowDebts => debts_report(ledger),
        Intent::ShowPeriodReport { period } => period_report(ledger, *period, now),
        Intent::ShowIoSummary { period } => io_summary(ledger, *period, now),
        Intent::ShowBudget => budget_report(ledger, now),
        Intent::DeleteLastExpense { .. } => {
            let removed = match effect {
                Effect::Applied(applied) => applied.removed.first(),
                _ => None,
            };
            match removed {
                Some(removed) => format!(
                    "🗑️ Último gasto apagado!\n- {}: {}\nO valor foi devolvido ao seu saldo. Novo saldo: *{balance}*.",
                    removed.description, removed.value
                ),
                None => "Não encontrei gastos seus para apagar.".to_string(),
            }
        }
        Intent::PayDebt { debt } => match (effect, debt.matched_description.as_deref()) {
            (Effect::Applied(_), Some(description)) => format!(
                "✅ Dívida '{description}' paga com sucesso!\nSeu novo saldo é *{balance}*."
            ),
            _ if ledger.open_debts().is_empty() => {
                "Você não tem nenhuma dívida para pagar.".to_string()
            }
            _ => format!(
                "Não encontrei a dívida '{}'. Verifique a lista em 'minhas dívidas'.",
                debt.query
            ),
        },
        Intent::RegisterDebt {
            value,
            description,
            due,
        } => format!("🧾 Dívida registrada!\n- {description}: *{value}*\n- Vencimento: {due}"),
        Intent::RegisterIncome { value, description } => format!(
            "💰 Entrada registrada em {today}!\n- {description}: *{value}*\n\nSeu novo saldo é *{balance}*."
        ),
        Intent::RegisterExpense {
            value,
            description,
            category,
        } => format!(
            "✅ Gasto registrado em {today}!\n- {description}: *{value}* ({category})\n\nSeu novo saldo é *{balance}*."
        ),
        Intent::RegisterMultipleExpenses { expenses } => {
            let mut out = format!(
                "Entendido! Registrei {} gastos para você em {today}:",
                expenses.len()
            );
            for e in expenses {
                let _ = write!(out, "\n- {}: *{}* ({})", e.description, e.value, e.category);
            }
            let _ = write!(out, "\n\nSeu novo saldo é *{balance}*.");
            out
        }
        Intent::Tip => format!("💡 {}", tip_for(now)),
        Intent::Unrecognized => "Não entendi. 🤔\n\n\
             - Para *gastos*, tente: `gastei 20 no lanche`\n\
             - Para *dívidas*, tente: `conta de luz 150 vence 10/09`\n\
             - Para *entradas*, tente: `recebi 500`\n\n\
             Para ver tudo, envie `comandos`."
            .to_string(),
    }
}

fn debts_report(ledger: &AccountLedger) -> String {
    let debts = ledger.open_debts();
    if debts.is_empty() {
        return "Você não tem nenhuma dívida registrada. Parabéns! 🎉".to_string();
    }
    let mut out = "📋 *Suas Dívidas Pendentes* 📋\n".to_string();
    for debt in debts {
        let _ = write!(out, "\n- {} (Vence: {}): {}", debt.description, debt.due, debt.value);
    }
    let _ = write!(out, "\n\n*Total de Dívidas: {}*", ledger.total_debts());
    out
}

fn period_name(period: ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Day => "hoje",
        ReportPeriod::Week => "nesta semana",
        ReportPeriod::Month => "neste mês",
    }
}

fn period_report(ledger: &AccountLedger, period: ReportPeriod, now: NaiveDateTime) -> String {
    let range = period.range(now.date());
    let name = period_name(period);
    let expenses: Vec<_> = ledger.expenses_in(range).collect();
    if expenses.is_empty() {
        return format!("Você não teve gastos {name}. 🎉");
    }
    let mut out = format!("🧾 *Seus gastos {name}* 🧾\n");
    for e in &expenses {
        let _ = write!(out, "\n- {}: {}", e.description, e.value);
    }
    let _ = write!(out, "\n\n*Total gasto: {}*", ledger.total_spent(range));
    out
}

fn io_summary(ledger: &AccountLedger, period: ReportPeriod, now: NaiveDateTime) -> String {
    let summary = ledger.io_summary(period.range(now.date()));
    let name = match period {
        ReportPeriod::Day => "de hoje",
        ReportPeriod::Week => "da semana",
        ReportPeriod::Month => "do mês",
    };
    format!(
        "💸 *Balanço {name}*\n\n- Entradas: *{}*\n- Saídas: *{}*",
        summary.incoming, summary.outgoing
    )
}

/// Month-to-date spending per category.
fn budget_report(ledger: &AccountLedger, now: NaiveDateTime) -> String {
    let range = ReportPeriod::Month.range(now.date());
    let mut by_category: BTreeMap<&str, Money> = BTreeMap::new();
    for e in ledger.expenses_in(range) {
        let category = e.category.as_deref().unwrap_or("Other");
        let total = by_category.entry(category).or_insert_with(Money::zero);
        *total = total.saturating_add(e.value);
    }
    if by_category.is_empty() {
        return "📒 Nenhum gasto neste mês ainda, seu orçamento está intacto.".to_string();
    }
    let mut out = "📒 *Orçamento do mês por categoria*\n".to_string();
    for (category, total) in &by_category {
        let _ = write!(out, "\n- {category}: {total}");
    }
    let _ = write!(out, "\n\n*Total gasto: {}*", ledger.total_spent(range));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use zapfin_core::{AccountId, NewEntry, Posting};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn ledger_with_expenses() -> AccountLedger {
        let mut ledger = AccountLedger::new(AccountId::from("alice"));
        let posting = Posting {
            set_balance: Some(Money::from_cents(100000)),
            expenses: vec![
                NewEntry::new("Mercado", Money::from_cents(5000), Some("Alimentação")),
                NewEntry::new("Uber", Money::from_cents(2000), Some("Transporte")),
            ],
            ..Posting::default()
        };
        ledger.apply(posting, now()).unwrap();
        ledger
    }

    #[test]
    fn balance_uses_brazilian_format() {
        let ledger = ledger_with_expenses();
        let reply = render(&Intent::ShowBalance, &Effect::Unchanged, &ledger, now());
        assert_eq!(reply, "💵 Seu saldo atual é de *R$ 930,00*.");
    }

    #[test]
    fn period_report_lists_expenses() {
        let ledger = ledger_with_expenses();
        let intent = Intent::ShowPeriodReport {
            period: ReportPeriod::Day,
        };
        let reply = render(&intent, &Effect::Unchanged, &ledger, now());
        assert!(reply.contains("- Mercado: R$ 50,00"));
        assert!(reply.contains("*Total gasto: R$ 70,00*"));
    }

    #[test]
    fn empty_reports() {
        let ledger = AccountLedger::new(AccountId::from("bob"));
        assert!(render(&Intent::ShowDebts, &Effect::Unchanged, &ledger, now()).contains("Parabéns"));
        let intent = Intent::ShowPeriodReport {
            period: ReportPeriod::Month,
        };
        assert_eq!(
            render(&intent, &Effect::Unchanged, &ledger, now()),
            "Você não teve gastos neste mês. 🎉"
        );
    }

    #[test]
    fn budget_groups_by_category() {
        let reply = render(&Intent::ShowBudget, &Effect::Unchanged, &ledger_with_expenses(), now());
        assert!(reply.contains("- Alimentação: R$ 50,00"));
        assert!(reply.contains("- Transporte: R$ 20,00"));
    }

    #[test]
    fn tip_is_stable_for_a_day() {
        assert_eq!(tip_for(now()), tip_for(now() + chrono::Duration::hours(5)));
        assert!(FINANCIAL_TIPS.contains(&tip_for(now())));
    }

    #[test]
    fn rejected_posting_is_reported() {
        let ledger = AccountLedger::new(AccountId::from("alice"));
        let reply = render(
            &Intent::ShowBalance,
            &Effect::Rejected(LedgerError::EmptyPosting),
            &ledger,
            now(),
        );
        assert!(reply.starts_with("❌"));
    }
}
