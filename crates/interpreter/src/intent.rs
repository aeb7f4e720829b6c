use serde::{Deserialize, Serialize};
use zapfin_classify::RecordMatch;
use zapfin_core::{DateSpec, Money, ReportPeriod};

/// One expense found in a message clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub value: Money,
    /// Clause text the value came from.
    pub context: String,
    pub description: String,
    pub category: String,
}

/// What a message asks for. Exactly one per message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Help,
    ShowBalance,
    SetBalance {
        value: Money,
    },
    ShowSummary,
    ShowDebts,
    ShowPeriodReport {
        period: ReportPeriod,
    },
    ShowIoSummary {
        period: ReportPeriod,
    },
    ShowBudget,
    DeleteLastExpense {
        target: RecordMatch,
    },
    PayDebt {
        debt: RecordMatch,
    },
    RegisterDebt {
        value: Money,
        description: String,
        due: DateSpec,
    },
    RegisterIncome {
        value: Money,
        description: String,
    },
    RegisterExpense {
        value: Money,
        description: String,
        category: String,
    },
    RegisterMultipleExpenses {
        expenses: Vec<TransactionCandidate>,
    },
    Tip,
    Unrecognized,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Help => "help",
            Intent::ShowBalance => "show_balance",
            Intent::SetBalance { .. } => "set_balance",
            Intent::ShowSummary => "show_summary",
            Intent::ShowDebts => "show_debts",
            Intent::ShowPeriodReport { .. } => "show_period_report",
            Intent::ShowIoSummary { .. } => "show_io_summary",
            Intent::ShowBudget => "show_budget",
            Intent::DeleteLastExpense { .. } => "delete_last_expense",
            Intent::PayDebt { .. } => "pay_debt",
            Intent::RegisterDebt { .. } => "register_debt",
            Intent::RegisterIncome { .. } => "register_income",
            Intent::RegisterExpense { .. } => "register_expense",
            Intent::RegisterMultipleExpenses { .. } => "register_multiple_expenses",
            Intent::Tip => "tip",
            Intent::Unrecognized => "unrecognized",
        }
    }

    /// Whether applying this intent changes the account.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Intent::SetBalance { .. }
                | Intent::DeleteLastExpense { .. }
                | Intent::PayDebt { .. }
                | Intent::RegisterDebt { .. }
                | Intent::RegisterIncome { .. }
                | Intent::RegisterExpense { .. }
                | Intent::RegisterMultipleExpenses { .. }
        )
    }
}
