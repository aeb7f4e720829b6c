use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use zapfin_classify::{Category, CategoryLexicon, FallbackError, FALLBACK_CATEGORY};
use zapfin_parse::{fold, NoisePhrases, DEFAULT_PLACEHOLDER};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Model(#[from] FallbackError),
}

/// Every phrase set the rule table consults.
///
/// Phrases are written naturally (with accents) and folded once when the
/// interpreter is built; matching is whole-word on folded, lowercased text.
/// Help phrases are tried before tips, so no tip phrase may contain one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub version: u32,
    /// Matched against the whole message, not as a substring.
    pub greetings: Vec<String>,
    pub help: Vec<String>,
    pub show_balance: Vec<String>,
    pub set_balance: Vec<String>,
    pub summary: Vec<String>,
    pub delete_last: Vec<String>,
    pub tip: Vec<String>,
    pub show_debts: Vec<String>,
    pub io_summary: Vec<String>,
    pub period_report: Vec<String>,
    pub pay_debt: Vec<String>,
    /// Debt and income phrases also match their plural and verb forms.
    pub register_debt: Vec<String>,
    /// Nouns a count can precede ("3 parcelas"); that number is not money.
    pub installment_words: Vec<String>,
    pub income: Vec<String>,
    /// Where money sits ("na conta"); makes "tenho N ..." a balance.
    pub account_context: Vec<String>,
    pub expense_markers: Vec<String>,
    pub period_day: Vec<String>,
    pub period_week: Vec<String>,
    pub period_month: Vec<String>,
    pub expense_placeholder: String,
    pub income_placeholder: String,
    pub debt_placeholder: String,
    pub fallback_threshold: f32,
    pub noise: NoisePhrases,
}

fn owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            version: 1,
            greetings: owned(&[
                "oi", "olá", "bom dia", "boa tarde", "boa noite", "e aí", "eae", "opa", "salve",
            ]),
            help: owned(&["ajuda", "comandos", "menu", "começar", "opções"]),
            show_balance: owned(&[
                "saldo", "qual meu saldo", "ver saldo", "quanto tenho", "meu dinheiro",
                "dinheiro em conta", "grana", "ver a grana", "kd meu dinheiro",
                "quanto de dinheiro eu tenho",
            ]),
            set_balance: owned(&[
                "tenho", "meu saldo é", "saldo atual é", "definir saldo", "atualizar saldo",
                "saldo inicial", "estou com",
            ]),
            summary: owned(&[
                "resumo", "resumo financeiro", "visão geral", "como estou", "minhas finanças",
                "situação financeira", "meu status", "como estão as contas",
            ]),
            delete_last: owned(&[
                "apagar último", "excluir último", "cancelar último", "apaga o último",
                "deleta o último", "foi errado", "lancei errado",
            ]),
            tip: owned(&[
                "dica", "dica financeira", "me dê uma dica", "uma dica", "conselho",
                "como economizar",
            ]),
            show_debts: owned(&[
                "minhas dívidas", "ver dívidas", "quais minhas contas", "o que devo",
                "lista de dívidas",
            ]),
            io_summary: owned(&[
                "entradas e saídas", "entrou e saiu", "balanço", "fluxo de caixa",
                "relatório de transações", "movimentações",
            ]),
            period_report: owned(&[
                "gastos", "o que gastei", "relatório de gastos", "saídas", "minhas despesas",
                "onde gastei", "com o que gastei", "lista de gastos",
            ]),
            pay_debt: owned(&["paguei", "já paguei", "pagamento de", "quitei", "dar baixa"]),
            register_debt: owned(&[
                "dívida", "parcela", "boleto", "fatura", "vencimento", "vence", "conta de",
                "tenho que pagar", "anota uma conta", "registra uma dívida",
            ]),
            installment_words: owned(&["parcela", "prestação", "prestações", "boleto", "fatura"]),
            income: owned(&[
                "recebi", "salário", "ganhei", "depósito", "rendimento", "entrada", "me pagaram",
                "caiu um pix", "pix recebido",
            ]),
            account_context: owned(&[
                "na conta", "em conta", "no banco", "na poupança", "na carteira",
            ]),
            expense_markers: owned(&["gastei", "comprei", "paguei", "custou", "gasto", "torrei"]),
            period_day: owned(&["hoje", "hj"]),
            period_week: owned(&["semana"]),
            period_month: owned(&["mês"]),
            expense_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            income_placeholder: "Entrada".to_string(),
            debt_placeholder: "Conta".to_string(),
            fallback_threshold: 0.45,
            noise: NoisePhrases::default(),
        }
    }
}

impl Vocabulary {
    /// Copy with every rule phrase folded for matching. Placeholders and
    /// description noise keep their accents.
    pub fn folded(&self) -> Vocabulary {
        fn fold_all(phrases: &[String]) -> Vec<String> {
            phrases
                .iter()
                .map(|p| fold(p.trim()))
                .filter(|p| !p.is_empty())
                .collect()
        }
        Vocabulary {
            version: self.version,
            greetings: fold_all(&self.greetings),
            help: fold_all(&self.help),
            show_balance: fold_all(&self.show_balance),
            set_balance: fold_all(&self.set_balance),
            summary: fold_all(&self.summary),
            delete_last: fold_all(&self.delete_last),
            tip: fold_all(&self.tip),
            show_debts: fold_all(&self.show_debts),
            io_summary: fold_all(&self.io_summary),
            period_report: fold_all(&self.period_report),
            pay_debt: fold_all(&self.pay_debt),
            register_debt: fold_all(&self.register_debt),
            installment_words: fold_all(&self.installment_words),
            income: fold_all(&self.income),
            account_context: fold_all(&self.account_context),
            expense_markers: fold_all(&self.expense_markers),
            period_day: fold_all(&self.period_day),
            period_week: fold_all(&self.period_week),
            period_month: fold_all(&self.period_month),
            expense_placeholder: self.expense_placeholder.clone(),
            income_placeholder: self.income_placeholder.clone(),
            debt_placeholder: self.debt_placeholder.clone(),
            fallback_threshold: self.fallback_threshold,
            noise: self.noise.clone(),
        }
    }
}

/// Read-only configuration shared by every interpretation.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    pub vocabulary: Vocabulary,
    pub lexicon: CategoryLexicon,
    /// Trained fallback model; `None` trains one from the built-in corpus.
    pub model_path: Option<PathBuf>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            lexicon: CategoryLexicon::builtin(),
            model_path: None,
        }
    }
}

impl InterpreterConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse an override file. `[vocabulary]` fields left out keep their
    /// defaults; `[[category]]` tables replace the built-in lexicon as a
    /// whole. A lexicon that does not parse is dropped with a warning so
    /// expenses still resolve, under the fallback category.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = content.parse()?;

        let vocabulary = match table.remove("vocabulary") {
            Some(value) => value.try_into::<Vocabulary>()?,
            None => Vocabulary::default(),
        };

        let lexicon = match table.remove("category") {
            Some(value) => {
                let version = table
                    .get("lexicon_version")
                    .and_then(|v| v.as_integer())
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or(0);
                match value.try_into::<Vec<Category>>() {
                    Ok(categories) => CategoryLexicon::new(version, categories),
                    Err(e) => {
                        warn!("ignoring malformed category lexicon, expenses fall back to {FALLBACK_CATEGORY}: {e}");
                        CategoryLexicon::empty()
                    }
                }
            }
            None => CategoryLexicon::builtin(),
        };

        let model_path = table
            .get("model_path")
            .and_then(|v| v.as_str())
            .map(PathBuf::from);

        Ok(Self {
            vocabulary,
            lexicon,
            model_path,
        })
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }
}
