use regex::Regex;
use serde::{Deserialize, Serialize};
use zapfin_core::Money;

use crate::date::strip_dates;
use crate::text::{capitalize, collapse_whitespace};
use crate::value::find_values;

re!(re_currency_words, r"(?i)r\$|\breais\b|\bconto[s]?\b");

pub const DEFAULT_PLACEHOLDER: &str = "General expense";

/// Command vocabulary removed from descriptions, grouped by what it marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoisePhrases {
    pub expense: Vec<String>,
    pub income: Vec<String>,
    pub debt: Vec<String>,
    pub filler: Vec<String>,
}

impl Default for NoisePhrases {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        NoisePhrases {
            expense: owned(&[
                "no valor de", "gastei", "comprei", "paguei", "custou", "gasto", "foi", "deu",
                "hoje", "hj",
            ]),
            income: owned(&[
                "me pagaram", "recebi", "salário", "salario", "ganhei", "depósito", "deposito",
                "rendimento", "entrada", "caiu",
            ]),
            debt: owned(&[
                "tenho que pagar", "dívida", "divida", "conta", "vence", "vencimento", "apagar",
                "último", "ultimo", "parcela", "boleto", "fatura",
            ]),
            filler: owned(&[
                "pro dia", "com o", "minha", "meu", "tenho", "uma", "um", "duas", "dois", "de", "do", "da", "dos",
                "das", "no", "na", "nos", "nas", "em", "com", "pro", "pra", "para", "que", "o",
                "a", "os", "as", "e",
            ]),
        }
    }
}

/// Turns a transaction clause into a short human description.
///
/// Order matters: the value goes first, then the noise groups, then any
/// leftover date, then whitespace and punctuation.
#[derive(Debug, Clone)]
pub struct DescriptionNormalizer {
    noise: Vec<Regex>,
    placeholder: String,
}

impl Default for DescriptionNormalizer {
    fn default() -> Self {
        Self::new(&NoisePhrases::default())
    }
}

impl DescriptionNormalizer {
    pub fn new(noise: &NoisePhrases) -> Self {
        // Income and debt words also go in their plural or verb forms
        // ("parcelas", "vencem").
        let groups = [
            (&noise.expense, false),
            (&noise.income, true),
            (&noise.debt, true),
            (&noise.filler, false),
        ];
        Self {
            noise: groups
                .into_iter()
                .filter_map(|(g, inflected)| phrase_regex(g, inflected))
                .collect(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn normalize(&self, text: &str, value: Option<Money>) -> String {
        self.normalize_or(text, value, &self.placeholder)
    }

    pub fn normalize_or(&self, text: &str, value: Option<Money>, placeholder: &str) -> String {
        let mut text = match value {
            Some(value) => remove_value(text, value),
            None => text.to_string(),
        };
        text = re_currency_words().replace_all(&text, " ").into_owned();

        for re in &self.noise {
            text = re.replace_all(&text, " ").into_owned();
        }

        let text = collapse_whitespace(&strip_dates(&text));
        let text = text.trim_matches(|c: char| " ,.:;-!?".contains(c));

        if text.is_empty() {
            placeholder.to_string()
        } else {
            capitalize(text)
        }
    }
}

/// Remove every numeric token that renders `value`, whatever its glyphs
/// (`2.900,50`, `2900,50`, `2900.50`, or `2900` for whole values). Tokens
/// that belong to a `D/M` date are left for the date pass.
fn remove_value(text: &str, value: Money) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for token in find_values(text) {
        if token.value != value || touches_slash(text, token.start, token.end) {
            continue;
        }
        out.push_str(&text[cursor..token.start]);
        out.push(' ');
        cursor = token.end;
    }
    out.push_str(&text[cursor..]);
    out
}

fn touches_slash(text: &str, start: usize, end: usize) -> bool {
    text[..start].ends_with('/') || text[end..].starts_with('/')
}

/// One case-insensitive whole-word alternation, longest phrase first so
/// "no valor de" wins over "de".
fn phrase_regex(phrases: &[String], inflected: bool) -> Option<Regex> {
    let mut phrases: Vec<&str> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if phrases.is_empty() {
        return None;
    }
    phrases.sort_by_key(|p| std::cmp::Reverse(p.chars().count()));
    let alternation = phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    let ending = if inflected { "(?:s|m)?" } else { "" };
    Regex::new(&format!(r"(?i)\b(?:{alternation}){ending}\b")).ok()
}
