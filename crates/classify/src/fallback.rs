//! Statistical fallback for messages no rule understood.
//!
//! [`TfidfClassifier`] is a TF-IDF vectorizer (smooth idf, L2-normalized
//! rows, tokens of two or more word characters) feeding a multinomial
//! logistic regression. Training is plain batch gradient descent from zero
//! weights, so the same corpus always yields the same model.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use zapfin_parse::{fold, re};

use crate::corpus::LabeledPhrase;

const MODEL_FORMAT_VERSION: u32 = 1;

re!(token_regex, r"\w\w+");

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot train on an empty corpus")]
    EmptyCorpus,
    #[error("Unsupported model format version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackLabel {
    Greeting,
    ShowBalance,
    ShowDebts,
    Tip,
    ShowBudget,
}

impl FallbackLabel {
    pub const ALL: [FallbackLabel; 5] = [
        FallbackLabel::Greeting,
        FallbackLabel::ShowBalance,
        FallbackLabel::ShowDebts,
        FallbackLabel::Tip,
        FallbackLabel::ShowBudget,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: FallbackLabel,
    pub confidence: f32,
}

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Prediction;
}

/// Never confident; use when no model is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClassifier;

impl IntentClassifier for NullClassifier {
    fn classify(&self, _text: &str) -> Prediction {
        Prediction {
            label: FallbackLabel::Greeting,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            learning_rate: 2.0,
            epochs: 400,
            l2: 1e-4,
        }
    }
}

type SparseRow = Vec<(usize, f64)>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfClassifier {
    version: u32,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    labels: Vec<FallbackLabel>,
    /// One row of feature weights per label.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

impl TfidfClassifier {
    pub fn train(corpus: &[LabeledPhrase], options: TrainingOptions) -> Result<Self, FallbackError> {
        if corpus.is_empty() {
            return Err(FallbackError::EmptyCorpus);
        }

        let documents: Vec<Vec<String>> = corpus.iter().map(|p| tokenize(&p.text)).collect();

        let terms: BTreeSet<&str> = documents.iter().flatten().map(String::as_str).collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for doc in &documents {
            let unique: BTreeSet<usize> = doc.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
            for i in unique {
                document_frequency[i] += 1;
            }
        }
        let n = documents.len() as f64;
        let idf: Vec<f64> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let labels: Vec<FallbackLabel> = corpus
            .iter()
            .map(|p| p.label)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut model = TfidfClassifier {
            version: MODEL_FORMAT_VERSION,
            weights: vec![vec![0.0; vocabulary.len()]; labels.len()],
            bias: vec![0.0; labels.len()],
            vocabulary,
            idf,
            labels,
        };

        let rows: Vec<SparseRow> = documents.iter().map(|doc| model.vectorize_tokens(doc)).collect();
        let targets: Vec<usize> = corpus
            .iter()
            .filter_map(|p| model.labels.iter().position(|l| *l == p.label))
            .collect();

        model.fit(&rows, &targets, options);
        info!(
            samples = corpus.len(),
            features = model.vocabulary.len(),
            classes = model.labels.len(),
            "trained fallback classifier"
        );
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, FallbackError> {
        let content = fs::read_to_string(path)?;
        let model: TfidfClassifier = serde_json::from_str(&content)?;
        if model.version != MODEL_FORMAT_VERSION {
            return Err(FallbackError::UnsupportedVersion(model.version));
        }
        info!(path = %path.display(), features = model.vocabulary.len(), "loaded fallback classifier");
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<(), FallbackError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn labels(&self) -> &[FallbackLabel] {
        &self.labels
    }

    /// Class probabilities in [`Self::labels`] order, or `None` when the text
    /// has no known token.
    pub fn probabilities(&self, text: &str) -> Option<Vec<f64>> {
        let row = self.vectorize_tokens(&tokenize(text));
        if row.is_empty() {
            return None;
        }
        Some(self.softmax(&row))
    }

    fn fit(&mut self, rows: &[SparseRow], targets: &[usize], options: TrainingOptions) {
        let classes = self.labels.len();
        let n = rows.len() as f64;

        for _ in 0..options.epochs {
            let mut grad_w = vec![vec![0.0; self.vocabulary.len()]; classes];
            let mut grad_b = vec![0.0; classes];

            for (row, &target) in rows.iter().zip(targets) {
                let probs = self.softmax(row);
                for (k, p) in probs.iter().enumerate() {
                    let err = p - if k == target { 1.0 } else { 0.0 };
                    grad_b[k] += err;
                    for &(j, x) in row {
                        grad_w[k][j] += err * x;
                    }
                }
            }

            for k in 0..classes {
                for (w, g) in self.weights[k].iter_mut().zip(&grad_w[k]) {
                    *w -= options.learning_rate * (g / n + options.l2 * *w);
                }
                self.bias[k] -= options.learning_rate * grad_b[k] / n;
            }
        }
    }

    fn softmax(&self, row: &SparseRow) -> Vec<f64> {
        let scores: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| b + row.iter().map(|&(j, x)| w[j] * x).sum::<f64>())
            .collect();
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }

    fn vectorize_tokens(&self, tokens: &[String]) -> SparseRow {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&i) = self.vocabulary.get(token) {
                *counts.entry(i).or_default() += 1.0;
            }
        }
        let mut row: SparseRow = counts
            .into_iter()
            .map(|(i, tf)| (i, tf * self.idf[i]))
            .collect();
        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut row {
                *v /= norm;
            }
        }
        row
    }
}

impl IntentClassifier for TfidfClassifier {
    fn classify(&self, text: &str) -> Prediction {
        let best = self.probabilities(text).and_then(|probs| {
            probs
                .into_iter()
                .zip(&self.labels)
                .max_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(p, label)| Prediction {
                    label: *label,
                    confidence: p as f32,
                })
        });
        best.unwrap_or(Prediction {
            label: self.labels.first().copied().unwrap_or(FallbackLabel::Greeting),
            confidence: 0.0,
        })
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let folded = fold(text);
    token_regex()
        .find_iter(&folded)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::corpus::builtin_corpus;

    fn trained() -> &'static TfidfClassifier {
        static MODEL: OnceLock<TfidfClassifier> = OnceLock::new();
        MODEL.get_or_init(|| {
            TfidfClassifier::train(&builtin_corpus(), TrainingOptions::default()).unwrap()
        })
    }

    fn phrase(text: &str, label: FallbackLabel) -> LabeledPhrase {
        LabeledPhrase {
            text: text.to_string(),
            label,
        }
    }

    #[test]
    fn tokenizer_drops_single_chars_and_folds() {
        assert_eq!(tokenize("Qual é o meu SALDO?"), vec!["qual", "meu", "saldo"]);
        assert!(tokenize("👋 a").is_empty());
    }

    #[test]
    fn learns_builtin_labels() {
        let model = trained();
        let cases = [
            ("bom dia bot", FallbackLabel::Greeting),
            ("minhas dividas", FallbackLabel::ShowDebts),
            ("quanto dinheiro eu tenho", FallbackLabel::ShowBalance),
            ("dica do dia", FallbackLabel::Tip),
            ("meu orçamento", FallbackLabel::ShowBudget),
        ];
        for (text, label) in cases {
            let p = model.classify(text);
            assert_eq!(p.label, label, "{text}");
            assert!(p.confidence >= 0.45, "{text}: {}", p.confidence);
        }
    }

    #[test]
    fn unknown_tokens_have_zero_confidence() {
        assert_eq!(trained().classify("xyzzy plugh").confidence, 0.0);
        assert_eq!(trained().classify("").confidence, 0.0);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let probs = trained().probabilities("ver saldo").unwrap();
        assert_eq!(probs.len(), trained().labels().len());
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn training_is_deterministic() {
        let corpus = vec![
            phrase("ver saldo", FallbackLabel::ShowBalance),
            phrase("minhas dividas", FallbackLabel::ShowDebts),
        ];
        let options = TrainingOptions {
            epochs: 50,
            ..TrainingOptions::default()
        };
        let a = TfidfClassifier::train(&corpus, options).unwrap();
        let b = TfidfClassifier::train(&corpus, options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(matches!(
            TfidfClassifier::train(&[], TrainingOptions::default()),
            Err(FallbackError::EmptyCorpus)
        ));
    }

    #[test]
    fn save_and_load_reproduce_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intent-model.json");
        trained().save(&path).unwrap();

        let loaded = TfidfClassifier::load(&path).unwrap();
        for text in ["meu saldo", "tem boleto?", "manda uma dica", "oi zap", "orcamento"] {
            let (a, b) = (loaded.classify(text), trained().classify(text));
            assert_eq!(a.label, b.label, "{text}");
            assert!((a.confidence - b.confidence).abs() < 1e-6, "{text}");
        }
    }

    #[test]
    fn load_rejects_garbage_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        assert!(matches!(TfidfClassifier::load(&path), Err(FallbackError::Io(_))));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(TfidfClassifier::load(&path), Err(FallbackError::Json(_))));
    }

    #[test]
    fn null_classifier_is_never_confident() {
        assert_eq!(NullClassifier.classify("saldo").confidence, 0.0);
    }
}
