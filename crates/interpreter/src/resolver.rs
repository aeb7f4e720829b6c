use serde::Serialize;
use tracing::{debug, info};
use zapfin_classify::{
    builtin_corpus, CategoryLexicon, IntentClassifier, NullClassifier, RecordMatcher,
    TfidfClassifier, TrainingOptions,
};
use zapfin_core::StoredRecord;
use zapfin_parse::{fold, segment, DescriptionNormalizer};

use crate::config::{ConfigError, InterpreterConfig, Vocabulary};
use crate::context::{Context, RawMessage};
use crate::intent::{Intent, TransactionCandidate};
use crate::rules::{contains_inflected, contains_phrase, Scope, RULES};

/// Which rule decided a message, and how sure it was.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub intent: Intent,
    pub rule: &'static str,
    pub confidence: f32,
}

/// Turns chat messages into intents. Holds only read-only state, so one
/// instance can serve every account from any thread.
pub struct Interpreter {
    vocabulary: Vocabulary,
    lexicon: CategoryLexicon,
    normalizer: DescriptionNormalizer,
    matcher: RecordMatcher,
    classifier: Box<dyn IntentClassifier>,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig, classifier: Box<dyn IntentClassifier>) -> Self {
        let normalizer = DescriptionNormalizer::new(&config.vocabulary.noise)
            .with_placeholder(&config.vocabulary.expense_placeholder);
        Interpreter {
            vocabulary: config.vocabulary.folded(),
            lexicon: config.lexicon,
            normalizer,
            matcher: RecordMatcher::default(),
            classifier,
        }
    }

    /// Rules only; messages no rule claims are unrecognized.
    pub fn rule_based(config: InterpreterConfig) -> Self {
        Self::new(config, Box::new(NullClassifier))
    }

    /// Loads the configured fallback model, or trains one from the built-in
    /// corpus when none is configured.
    pub fn load(config: InterpreterConfig) -> Result<Self, ConfigError> {
        let classifier = match &config.model_path {
            Some(path) => TfidfClassifier::load(path)?,
            None => {
                info!("no fallback model configured, training from built-in corpus");
                TfidfClassifier::train(&builtin_corpus(), TrainingOptions::default())?
            }
        };
        Ok(Self::new(config, Box::new(classifier)))
    }

    pub fn with_matcher(mut self, matcher: RecordMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn interpret(&self, text: &str, ctx: &Context) -> Intent {
        self.explain(text, ctx).intent
    }

    pub fn interpret_message(
        &self,
        message: &RawMessage,
        debts: &[StoredRecord],
        expenses: &[StoredRecord],
    ) -> Intent {
        let ctx = Context::new(&message.sender_id, message.received_at)
            .with_debts(debts)
            .with_expenses(expenses);
        self.interpret(&message.text, &ctx)
    }

    pub fn explain(&self, text: &str, ctx: &Context) -> Resolution {
        let text = text.trim();
        let scope = Scope::new(self, text, ctx);

        for rule in RULES {
            if !(rule.trigger)(&scope) || !(rule.guard)(&scope) {
                continue;
            }
            match (rule.build)(&scope) {
                Some((intent, confidence)) => {
                    debug!(
                        account = %ctx.account_id,
                        rule = rule.name,
                        intent = intent.name(),
                        confidence,
                        "resolved message"
                    );
                    return Resolution {
                        intent,
                        rule: rule.name,
                        confidence,
                    };
                }
                None => debug!(rule = rule.name, "rule matched but built nothing"),
            }
        }

        Resolution {
            intent: Intent::Unrecognized,
            rule: "unrecognized",
            confidence: 0.0,
        }
    }

    /// One candidate per clause carrying exactly one value, in message order.
    /// Clauses that only announce money coming in ("recebi 50") are skipped.
    pub fn extract_transactions(&self, text: &str) -> Vec<TransactionCandidate> {
        segment(text)
            .into_iter()
            .filter(|clause| {
                let incoming = self.is_income_clause(&clause.context);
                if incoming {
                    debug!(clause = %clause.context, "skipping income clause");
                }
                !incoming
            })
            .map(|clause| {
                let description = self.normalizer.normalize(&clause.context, Some(clause.value));
                let category = self.lexicon.infer(&description).to_string();
                TransactionCandidate {
                    value: clause.value,
                    context: clause.context,
                    description,
                    category,
                }
            })
            .collect()
    }

    fn is_income_clause(&self, clause: &str) -> bool {
        let folded = fold(clause);
        self.vocabulary.income.iter().any(|p| contains_inflected(&folded, p))
            && !self
                .vocabulary
                .expense_markers
                .iter()
                .any(|p| contains_phrase(&folded, p))
    }

    pub fn infer_category(&self, description: &str) -> &str {
        self.lexicon.infer(description)
    }

    pub(crate) fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub(crate) fn normalizer(&self) -> &DescriptionNormalizer {
        &self.normalizer
    }

    pub(crate) fn matcher(&self) -> &RecordMatcher {
        &self.matcher
    }

    pub(crate) fn classifier(&self) -> &dyn IntentClassifier {
        self.classifier.as_ref()
    }
}
