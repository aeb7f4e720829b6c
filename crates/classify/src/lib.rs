pub mod category;
pub mod corpus;
pub mod fallback;
pub mod matcher;
pub(crate) mod util;

pub use category::{Category, CategoryLexicon, LexiconError, FALLBACK_CATEGORY};
pub use corpus::{builtin_corpus, LabeledPhrase};
pub use fallback::{
    FallbackError, FallbackLabel, IntentClassifier, NullClassifier, Prediction, TfidfClassifier,
    TrainingOptions,
};
pub use matcher::{Contains, Fuzzy, MatchStrategy, RecordMatch, RecordMatcher};
