//! Turns informal Portuguese finance chat messages into one structured
//! [`Intent`] each.

pub mod config;
pub mod context;
pub mod intent;
pub mod posting;
pub mod resolver;
pub mod rules;

pub use config::{ConfigError, InterpreterConfig, Vocabulary};
pub use context::{Context, RawMessage};
pub use intent::{Intent, TransactionCandidate};
pub use posting::posting_for;
pub use resolver::{Interpreter, Resolution};
pub use rules::RULE_TABLE_VERSION;
