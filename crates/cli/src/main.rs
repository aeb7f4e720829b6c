mod reply;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;
use zapfin_classify::{builtin_corpus, TfidfClassifier, TrainingOptions};
use zapfin_core::AccountId;
use zapfin_interpreter::{Context, Interpreter, InterpreterConfig, RawMessage, RULE_TABLE_VERSION};

use crate::session::{parse_script, replay, LedgerBook};

/// Chat-driven personal finance assistant.
#[derive(Parser)]
#[command(name = "zapfin", version, about = "Turn informal finance chat messages into ledger actions")]
struct Cli {
    /// TOML file overriding the built-in vocabulary and category lexicon
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Trained fallback model (JSON); trained from the built-in corpus if omitted
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Skip the statistical fallback entirely
    #[arg(long, global = true)]
    rules_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the assistant on stdin, one message per line
    Chat {
        /// Account the messages belong to
        #[arg(long, default_value = "local")]
        account: String,
    },

    /// Replay a script of `account|message` lines, accounts in parallel
    Replay {
        /// Path to the script file
        file: PathBuf,
    },

    /// Print how a message would be interpreted, as JSON
    Explain {
        /// The message text
        text: String,
        #[arg(long, default_value = "local")]
        account: String,
    },

    /// Train the fallback model on the built-in corpus and write it to disk
    Train {
        /// Output path for the model JSON
        output: PathBuf,
    },
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn build_interpreter(cli: &Cli) -> anyhow::Result<Interpreter> {
    let mut config = match &cli.config {
        Some(path) => InterpreterConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => InterpreterConfig::default(),
    };
    if let Some(model) = &cli.model {
        config = config.with_model_path(model);
    }

    info!(
        rules = RULE_TABLE_VERSION,
        vocabulary = config.vocabulary.version,
        lexicon = config.lexicon.version(),
        "starting interpreter"
    );

    if cli.rules_only {
        Ok(Interpreter::rule_based(config))
    } else {
        Interpreter::load(config).context("loading fallback model")
    }
}

async fn chat(interpreter: Interpreter, account: AccountId) -> anyhow::Result<()> {
    let book = LedgerBook::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let message = RawMessage::new(text, account.clone(), now());
        let exchange = book.handle(&interpreter, &message).await;
        println!("{}\n", exchange.reply);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Chat { account } => {
            let interpreter = build_interpreter(&cli)?;
            chat(interpreter, AccountId::new(account.as_str())).await?;
        }
        Commands::Replay { file } => {
            let interpreter = Arc::new(build_interpreter(&cli)?);
            let script = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let messages = parse_script(&script, now())?;
            let book = Arc::new(LedgerBook::new());

            let transcripts = replay(interpreter, Arc::clone(&book), messages).await?;
            for (account, transcript) in &transcripts {
                println!("== {account} ==");
                for exchange in transcript {
                    println!("> {}\n{}\n", exchange.text, exchange.reply);
                }
                println!("Saldo final: {}\n", book.balance(account).await);
            }
        }
        Commands::Explain { text, account } => {
            let interpreter = build_interpreter(&cli)?;
            let account = AccountId::new(account.as_str());
            let resolution = interpreter.explain(text, &Context::new(&account, now()));
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Commands::Train { output } => {
            let model = TfidfClassifier::train(&builtin_corpus(), TrainingOptions::default())?;
            model
                .save(output)
                .with_context(|| format!("writing model to {}", output.display()))?;
            info!(path = %output.display(), "fallback model written");
        }
    }

    Ok(())
}
