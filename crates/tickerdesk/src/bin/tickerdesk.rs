//! tickerdesk CLI
//!
//! Ask stock questions in natural language, or call a capability directly.
//!
//! # Usage
//!
//! ```bash
//! export ALPHA_VANTAGE_API_KEY="..."
//! export GEMINI_API_KEY="..."        # or TICKERDESK_LLM=anthropic + ANTHROPIC_API_KEY
//!
//! cargo run --bin tickerdesk                          # interactive chat
//! cargo run --bin tickerdesk -- ask "how is tesla doing this week?"
//! cargo run --bin tickerdesk -- change AAPL --days 30 --json
//! cargo run --bin tickerdesk -- config
//! ```

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tickerdesk::agents::{MAX_HISTORY_SIZE, provider_from_config, runtime_config};
use tickerdesk::render::{Render, render_envelope};
use tickerdesk::{
    AlphaVantageClient, CapabilitySet, Conversation, CoordinatorAgent, DelegationMode,
    DeskConfig, Envelope, LlmBackend,
};
use tickerdesk_runtime::{AgentRuntime, ExecutorEventHandler};
use tickerdesk_utils::{LogFormat, init_tracing_with, logging::DEFAULT_DIRECTIVE};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tickerdesk")]
#[command(about = "Conversational stock desk over Alpha Vantage", long_about = None)]
struct Args {
    /// Log output format
    #[arg(long, global = true, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// How the coordinator reaches the capabilities (overrides TICKERDESK_DELEGATION)
    #[arg(long, global = true, value_enum)]
    delegation: Option<DelegationMode>,

    /// Model provider (overrides TICKERDESK_LLM)
    #[arg(long, global = true, value_enum)]
    llm: Option<LlmBackend>,

    /// Model name (overrides TICKERDESK_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Print tool activity on stderr
    #[arg(long, global = true)]
    verbose_tools: bool,

    /// User turns the chat session keeps as context
    #[arg(long, default_value_t = MAX_HISTORY_SIZE)]
    history: usize,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session (default)
    Chat,
    /// Print the effective configuration as JSON (API key omitted)
    Config,
    /// Ask one question and exit
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Resolve a company name or keyword to a ticker
    Ticker {
        #[arg(required = true, num_args = 1..)]
        keyword: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Latest price for a ticker
    Price {
        ticker: String,
        #[arg(long)]
        json: bool,
    },
    /// Closing price change over N trading days
    Change {
        ticker: String,
        #[arg(short, long)]
        days: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Latest news with sentiment
    News {
        ticker: String,
        #[arg(long)]
        json: bool,
    },
    /// News and price change together
    Analyze {
        ticker: String,
        #[arg(short, long)]
        days: Option<i64>,
        #[arg(long)]
        json: bool,
    },
}

/// Prints tool calls as they happen
struct StderrToolEvents;

#[async_trait]
impl ExecutorEventHandler for StderrToolEvents {
    async fn on_tool_start(&self, _id: &str, name: &str, input: &Value) {
        eprintln!("  -> {name} {input}");
    }

    async fn on_tool_done(
        &self,
        _id: &str,
        name: &str,
        result: Result<&Value, &str>,
        duration_ms: u64,
    ) {
        let status = match result {
            Ok(value) => value
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("ok")
                .to_string(),
            Err(e) => e.to_string(),
        };
        eprintln!("  <- {name} [{status}] {duration_ms}ms");
    }
}

fn print_help() {
    println!(
        r"Ask anything about listed stocks, for example:
  what is the current price of tesla stock?
  how has apple moved over the last 30 days?
  why did nvidia move this week?

Commands:
  /help   show this help
  /clear  start a new conversation
  /exit   quit"
    );
}

fn print_result<T: Serialize + Render>(envelope: &Envelope<T>, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(envelope)?);
    } else {
        println!("{}", render_envelope(envelope));
    }
    Ok(())
}

fn coordinator(
    config: &DeskConfig,
    capabilities: &CapabilitySet,
    verbose_tools: bool,
) -> anyhow::Result<CoordinatorAgent> {
    let provider = provider_from_config(config).context("failed to create LLM provider")?;
    let mut runtime = AgentRuntime::new(provider, runtime_config(config));
    if verbose_tools {
        runtime = runtime.with_event_handler(Arc::new(StderrToolEvents));
    }
    Ok(CoordinatorAgent::new(&runtime, capabilities, config.delegation))
}

async fn chat(desk: &CoordinatorAgent, history: usize) -> anyhow::Result<()> {
    println!("tickerdesk ({} mode). Type /help for help.\n", desk.mode());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut conversation = Conversation::with_max_history(history);

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        match input {
            "" => continue,
            "/exit" | "/quit" => {
                println!("Goodbye!");
                break;
            }
            "/help" => print_help(),
            "/clear" => {
                conversation.clear();
                println!("Conversation cleared.");
            }
            question => match desk.respond(&mut conversation, question).await {
                Ok(reply) => println!("{reply}\n"),
                Err(e) => eprintln!("Error: {e}\n"),
            },
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let args = Args::parse();
    init_tracing_with(args.log_format, DEFAULT_DIRECTIVE);

    let mut builder = DeskConfig::builder()
        .with_env()
        .context("invalid environment configuration")?;
    if let Some(mode) = args.delegation {
        builder = builder.delegation(mode);
    }
    if let Some(backend) = args.llm {
        builder = builder.llm_backend(backend);
    }
    if let Some(model) = args.model {
        builder = builder.model(model);
    }
    let config = builder.build().context("invalid configuration")?;
    info!(?config, "Starting tickerdesk");

    let command = args.command.unwrap_or(Command::Chat);
    if matches!(command, Command::Config) {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let source = Arc::new(AlphaVantageClient::from_config(&config)?);
    let capabilities = CapabilitySet::new(source, &config);

    match command {
        Command::Config => {}
        Command::Chat => {
            let desk = coordinator(&config, &capabilities, args.verbose_tools)?;
            chat(&desk, args.history).await?;
        }
        Command::Ask { question } => {
            let desk = coordinator(&config, &capabilities, args.verbose_tools)?;
            let reply = desk
                .respond(&mut Conversation::new(), question.join(" "))
                .await?;
            println!("{reply}");
        }
        Command::Ticker { keyword, json } => {
            print_result(&capabilities.resolver.resolve(&keyword.join(" ")).await, json)?;
        }
        Command::Price { ticker, json } => {
            print_result(&capabilities.price.quote(&ticker).await, json)?;
        }
        Command::Change { ticker, days, json } => {
            let days = days.unwrap_or(config.default_days);
            print_result(&capabilities.price_change.change(&ticker, days).await, json)?;
        }
        Command::News { ticker, json } => {
            print_result(&capabilities.news.lookup(&ticker).await, json)?;
        }
        Command::Analyze { ticker, days, json } => {
            let days = days.unwrap_or(config.default_days);
            print_result(&capabilities.analysis.analyze(&ticker, days).await, json)?;
        }
    }

    Ok(())
}
