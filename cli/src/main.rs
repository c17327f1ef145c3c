use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use ferret_core::{
    ArxivTool, DecisionLoop, DecisionStep, ExchangeHandler, GroqProvider, Session, StepKind,
    StepObserver, ToolRegistry, TransportMode, WebSearchTool, WikipediaTool, config,
};
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod onboard;

#[derive(Parser)]
#[command(name = "ferret")]
#[command(about = "ferret - chat agent that searches the web, arXiv, and Wikipedia", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the API key and model
    Onboard,
    /// Chat with the agent
    Chat {
        /// Send one message and exit instead of starting a session
        #[arg(short, long)]
        message: Option<String>,

        /// Answer each message without replaying earlier turns
        #[arg(long)]
        no_history: bool,

        /// Issue the model call on a background task
        #[arg(long)]
        delegated: bool,
    },
}

/// Prints each decision step as it happens.
struct ConsoleObserver;

impl StepObserver for ConsoleObserver {
    fn on_step(&self, step: &DecisionStep) {
        match step.kind {
            StepKind::ToolCall => {
                if let Some(thought) = &step.thought {
                    println!("  {}", style(format!("💭 {}", thought)).dim());
                }
                println!(
                    "  {} {}({})",
                    style("🔎").cyan(),
                    style(step.action.as_deref().unwrap_or("?")).cyan().bold(),
                    step.action_input.as_deref().unwrap_or("")
                );
                if let Some(observation) = &step.observation {
                    println!("  {}", style(format!("↳ {}", observation)).dim());
                }
            }
            StepKind::ParsingError => {
                println!(
                    "  {}",
                    style("! reply did not match the expected format, retrying").yellow()
                );
            }
            StepKind::FinalAnswer => {
                if let Some(thought) = &step.thought {
                    println!("  {}", style(format!("💭 {}", thought)).dim());
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat {
                message: None,
                no_history: false,
                delegated: false,
            }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Chat {
            message,
            no_history,
            delegated,
        } => {
            let mut config = config::load_config()?;
            if no_history {
                config.history = false;
            }
            if delegated {
                config.transport = TransportMode::Delegated;
            }

            // Hard precondition: never start the loop without a credential.
            if let Err(e) = config.require_api_key() {
                eprintln!("❌ {}", e);
                return Err(e.into());
            }

            let mut provider = GroqProvider::new(config.api_key.clone());
            provider = provider.with_model(config.model.clone());
            if let Some(base_url) = config.base_url.clone() {
                provider = provider.with_base_url(base_url);
            }

            let mut registry = ToolRegistry::new();
            registry.register(Arc::new(WebSearchTool::new()));
            registry.register(Arc::new(ArxivTool::new()));
            registry.register(Arc::new(WikipediaTool::new()));

            let decision_loop = DecisionLoop::new(Arc::new(provider), Arc::new(registry))
                .with_max_iterations(config.max_iterations)
                .with_early_stop(config.early_stop)
                .with_temperature(config.temperature);

            let handler = ExchangeHandler::new(Arc::new(decision_loop))
                .with_transport(config.transport)
                .with_history(config.history)
                .with_observer(Arc::new(ConsoleObserver));

            let mut session = Session::new();

            if let Some(msg) = message {
                let reply = handler.send(&mut session, &msg).await;
                println!("{}", reply);
            } else {
                println!("🦡 ferret");
                println!("{}", style(ferret_core::GREETING).bold());
                println!("Type your question (Ctrl+D to exit):\n");

                use std::io::{self, BufRead};
                let stdin = io::stdin();
                let stdout = io::stdout();
                let mut stdout_lock = stdout.lock();

                loop {
                    print!("> ");
                    let _ = stdout_lock.flush();

                    let mut input = String::new();
                    let mut reader = stdin.lock();

                    match reader.read_line(&mut input) {
                        Ok(0) => {
                            println!("\n👋 Goodbye!");
                            break;
                        }
                        Ok(_) => {
                            let input = input.trim();
                            if input.is_empty() {
                                continue;
                            }

                            let reply = handler.send(&mut session, input).await;
                            println!("\n{}\n", reply);
                        }
                        Err(_) => {
                            println!("\n👋 Goodbye!");
                            break;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
