use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Password, Select};
use ferret_core::config::{self, Config};

const BANNER: &str = r"
    -------------------------------------
              f e r r e t
       web * arxiv * wikipedia
    -------------------------------------
";

const MODELS: &[&str] = &[
    "llama3-8b-8192",
    "llama3-70b-8192",
    "mixtral-8x7b-32768",
    "gemma2-9b-it",
];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_api_key() -> Result<String> {
    let api_key = Password::new()
        .with_prompt("Enter your Groq API key")
        .interact()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow::anyhow!("API key cannot be empty"));
    }

    Ok(api_key)
}

fn setup_model() -> Result<String> {
    let selection = Select::new()
        .with_prompt("Select your model")
        .items(MODELS)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(MODELS[selection].to_string())
}

fn setup_history() -> Result<bool> {
    Confirm::new()
        .with_prompt("Replay previous turns as context for each answer?")
        .default(true)
        .interact()
        .context("Failed to read history preference")
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to ferret!").white().bold());
    println!(
        "  {}",
        style("This wizard will configure your chat agent in under 30 seconds.").dim()
    );
    println!();

    print_step(1, 3, "API Key");
    let api_key = setup_api_key()?;

    print_step(2, 3, "Model");
    let model = setup_model()?;

    print_step(3, 3, "Conversation Memory");
    let history = setup_history()?;

    let config = Config {
        api_key,
        model,
        history,
        ..Default::default()
    };

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(config::get_config_path().display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("ferret chat").cyan().bold()
    );
    println!();

    Ok(config)
}
