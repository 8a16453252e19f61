//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};

/// A credential the setup walks through.
struct Credential {
    name: &'static str,
    purpose: &'static str,
    example: &'static str,
}

const CREDENTIALS: &[Credential] = &[
    Credential {
        name: "OPENAI_API_KEY",
        purpose: "embeddings and answer generation",
        example: "export OPENAI_API_KEY='sk-...'",
    },
    Credential {
        name: "SUPABASE_URL",
        purpose: "the similarity-search index",
        example: "export SUPABASE_URL='https://<project>.supabase.co'",
    },
    Credential {
        name: "SUPABASE_SERVICE_ROLE_KEY",
        purpose: "the similarity-search index (server-side key)",
        example: "export SUPABASE_SERVICE_ROLE_KEY='...'",
    },
];

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("ClipNest Setup");
    println!();
    println!("Welcome to ClipNest! Let's make sure everything is configured correctly.\n");

    // Step 1: Check credentials
    println!("{}", style("Step 1: Checking credentials").bold().cyan());
    println!();

    let missing: Vec<&Credential> = CREDENTIALS
        .iter()
        .filter(|c| std::env::var(c.name).map(|v| v.is_empty()).unwrap_or(true))
        .collect();

    if missing.is_empty() {
        Output::success("All credentials are configured!");
    } else {
        Output::warning("Some credentials are missing:");
        println!();
        for credential in &missing {
            println!(
                "  {} {} - needed for {}",
                style("✗").red(),
                style(credential.name).bold(),
                credential.purpose
            );
            println!("    {} {}", style("→").dim(), style(credential.example).dim());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Set the missing credentials and run 'clipnest init' again.");
            return Ok(());
        }
    }

    println!();

    // Step 2: Create config file
    println!("{}", style("Step 2: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("clipnest config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    // Summary
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("clipnest doctor").cyan());
    println!("  {} Ask a one-shot question", style("clipnest ask \"<question>\"").cyan());
    println!("  {} Start the relay server", style("clipnest serve").cyan());
    println!("  {} Chat against a running relay", style("clipnest chat").cyan());
    println!();
    println!("For more help: {}", style("clipnest --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}
