//! Interactive chat session against a running relay.

use crate::cli::Output;
use crate::client::{ChatClient, Conversation, FAILURE_MESSAGE};
use crate::error::Result;
use console::{style, Term};
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(url: &str) -> Result<()> {
    let client = ChatClient::new(url);
    let mut conversation = Conversation::new();

    println!("\n{}", style("ClipNest Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask anything about video content. Type 'exit' to quit, 'clear' to reset.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let term = Term::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break; // EOF
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            conversation = Conversation::new();
            Output::info("Conversation cleared.");
            continue;
        }

        let Some(message) = conversation.begin_turn(input) else {
            continue;
        };

        print!("\n{} ", style("ClipNest:").cyan().bold());
        stdout.flush()?;

        let token_before = conversation.previous_response_id().map(str::to_string);
        let completed = client
            .send_turn(&mut conversation, &message, |delta| {
                print!("{}", delta);
                let _ = io::stdout().flush();
            })
            .await;

        if completed {
            // The continuation marker streamed onto its own line; wipe it
            // now that the token has been extracted.
            let token_after = conversation.previous_response_id().map(str::to_string);
            if token_after != token_before {
                term.clear_line()?;
            }
            println!("\n");
        } else {
            println!("{}\n", style(FAILURE_MESSAGE).red());
        }
    }

    Ok(())
}
