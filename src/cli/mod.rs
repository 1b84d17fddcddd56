pub mod commands;

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::cli::commands::Commands;
use crate::llm::{models::Message, ChatService};

pub async fn run_cli(command: Commands, service: ChatService) -> Result<()> {
    match command {
        Commands::Serve => bail!("serve is handled by the HTTP entrypoint"),
        Commands::Ping => {
            if service.test_connection().await {
                println!("healthy");
                Ok(())
            } else {
                bail!("unhealthy: {} did not answer the probe", service.provider_name())
            }
        }
        Commands::Chat => run_repl(&service).await,
    }
}

/// What the REPL should do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Skip,
    Quit,
    Clear,
    Send(&'a str),
}

fn parse_input(line: &str) -> ReplInput<'_> {
    let text = line.trim();
    match text {
        "" => ReplInput::Skip,
        "/exit" | "/quit" => ReplInput::Quit,
        "/clear" => ReplInput::Clear,
        _ => ReplInput::Send(text),
    }
}

async fn run_repl(service: &ChatService) -> Result<()> {
    let mut history: Vec<Message> = Vec::new();
    let stdin = io::stdin();

    println!("--- Terminal Chat ({}) ---", service.settings().model);
    println!("Type /clear to start over, /exit to quit.");
    println!("---------------------------");

    loop {
        print!("\nUser> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input).context("failed to read stdin")? == 0 {
            break;
        }

        let text = match parse_input(&input) {
            ReplInput::Skip => continue,
            ReplInput::Quit => break,
            ReplInput::Clear => {
                history.clear();
                println!("Conversation cleared.");
                continue;
            }
            ReplInput::Send(text) => text,
        };

        match service.send_message(text, &history).await {
            Ok(response) => {
                println!("Assistant> {}", response.message.content);
                if let Some(usage) = response.usage {
                    println!("[{} in / {} out tokens]", usage.input_tokens, usage.output_tokens);
                }
                history.push(Message::user(text));
                history.push(response.message);
            }
            // The failed user turn is not kept in the history.
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}
