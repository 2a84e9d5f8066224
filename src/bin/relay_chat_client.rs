//! Relay Chat Client - Entry Point
//!
//! Reads prompt lines from stdin and prints chat and status lines to stdout.
//! Diagnostics go to stderr so they never interleave with the chat log.

use std::env;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use relay_chat::{ChatClient, Flow, Severity};

/// Print one log line with a severity tag
fn print_line(text: &str, severity: Severity) {
    let tag = match severity {
        Severity::Regular => "",
        Severity::Info => "[info] ",
        Severity::Error => "[error] ",
    };

    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{}{}", tag, text.trim_end_matches(['\r', '\n']));
    let _ = stdout.flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relay_chat=warn")),
        )
        .init();

    let mut client = ChatClient::new(print_line);
    print_line("Relay Chat - type /help for commands", Severity::Info);

    // Optional server address to connect to right away
    if let Some(address) = env::args().nth(1) {
        client.handle_input(&format!("/connect {}", address)).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if client.handle_input(&line).await == Flow::Quit {
            break;
        }
    }

    if client.is_connected() {
        debug!("Closing connection before exit");
        client.disconnect().await?;
    }

    Ok(())
}
