//! Prompt command definitions
//!
//! A prompt line starting with `/` is a command (`/name argument`);
//! anything else is chat text.

use crate::error::CommandError;

/// Parsed prompt line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Plain chat text
    Text(String),
    /// `/name argument`, argument empty when absent
    Command { name: String, argument: String },
}

/// Split a prompt line into chat text or a command
pub fn parse_input(line: &str) -> Input {
    let Some(rest) = line.strip_prefix('/') else {
        return Input::Text(line.to_string());
    };

    match rest.split_once(' ') {
        Some((name, argument)) => Input::Command {
            name: name.to_string(),
            argument: argument.to_string(),
        },
        None => Input::Command {
            name: rest.to_string(),
            argument: String::new(),
        },
    }
}

/// Help entry for one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub signature: &'static str,
}

/// Every command the prompt understands
pub static COMMANDS: [CommandInfo; 4] = [
    CommandInfo {
        name: "connect",
        description: "Connect to a server by <ip>",
        signature: "/connect <ip>",
    },
    CommandInfo {
        name: "disconnect",
        description: "Disconnect from the server",
        signature: "/disconnect",
    },
    CommandInfo {
        name: "quit",
        description: "Close the chat",
        signature: "/quit",
    },
    CommandInfo {
        name: "help",
        description: "List available commands",
        signature: "/help",
    },
];

/// Look up a command's help entry by name
pub fn find_command(name: &str) -> Option<&'static CommandInfo> {
    COMMANDS.iter().find(|command| command.name == name)
}

/// Validated prompt command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect { address: String },
    Disconnect,
    Quit,
    Help,
}

impl Command {
    /// Build a command from its name and raw argument
    pub fn parse(name: &str, argument: &str) -> Result<Self, CommandError> {
        let info =
            find_command(name).ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        match info.name {
            "connect" => {
                let address = argument.trim();
                if address.is_empty() {
                    return Err(CommandError::MissingArgument {
                        usage: info.signature,
                    });
                }
                Ok(Command::Connect {
                    address: address.to_string(),
                })
            }
            "disconnect" => Ok(Command::Disconnect),
            "quit" => Ok(Command::Quit),
            _ => Ok(Command::Help),
        }
    }
}
