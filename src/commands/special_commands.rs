//! Special commands parser for interactive chat
//!
//! Lines prefixed with `/` manage sessions instead of being sent to the
//! reply webhook. Command names are case-insensitive; arguments (session
//! ids, titles) keep their case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new session and select it
    NewSession,

    /// List sessions with their previews
    ListSessions,

    /// Select a session by id
    Select(String),

    /// Rename a session
    Rename { id: String, title: String },

    /// Delete a session
    Delete(String),

    /// Delete every session of the current user
    ClearAll,

    /// Print the transcript of the selected session
    Show,

    /// End the backend session and leave the chat
    Logout,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a message
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use hookchat::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/rename 1700000000000 Trip plans").unwrap();
/// assert_eq!(
///     cmd,
///     SpecialCommand::Rename {
///         id: "1700000000000".to_string(),
///         title: "Trip plans".to_string(),
///     }
/// );
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    match name.as_str() {
        "/new" => Ok(SpecialCommand::NewSession),
        "/list" | "/ls" => Ok(SpecialCommand::ListSessions),
        "/show" | "/history" => Ok(SpecialCommand::Show),
        "/clear" => Ok(SpecialCommand::ClearAll),
        "/logout" => Ok(SpecialCommand::Logout),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        "/select" => required(rest, "/select", "/select <session_id>")
            .map(|id| SpecialCommand::Select(id.to_string())),

        "/delete" | "/rm" => required(rest, "/delete", "/delete <session_id>")
            .map(|id| SpecialCommand::Delete(id.to_string())),

        "/rename" => {
            let usage = "/rename <session_id> <title>";
            let args = required(rest, "/rename", usage)?;
            match args.split_once(char::is_whitespace) {
                Some((id, title)) if !title.trim().is_empty() => Ok(SpecialCommand::Rename {
                    id: id.to_string(),
                    title: title.trim().to_string(),
                }),
                _ => Err(CommandError::MissingArgument {
                    command: "/rename".to_string(),
                    usage: usage.to_string(),
                }),
            }
        }

        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn required<'a>(rest: &'a str, command: &str, usage: &str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest)
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

SESSIONS:
  /new                     - Start a new session
  /list                    - List sessions (selected one is marked)
  /select <id>             - Switch to a session
  /rename <id> <title>     - Rename a session
  /delete <id>             - Delete a session
  /clear                   - Delete every session and start fresh
  /show                    - Print the selected session's messages

ACCOUNT:
  /logout                  - Log out and leave the chat

OTHER:
  /help                    - Show this help
  /exit                    - Leave the chat (also: /quit, Ctrl-D)

Anything else is sent as a message in the selected session.
"#
    );
}
