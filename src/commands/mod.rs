/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`    : Interactive chat
- `send`    : One-shot message
- `history` : Offline session management
- `signup`  : Account creation on the auth backend
*/

use crate::auth::{AuthClient, Identity};
use crate::chat::ChatController;
use crate::client::{ResponseClient, WebhookClient};
use crate::config::Config;
use crate::error::{HookchatError, Result};
use crate::session::{Sender, Session, SessionStore};
use crate::storage::{KeyValueStore, MemoryStorage, SqliteStorage};
use colored::Colorize;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use std::sync::Arc;

// Session history commands
pub mod history;

// Special commands parser for the interactive prompt
pub mod special_commands;

/// Open the configured storage backend
///
/// `ephemeral` keeps everything in memory for the lifetime of the process.
pub fn open_storage(config: &Config, ephemeral: bool) -> Result<Box<dyn KeyValueStore>> {
    if ephemeral {
        tracing::info!("Using in-memory session storage");
        return Ok(Box::new(MemoryStorage::new()));
    }

    let storage = match &config.storage.path {
        Some(path) => SqliteStorage::new_with_path(path.clone())?,
        None => SqliteStorage::new()?,
    };
    tracing::debug!(path = %storage.path().display(), "Opened session storage");
    Ok(Box::new(storage))
}

/// Read a password from `HOOKCHAT_PASSWORD` or prompt for it without echo
fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var("HOOKCHAT_PASSWORD") {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush().map_err(HookchatError::from)?;
    Ok(rpassword::read_password().map_err(HookchatError::from)?)
}

/// Print one message of a transcript
fn print_message(sender: Sender, content: &str, timestamp: &str) {
    match sender {
        Sender::User => println!("{} {}", format!("[{}] you:", timestamp).cyan(), content),
        Sender::Assistant => {
            println!("{} {}", format!("[{}] assistant:", timestamp).green(), content)
        }
    }
}

/// Print every message of a session
pub fn print_transcript(session: &Session) {
    println!("\n{}", session.title.bold());
    if session.messages.is_empty() {
        println!("{}", "No messages yet.".yellow());
    }
    for message in &session.messages {
        print_message(message.sender, &message.content, &message.timestamp);
    }
    println!();
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Resolves the identity, loads its sessions, and runs a readline loop
    //! that either executes a special command or sends the line.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use rustyline::error::ReadlineError;

    /// How the chat identity was obtained
    enum SignIn {
        Local,
        Backend,
    }

    /// Start interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `user` - Local user id; skips the auth backend when set
    /// * `email` - Email to log in with when `user` is not set
    /// * `ephemeral` - Keep sessions in memory only
    pub async fn run_chat(
        config: Config,
        user: Option<String>,
        email: Option<String>,
        ephemeral: bool,
    ) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let mut rl = DefaultEditor::new().map_err(HookchatError::from)?;
        let auth = AuthClient::new(&config.auth)?;

        let (identity, sign_in) = match (user, email) {
            (Some(uid), _) => (Identity::local(uid), SignIn::Local),
            (None, Some(email)) => {
                let password = read_password()?;
                (auth.login(&email, &password).await?, SignIn::Backend)
            }
            (None, None) => match auth.check().await? {
                Some(identity) => (identity, SignIn::Backend),
                None => {
                    println!(
                        "{}",
                        "Not logged in. Use --email to log in or --user for a local identity."
                            .yellow()
                    );
                    return Err(HookchatError::NoIdentity.into());
                }
            },
        };

        let mut store = SessionStore::new(open_storage(&config, ephemeral)?);
        store.set_identity(Some(identity.uid.clone()))?;

        let client: Arc<dyn ResponseClient> = Arc::new(WebhookClient::new(&config.webhook)?);
        let mut chat = ChatController::new(store, client);

        print_welcome_banner(&identity);

        loop {
            let prompt = format_prompt(&chat);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match parse_special_command(trimmed) {
                        Ok(SpecialCommand::None) => {}
                        Ok(SpecialCommand::Exit) => break,
                        Ok(SpecialCommand::Logout) => {
                            if matches!(sign_in, SignIn::Backend) {
                                if let Err(e) = auth.logout().await {
                                    eprintln!("{}", format!("Logout failed: {}", e).red());
                                    continue;
                                }
                            }
                            chat.store_mut().set_identity(None)?;
                            println!("{}", "Logged out.".green());
                            break;
                        }
                        Ok(command) => {
                            if let Err(e) = handle_session_command(&mut chat, command) {
                                eprintln!("{}", format!("Error: {}", e).red());
                            }
                            continue;
                        }
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    }

                    rl.add_history_entry(trimmed)
                        .map_err(HookchatError::from)?;
                    println!("{}", "Thinking...".dimmed());

                    match chat.send_message(trimmed).await {
                        Ok(Some(reply)) => println!("\n{}\n", reply),
                        Ok(None) => println!(
                            "{}",
                            "No session was selected, so a new one was started. Send your message again."
                                .yellow()
                        ),
                        Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn handle_session_command<S: KeyValueStore>(
        chat: &mut ChatController<S>,
        command: SpecialCommand,
    ) -> Result<()> {
        let store = chat.store_mut();
        match command {
            SpecialCommand::NewSession => {
                if let Some(id) = store.create_session()? {
                    println!("{}", format!("Started session {}", id).green());
                }
            }
            SpecialCommand::ListSessions => print_session_list(store.sessions(), store.selected_id()),
            SpecialCommand::Select(id) => {
                if store.session(&id).is_none() {
                    println!("{}", format!("No session with id {}", id).yellow());
                } else {
                    store.select_session(&id)?;
                    if let Some(session) = store.selected_session() {
                        print_transcript(session);
                    }
                }
            }
            SpecialCommand::Rename { id, title } => {
                if store.rename_session(&id, &title)? {
                    println!("{}", format!("Renamed {} to {}", id, title.trim()).green());
                } else {
                    println!("{}", format!("No session with id {}", id).yellow());
                }
            }
            SpecialCommand::Delete(id) => {
                if store.delete_session(&id)? {
                    println!("{}", format!("Deleted session {}", id).green());
                } else {
                    println!("{}", format!("No session with id {}", id).yellow());
                }
            }
            SpecialCommand::ClearAll => {
                store.clear_all()?;
                println!("{}", "Cleared all sessions.".green());
            }
            SpecialCommand::Show => match store.selected_session() {
                Some(session) => print_transcript(session),
                None => println!("{}", "No session selected.".yellow()),
            },
            SpecialCommand::Help => print_help(),
            SpecialCommand::Logout | SpecialCommand::Exit | SpecialCommand::None => {}
        }
        Ok(())
    }

    fn print_session_list(sessions: &[Session], selected: Option<&str>) {
        for session in sessions {
            let marker = if Some(session.id.as_str()) == selected {
                "*".green().bold()
            } else {
                " ".normal()
            };
            println!(
                "{} {}  {}  {}",
                marker,
                session.id.cyan(),
                session.title.bold(),
                session.last_message.dimmed()
            );
        }
    }

    fn format_prompt<S: KeyValueStore>(chat: &ChatController<S>) -> String {
        let title = chat
            .store()
            .selected_session()
            .map(|s| s.title.as_str())
            .unwrap_or("no session");
        format!("{} ", format!("[{}] >>>", title).cyan())
    }

    /// Display welcome banner at the start of interactive chat
    fn print_welcome_banner(identity: &Identity) {
        println!();
        println!("{}", format!("Hi, {}", identity.display_name()).bold());
        println!("What can I help you with?");
        println!("{}", "Type /help for session commands, /exit to leave.".dimmed());
        println!();
    }
}

/// Send one message as `user` and print the reply
///
/// The exchange report is awaited before returning so that it is not cut
/// short by process exit.
pub async fn run_send(config: Config, user: String, message: String) -> Result<()> {
    let mut store = SessionStore::new(open_storage(&config, false)?);
    store.set_identity(Some(user))?;

    let client: Arc<dyn ResponseClient> = Arc::new(WebhookClient::new(&config.webhook)?);
    let mut chat = ChatController::new(store, client);

    let Some(pending) = chat.begin_send(&message)? else {
        eprintln!("{}", "Nothing was sent.".yellow());
        return Ok(());
    };

    let reply = chat
        .client()
        .fetch_reply(&pending.content, &pending.session_id)
        .await;
    let report = chat.complete_send(&pending, &reply)?;
    println!("{}", reply);

    if let Err(e) = report.await {
        tracing::warn!("Exchange report task failed: {}", e);
    }
    Ok(())
}

/// Create an account on the auth backend
pub async fn run_signup(config: Config, name: String, email: String) -> Result<()> {
    let password = read_password()?;

    let auth = AuthClient::new(&config.auth)?;
    let identity = auth.signup(&name, &email, &password).await?;
    println!(
        "{}",
        format!("Created account for {} (id {})", identity.display_name(), identity.uid).green()
    );
    println!(
        "Use {} to start chatting.",
        format!("hookchat chat --email {}", email).cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_read_password_prefers_env_override() {
        std::env::set_var("HOOKCHAT_PASSWORD", "s3cret pass");
        let password = read_password();
        std::env::remove_var("HOOKCHAT_PASSWORD");

        assert_eq!(password.unwrap(), "s3cret pass");
    }

    #[test]
    fn test_open_storage_ephemeral_starts_empty() {
        let storage = open_storage(&Config::default(), true).unwrap();
        assert_eq!(storage.get("alice", crate::storage::StorageKey::Chats).unwrap(), None);
    }
}
