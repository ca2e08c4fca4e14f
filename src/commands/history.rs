use crate::cli::HistoryCommand;
use crate::commands::print_transcript;
use crate::error::Result;
use crate::session::SessionStore;
use crate::storage::KeyValueStore;
use colored::Colorize;
use prettytable::{format, Table};

const TITLE_COLUMN_CHARS: usize = 40;

/// Handle history commands for `user` against `storage`
pub fn handle_history<S: KeyValueStore>(
    storage: S,
    user: &str,
    command: HistoryCommand,
) -> Result<()> {
    let mut store = SessionStore::new(storage);
    store.set_identity(Some(user.to_string()))?;

    match command {
        HistoryCommand::List => {
            let mut table = Table::new();
            table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

            table.add_row(prettytable::row![
                "",
                "ID".bold(),
                "Title".bold(),
                "Last Message".bold(),
                "Messages".bold(),
                "Time".bold()
            ]);

            for session in store.sessions() {
                let marker = if store.selected_id() == Some(session.id.as_str()) {
                    "*"
                } else {
                    ""
                };

                table.add_row(prettytable::row![
                    marker,
                    session.id.cyan(),
                    shorten(&session.title, TITLE_COLUMN_CHARS),
                    shorten(&session.last_message, TITLE_COLUMN_CHARS),
                    session.messages.len(),
                    session.timestamp
                ]);
            }

            println!("\nSessions for {}:", user.cyan());
            table.printstd();
            println!();
            println!(
                "Use {} to continue the selected session.",
                format!("hookchat chat --user {}", user).cyan()
            );
            println!();
        }
        HistoryCommand::Show { id } => match store.session(&id) {
            Some(session) => print_transcript(session),
            None => println!("{}", format!("No session with id {}", id).yellow()),
        },
        HistoryCommand::Rename { id, title } => {
            if store.rename_session(&id, &title)? {
                println!("{}", format!("Renamed session {}", id).green());
            } else {
                println!(
                    "{}",
                    format!("No session renamed (unknown id {} or blank title)", id).yellow()
                );
            }
        }
        HistoryCommand::Delete { id } => {
            if store.delete_session(&id)? {
                println!("{}", format!("Deleted session {}", id).green());
            } else {
                println!("{}", format!("No session with id {}", id).yellow());
            }
        }
        HistoryCommand::Clear => {
            store.clear_all()?;
            println!("{}", format!("Cleared all sessions for {}", user).green());
        }
    }

    Ok(())
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}
