//! Command-line front end for the encrypted note store.
//!
//! # Responsibility
//! - Translate user commands into `NoteStore` calls and print the result.
//! - Hold no note state between invocations; every run re-reads the store.

use clap::{Parser, Subcommand};
use log::info;
use sealnote_core::{
    core_version, default_log_level, init_logging, LoadPolicy, Note, NoteStore, NoteStoreError,
    StoreConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "sealnote", version, about = "Encrypted local notes")]
struct Cli {
    /// Directory holding the key file and notes file
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Drop notes that fail to decrypt instead of refusing to start
    #[arg(long)]
    skip_unreadable: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Show all notes with their positions
    List,
    /// Add a note; words are joined with single spaces
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Delete the note at a position shown by `list`
    Delete { position: usize },
    /// Print the core library version
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, NoteStoreError> {
    if cli.command == Command::Version {
        println!("sealnote_core {}", core_version());
        return Ok(ExitCode::SUCCESS);
    }

    let policy = if cli.skip_unreadable {
        LoadPolicy::SkipUnreadable
    } else {
        LoadPolicy::Strict
    };
    let mut store = NoteStore::open(StoreConfig::in_dir(&cli.dir).with_load_policy(policy))?;

    match cli.command {
        Command::List => print!("{}", render_notes(store.notes())),
        Command::Add { text } => match store.add(&text.join(" ")) {
            Ok(_) => print!("{}", render_notes(store.notes())),
            Err(NoteStoreError::Validation(err)) => {
                eprintln!("error: {err}");
                return Ok(ExitCode::from(2));
            }
            Err(err) => return Err(err),
        },
        Command::Delete { position } => {
            let Some(id) = note_at(store.notes(), position).map(|note| note.id) else {
                eprintln!("no note at position {position}");
                return Ok(ExitCode::from(2));
            };
            store.delete_by_id(id)?;
            info!("event=cli_delete module=cli status=ok position={position}");
            print!("{}", render_notes(store.notes()));
        }
        Command::Version => {}
    }
    Ok(ExitCode::SUCCESS)
}

/// Maps a 1-based display position to a note.
fn note_at(notes: &[Note], position: usize) -> Option<&Note> {
    position.checked_sub(1).and_then(|index| notes.get(index))
}

fn render_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "(no notes)\n".to_string();
    }
    notes
        .iter()
        .enumerate()
        .map(|(index, note)| format!("{}. {}\n", index + 1, note.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{note_at, render_notes, Cli, Command};
    use clap::Parser;
    use sealnote_core::Note;

    #[test]
    fn add_collects_all_words() {
        let cli = Cli::try_parse_from(["sealnote", "add", "buy", "milk"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Add {
                text: vec!["buy".to_string(), "milk".to_string()]
            }
        );
        assert_eq!(cli.dir, std::path::PathBuf::from("."));
    }

    #[test]
    fn add_without_text_is_rejected() {
        assert!(Cli::try_parse_from(["sealnote", "add"]).is_err());
    }

    #[test]
    fn global_flags_precede_command() {
        let cli =
            Cli::try_parse_from(["sealnote", "--dir", "/tmp/n", "--skip-unreadable", "list"])
                .unwrap();
        assert!(cli.skip_unreadable);
        assert_eq!(cli.command, Command::List);
    }

    #[test]
    fn positions_are_one_based() {
        let notes = vec![Note::new("a").unwrap(), Note::new("b").unwrap()];
        assert!(note_at(&notes, 0).is_none());
        assert_eq!(note_at(&notes, 2).map(|n| n.text.as_str()), Some("b"));
        assert!(note_at(&notes, 3).is_none());
    }

    #[test]
    fn render_lists_notes_in_order() {
        let notes = vec![Note::new("first").unwrap(), Note::new("second").unwrap()];
        assert_eq!(render_notes(&notes), "1. first\n2. second\n");
        assert_eq!(render_notes(&[]), "(no notes)\n");
    }
}
