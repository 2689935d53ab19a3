//! Admin command parsing
//!
//! Slash-style commands (marker `!`) mutate the registry or clear history.
//! Parsing is total over command-shaped input: anything unrecognized maps to
//! `Command::Unknown` and a missing persona argument is a usage error the
//! interpreter reports as user-visible text, never an exception.

use thiserror::Error;

/// Marker that routes a message to the command interpreter
pub const COMMAND_MARKER: char = '!';

/// Check whether a message is a command
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with(COMMAND_MARKER)
}

/// Parsed admin command.
///
/// Persona arguments carry the *normalized* name (leading `@`/brackets
/// stripped, capitalized), not a validated id: unknown names flow through
/// and are silently ignored by the registry, matching its no-op semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!remove <persona>` - deactivate a persona
    Remove(String),
    /// `!add <persona>` - reactivate a persona
    Add(String),
    /// `!isolate <persona>` - only that persona responds
    Isolate(String),
    /// `!reset` - all personas active, isolation off
    Reset,
    /// `!new` - clear channel history and reset personas
    New,
    /// `!commands` - static help text
    Commands,
    /// `!private` - create or find the caller's private channel
    Private,
    /// Anything else starting with the marker
    Unknown(String),
}

/// User-visible command errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("**Usage: {0}**")]
    Usage(&'static str),
}

impl Command {
    /// Parse a command-shaped message.
    ///
    /// Callers should check [`is_command`] first; non-command text parses
    /// as `Unknown`.
    pub fn parse(text: &str) -> Result<Command, CommandError> {
        let mut parts = text.trim().split_whitespace();
        let word = parts.next().unwrap_or("").to_lowercase();
        let arg = parts.next();

        match word.as_str() {
            "!remove" => Self::with_persona_arg(arg, "!remove [PersonaName]", Command::Remove),
            "!add" => Self::with_persona_arg(arg, "!add [PersonaName]", Command::Add),
            "!isolate" => Self::with_persona_arg(arg, "!isolate [PersonaName]", Command::Isolate),
            "!reset" => Ok(Command::Reset),
            "!new" => Ok(Command::New),
            "!commands" => Ok(Command::Commands),
            "!private" => Ok(Command::Private),
            other => Ok(Command::Unknown(other.to_string())),
        }
    }

    fn with_persona_arg(
        arg: Option<&str>,
        usage: &'static str,
        build: impl FnOnce(String) -> Command,
    ) -> Result<Command, CommandError> {
        match arg {
            Some(raw) => Ok(build(normalize_persona_arg(raw))),
            None => Err(CommandError::Usage(usage)),
        }
    }
}

/// Normalize a persona argument: strip mention decoration, capitalize.
fn normalize_persona_arg(raw: &str) -> String {
    let stripped = raw
        .trim()
        .trim_start_matches('@')
        .trim_start_matches('[')
        .trim_end_matches(']');
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
