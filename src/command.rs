//! Command parsing for inbound chat lines.
//!
//! One framed line parses into exactly one [`Command`]; dispatch lives in
//! the event loop. Matching is a case-sensitive prefix check in a fixed
//! priority order, first match wins. Commands taking an argument require
//! the trailing space in the prefix, so a bare `/nick` falls through to
//! [`Command::Unknown`]; that asymmetry is an explicit parse rule, not an
//! accident.

/// A parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the sender's nickname; empty clears the override.
    Nick(String),
    /// Show the command summary.
    Help,
    /// List connected users.
    Who,
    /// Emote, broadcast to everyone else.
    Me(String),
    /// Liveness check; answered with `PONG`.
    Ping,
    /// Change the server log level; the raw argument is parsed leniently
    /// at dispatch time.
    Debug(String),
    /// Disconnect immediately.
    Quit,
    /// Unrecognized slash command; carries the raw line for the notice.
    Unknown(String),
    /// Plain chat text, broadcast to everyone else. May be empty.
    Chat(String),
}

/// Parse one framed line.
///
/// The line must already be stripped of trailing CR/LF; leading
/// whitespace is significant (` /quit` is chat, not a command).
pub fn parse(line: &str) -> Command {
    if let Some(name) = line.strip_prefix("/nick ") {
        return Command::Nick(name.trim().to_string());
    }
    if line.starts_with("/help") {
        return Command::Help;
    }
    if line.starts_with("/who") {
        return Command::Who;
    }
    if let Some(text) = line.strip_prefix("/me ") {
        return Command::Me(text.to_string());
    }
    if line.starts_with("/ping") {
        return Command::Ping;
    }
    if let Some(arg) = line.strip_prefix("/debug ") {
        return Command::Debug(arg.to_string());
    }
    if line.starts_with("/quit") {
        return Command::Quit;
    }
    if line.starts_with('/') {
        return Command::Unknown(line.to_string());
    }
    Command::Chat(line.to_string())
}

/// The static `/help` reply.
pub fn help_text() -> &'static str {
    "Available commands:\n\
     /help                - Show this help\n\
     /nick <name>         - Set your nickname\n\
     /who                 - List connected users\n\
     /me <action>         - Emote, e.g. /me waves\n\
     /ping                - Ping the server\n\
     /debug <level>       - Set log level (ERROR|WARN|INFO|DEBUG)\n\
     /quit                - Disconnect"
}
