//! Input line parsing

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/join <room>`
    Join(String),
    /// `/name [name]`; blank picks a random name
    Name(String),
    /// `/who`: list who is typing
    Who,
    /// `/help`
    Help,
    /// `/quit`
    Quit,
    /// Anything that is not a command is sent as a message
    Say(String),
    /// A `/word` that is not a known command
    Unknown(String),
}

impl Command {
    /// Parse a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Say(line.to_string()));
        };

        let (word, arg) = match rest.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (rest, ""),
        };

        Some(match word.to_lowercase().as_str() {
            "join" | "room" => Self::Join(arg.to_string()),
            "name" | "nick" => Self::Name(arg.to_string()),
            "who" => Self::Who,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(word.to_string()),
        })
    }
}

/// Text printed by `/help`
pub const HELP: &str = "\
Commands:
  /join <room>   switch to another room
  /name [name]   change your display name (blank picks one for you)
  /who           show who is typing
  /help          show this help
  /quit          leave the chat
Anything else is sent to the current room.";
