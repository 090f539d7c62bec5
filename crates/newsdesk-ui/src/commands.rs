//! Console command parsing

/// One line typed at the panel prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Replace the title field; text is kept verbatim
    Title(String),
    /// Replace the content field; `\n` in the text becomes a line break
    Content(String),
    Submit,
    /// Position in the list (1-based) or document id
    Delete(String),
    Refresh,
    List,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

pub const HELP: &str = "\
Commands:
  title <text>      set the title field
  content <text>    set the content field (use \\n for a line break)
  submit            add the news item
  delete <n|id>     delete by list position or id
  refresh           reload the list from the store
  list              show the panel
  help              show this help
  quit              leave";

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_start();
        if line.trim().is_empty() {
            return Self::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest),
            None => (line.trim_end(), ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "title" | "t" => Self::Title(rest.trim_end_matches(['\r', '\n']).to_string()),
            "content" | "c" => Self::Content(
                rest.trim_end_matches(['\r', '\n'])
                    .replace("\\n", "\n"),
            ),
            "submit" | "s" | "add" => Self::Submit,
            "delete" | "d" | "rm" => match rest.trim() {
                "" => Self::Unknown(line.trim().to_string()),
                target => Self::Delete(target.to_string()),
            },
            "refresh" | "r" => Self::Refresh,
            "list" | "ls" | "l" => Self::List,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}
