//! Line commands typed at the prompt.

use std::path::PathBuf;

use docqa_core::{AppViewModel, Msg, Role};

pub const HELP: &str = "\
Commands:
  open <path>       select a PDF to upload
  upload            upload the selected PDF
  ask <question>    ask about the document (plain text works too)
  summary           summarize the document
  delete            delete the document and start over
  listen <n>        read message n aloud, or stop it if playing
  listen summary    read the summary aloud, or stop it
  stop              stop reading
  dismiss           dismiss the current notice
  help              show this help
  quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenTarget {
    /// 1-based position in the conversation.
    Message(usize),
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Upload,
    Ask(String),
    Summary,
    Delete,
    Listen(ListenTarget),
    Stop,
    Dismiss,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "open" if rest.is_empty() => Command::Invalid("usage: open <path>".to_string()),
        "open" => Command::Open(PathBuf::from(rest)),
        "upload" => Command::Upload,
        "ask" if rest.is_empty() => Command::Invalid("usage: ask <question>".to_string()),
        "ask" => Command::Ask(rest.to_string()),
        "summary" | "summarize" => Command::Summary,
        "delete" => Command::Delete,
        "listen" => parse_listen(rest),
        "stop" => Command::Stop,
        "dismiss" => Command::Dismiss,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Ask(line.to_string()),
    }
}

fn parse_listen(rest: &str) -> Command {
    if rest.eq_ignore_ascii_case("summary") {
        return Command::Listen(ListenTarget::Summary);
    }
    match rest.parse::<usize>() {
        Ok(index) if index > 0 => Command::Listen(ListenTarget::Message(index)),
        _ => Command::Invalid("usage: listen <n> | listen summary".to_string()),
    }
}

/// Translates a command into core messages against what is on screen.
///
/// `Help`, `Quit`, `Empty` and `Invalid` are handled by the caller and map
/// to no messages.
pub fn to_msgs(command: Command, view: &AppViewModel) -> Result<Vec<Msg>, String> {
    let msgs = match command {
        Command::Open(path) => vec![Msg::FileSelected(path)],
        Command::Upload => vec![Msg::UploadClicked],
        Command::Ask(question) => vec![Msg::InputChanged(question), Msg::QuestionSubmitted],
        Command::Summary => vec![Msg::SummarizeClicked],
        Command::Delete => vec![Msg::DeleteClicked],
        Command::Listen(ListenTarget::Summary) => match &view.summary {
            Some(summary) => vec![Msg::ReadAloudToggled(summary.text.clone())],
            None => return Err("there is no summary yet".to_string()),
        },
        Command::Listen(ListenTarget::Message(index)) => {
            match view.messages.get(index.wrapping_sub(1)) {
                Some(message) if message.role == Role::Assistant => {
                    vec![Msg::ReadAloudToggled(message.content.clone())]
                }
                Some(_) => return Err(format!("message {index} is your own question")),
                None => return Err(format!("there is no message {index}")),
            }
        }
        Command::Stop => vec![Msg::StopReadingClicked],
        Command::Dismiss => vec![Msg::NoticeDismissed],
        Command::Help | Command::Quit | Command::Empty | Command::Invalid(_) => Vec::new(),
    };
    Ok(msgs)
}
