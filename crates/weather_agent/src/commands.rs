#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Clear,
    Retry,
    Export,
    Search(String),
    /// 1-based quick reply number; `None` when the argument is missing or not a number.
    Reply(Option<usize>),
    History,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "Commands:
  /help            show this help
  /clear           start a new conversation
  /retry           resend the last message after an error
  /export          write the transcript to a text file
  /search <text>   list messages containing <text>
  /reply <n>       send quick reply number <n>
  /history         print the whole transcript
  /quit            exit
Anything else is sent to the weather agent.";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    let parsed = match command {
        "/help" => SlashCommand::Help,
        "/clear" => SlashCommand::Clear,
        "/retry" => SlashCommand::Retry,
        "/export" => SlashCommand::Export,
        "/search" => SlashCommand::Search(argument.to_string()),
        "/reply" => SlashCommand::Reply(argument.parse().ok().filter(|number| *number > 0)),
        "/history" => SlashCommand::History,
        "/quit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command.to_string()),
    };

    Some(parsed)
}
