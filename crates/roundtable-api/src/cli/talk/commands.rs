//! Slash command parsing for the talk loop.
//!
//! Anything not starting with `/` is an interjection.

use console::style;

/// Available slash commands.
#[derive(Debug, PartialEq, Eq)]
pub enum TalkCommand {
    Help,
    Pause,
    Resume,
    Stop,
    Mute,
    Unmute,
    Status,
    Quit,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<TalkCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    let parsed = match cmd.as_str() {
        "/help" | "/h" | "/?" => TalkCommand::Help,
        "/pause" | "/p" => TalkCommand::Pause,
        "/resume" | "/r" | "/continue" => TalkCommand::Resume,
        "/stop" => TalkCommand::Stop,
        "/mute" => TalkCommand::Mute,
        "/unmute" => TalkCommand::Unmute,
        "/status" | "/s" => TalkCommand::Status,
        "/quit" | "/exit" | "/q" => TalkCommand::Quit,
        _ => TalkCommand::Unknown(cmd),
    };
    Some(parsed)
}

/// Help text listing all commands.
pub fn help_text() -> String {
    let rows = [
        ("/pause", "Pause after the current step; the log is kept"),
        ("/resume", "Continue a paused conversation"),
        ("/stop", "End the conversation and silence playback"),
        ("/mute", "Stop synthesizing speech"),
        ("/unmute", "Resume speech synthesis"),
        ("/status", "Show the session state"),
        ("/help", "Show this help message"),
        ("/quit", "Stop and exit"),
    ];

    let mut out = format!("\n  {}\n\n", style("Available commands:").bold());
    for (cmd, desc) in rows {
        out.push_str(&format!("  {:<10} {}\n", style(cmd).cyan(), desc));
    }
    out.push_str(&format!(
        "\n  {}\n",
        style("Any other line is an interjection. Ctrl+C pauses, Ctrl+D exits.").dim()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_controls() {
        assert_eq!(parse("/pause"), Some(TalkCommand::Pause));
        assert_eq!(parse("/resume"), Some(TalkCommand::Resume));
        assert_eq!(parse("/r"), Some(TalkCommand::Resume));
        assert_eq!(parse("/stop"), Some(TalkCommand::Stop));
        assert_eq!(parse("  /STATUS  "), Some(TalkCommand::Status));
    }

    #[test]
    fn test_parse_mute() {
        assert_eq!(parse("/mute"), Some(TalkCommand::Mute));
        assert_eq!(parse("/unmute"), Some(TalkCommand::Unmute));
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse("/quit"), Some(TalkCommand::Quit));
        assert_eq!(parse("/exit"), Some(TalkCommand::Quit));
        assert_eq!(parse("/q"), Some(TalkCommand::Quit));
    }

    #[test]
    fn test_parse_interjection() {
        assert_eq!(parse("what about cats?"), None);
        assert_eq!(parse("a/b"), None);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse("/dance now"), Some(TalkCommand::Unknown("/dance".to_string())));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for cmd in ["/pause", "/resume", "/stop", "/mute", "/unmute", "/status", "/help", "/quit"] {
            assert!(help.contains(cmd), "missing {cmd}");
        }
    }
}
