//! Slash commands for the console front end
//!
//! Anything that does not start with `/` is sent to the assistant as-is.

use std::fmt;

use crate::conversation::SAMPLE_PROMPTS;

/// Built-in slash commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Clear,
    Dismiss,
    CloseCrisis,
    Resources,
    Search,
    Feedback,
    Session,
    Help,
    Quit,
}

impl SlashCommand {
    pub fn all() -> &'static [SlashCommand] {
        &[
            SlashCommand::Clear,
            SlashCommand::Dismiss,
            SlashCommand::CloseCrisis,
            SlashCommand::Resources,
            SlashCommand::Search,
            SlashCommand::Feedback,
            SlashCommand::Session,
            SlashCommand::Help,
            SlashCommand::Quit,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SlashCommand::Clear => "clear",
            SlashCommand::Dismiss => "dismiss",
            SlashCommand::CloseCrisis => "close-crisis",
            SlashCommand::Resources => "resources",
            SlashCommand::Search => "search",
            SlashCommand::Feedback => "feedback",
            SlashCommand::Session => "session",
            SlashCommand::Help => "help",
            SlashCommand::Quit => "quit",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            SlashCommand::Search => "/search <query>",
            SlashCommand::Feedback => "/feedback <1-5> [comment]",
            _ => "",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SlashCommand::Clear => "clear the conversation here and on the server",
            SlashCommand::Dismiss => "hide the current error",
            SlashCommand::CloseCrisis => "close the crisis support panel",
            SlashCommand::Resources => "show crisis and support resources",
            SlashCommand::Search => "look up passages in the knowledge base",
            SlashCommand::Feedback => "rate this conversation",
            SlashCommand::Session => "show the session id",
            SlashCommand::Help => "show this help",
            SlashCommand::Quit => "leave",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "exit" | "q" => Some(SlashCommand::Quit),
            "?" => Some(SlashCommand::Help),
            _ => Self::all().iter().find(|c| c.name() == name).copied(),
        }
    }
}

impl fmt::Display for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// One line of console input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Plain text for the assistant
    Message(String),
    /// A bare number that may pick a sample prompt (1-based)
    Sample(usize),
    Clear,
    Dismiss,
    CloseCrisis,
    Resources,
    Search(String),
    Feedback { rating: u8, comment: String },
    Session,
    Help,
    Quit,
    /// Unknown command or bad arguments; the string explains why
    Invalid(String),
}

/// Interpret one input line.
pub fn parse_input(line: &str) -> ConsoleInput {
    let trimmed = line.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        if let Ok(n) = trimmed.parse::<usize>() {
            if (1..=SAMPLE_PROMPTS.len()).contains(&n) {
                return ConsoleInput::Sample(n);
            }
        }
        return ConsoleInput::Message(line.to_string());
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let Some(command) = SlashCommand::parse(name) else {
        return ConsoleInput::Invalid(format!("Unknown command: /{name} (try /help)"));
    };

    match command {
        SlashCommand::Clear => ConsoleInput::Clear,
        SlashCommand::Dismiss => ConsoleInput::Dismiss,
        SlashCommand::CloseCrisis => ConsoleInput::CloseCrisis,
        SlashCommand::Resources => ConsoleInput::Resources,
        SlashCommand::Session => ConsoleInput::Session,
        SlashCommand::Help => ConsoleInput::Help,
        SlashCommand::Quit => ConsoleInput::Quit,
        SlashCommand::Search => {
            if args.is_empty() {
                ConsoleInput::Invalid(format!("Usage: {}", command.usage()))
            } else {
                ConsoleInput::Search(args.to_string())
            }
        }
        SlashCommand::Feedback => {
            let (rating, comment) = match args.split_once(char::is_whitespace) {
                Some((rating, comment)) => (rating, comment.trim()),
                None => (args, ""),
            };
            match rating.parse::<u8>() {
                Ok(rating) if (1..=5).contains(&rating) => ConsoleInput::Feedback {
                    rating,
                    comment: comment.to_string(),
                },
                _ => ConsoleInput::Invalid(format!("Usage: {}", command.usage())),
            }
        }
    }
}
