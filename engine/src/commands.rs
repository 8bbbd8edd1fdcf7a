//! Slash commands: the keypad surface of the REPL.
//!
//! A line starting with `/` drives the calculator the way the on-screen
//! keypad would. Every other line is a transcript for the router.

use std::fmt::Write as _;

use voxcalc_core::ScientificAction;

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub palette_label: &'static str,
    pub help_label: &'static str,
    pub description: &'static str,
    pub show_in_help: bool,
}

const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        palette_label: "key <tokens>",
        help_label: "key",
        description: "Press keypad keys (digits, operators, parentheses)",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "eq, =",
        help_label: "eq",
        description: "Evaluate the display",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "del",
        help_label: "del",
        description: "Delete the last number or character",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "clear, c",
        help_label: "clear",
        description: "Clear the display",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "fn <name>",
        help_label: "fn",
        description: "Apply a scientific function",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "listen",
        help_label: "listen",
        description: "Toggle voice input",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "history",
        help_label: "history",
        description: "List saved calculations",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "q, quit",
        help_label: "q(uit)",
        description: "Exit",
        show_in_help: true,
    },
    CommandSpec {
        palette_label: "help",
        help_label: "help",
        description: "Show available commands",
        show_in_help: false,
    },
];

#[must_use]
pub fn command_specs() -> &'static [CommandSpec] {
    COMMAND_SPECS
}

#[must_use]
pub fn command_help_summary() -> String {
    let labels: Vec<&str> = COMMAND_SPECS
        .iter()
        .filter(|spec| spec.show_in_help)
        .map(|spec| spec.help_label)
        .collect();
    format!("Commands: /{}", labels.join(", /"))
}

/// Parsed command with typed arguments.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Key(Vec<&'a str>),
    Equals,
    Delete,
    Clear,
    Function(Option<&'a str>),
    Listen,
    History,
    Help,
    Quit,
    Unknown(&'a str),
    Empty,
}

impl<'a> Command<'a> {
    /// Parse the text after the leading `/`.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let parts: Vec<&str> = raw.split_whitespace().collect();

        match parts.first().copied() {
            Some("key" | "k") => Command::Key(parts[1..].to_vec()),
            Some("eq" | "=") => Command::Equals,
            Some("del" | "backspace") => Command::Delete,
            Some("clear" | "c") => Command::Clear,
            Some("fn" | "f") => Command::Function(parts.get(1).copied()),
            Some("listen" | "mic") => Command::Listen,
            Some("history" | "h") => Command::History,
            Some("help") => Command::Help,
            Some("q" | "quit") => Command::Quit,
            Some(cmd) => Command::Unknown(cmd),
            None => Command::Empty,
        }
    }
}

impl super::App {
    /// Process a slash command line (without the `/`). Returns a status line
    /// for the user, if any.
    pub fn process_command(&mut self, raw: &str) -> Option<String> {
        match Command::parse(raw) {
            Command::Key(tokens) => {
                if tokens.is_empty() {
                    return Some("Usage: /key <tokens>".to_string());
                }
                for token in tokens {
                    if !self.press(token) {
                        return Some(format!(
                            "Keypad is disabled in {}",
                            self.shell().view.display_name()
                        ));
                    }
                }
                None
            }
            Command::Equals => {
                self.calculate();
                None
            }
            Command::Delete => {
                self.delete_last();
                None
            }
            Command::Clear => {
                self.clear();
                None
            }
            Command::Function(None) => Some(function_list()),
            Command::Function(Some(name)) => match ScientificAction::parse(name) {
                Some(action) => {
                    self.apply_action(action);
                    None
                }
                None => Some(format!("Unknown function: {name}. {}", function_list())),
            },
            Command::Listen => Some(match self.toggle_listening() {
                Ok(true) => "Listening...".to_string(),
                Ok(false) => "Stopped listening".to_string(),
                Err(e) => e.to_string(),
            }),
            Command::History => Some(self.history_listing()),
            Command::Help => Some(command_help()),
            Command::Quit => {
                self.request_quit();
                None
            }
            Command::Unknown(cmd) => Some(format!("Unknown command: /{cmd}")),
            Command::Empty => None,
        }
    }

    fn history_listing(&self) -> String {
        if self.history().is_empty() {
            return "History is empty".to_string();
        }
        let mut out = String::new();
        for (i, entry) in self.history().presentation().enumerate() {
            let _ = writeln!(out, "{}. {} = {}", i + 1, entry.expression, entry.result);
        }
        out.trim_end().to_string()
    }
}

fn command_help() -> String {
    let width = COMMAND_SPECS
        .iter()
        .map(|spec| spec.palette_label.len())
        .max()
        .unwrap_or(0);
    COMMAND_SPECS
        .iter()
        .map(|spec| format!("/{:<width$}  {}", spec.palette_label, spec.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn function_list() -> String {
    let names: Vec<&str> = ScientificAction::names().collect();
    format!("Functions: {}", names.join(", "))
}
