use crate::model::Command;
use crate::resolve::ResolvedCommand;
use crate::store::LayerId;

pub mod create;
pub mod document;
pub mod edit;
pub mod exec;
pub mod find;
pub mod helpers;
pub mod init;
pub mod list;
pub mod remove;

/// Asks the user for a line of input.
///
/// The command layer never touches the terminal itself; the CLI supplies an
/// implementation that does.
pub trait Prompter {
    /// Returns `None` when no answer can be had (no terminal, EOF).
    fn ask(&mut self, label: &str) -> Option<String>;
}

/// Prompter for non-interactive callers: never answers.
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn ask(&mut self, _label: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected: Vec<Command>,
    pub listed: Vec<ResolvedCommand>,
    /// Layers in load order. Set by listings only, for rendering `listed`
    /// with sources.
    pub layers: Vec<LayerId>,
    pub verbose: bool,
    /// A fully substituted command line to run.
    pub exec: Option<String>,
    pub help: Option<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed(mut self, listed: Vec<ResolvedCommand>) -> Self {
        self.listed = listed;
        self
    }

    pub fn with_layers(mut self, layers: Vec<LayerId>) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_exec(mut self, command: String) -> Self {
        self.exec = Some(command);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }
}
