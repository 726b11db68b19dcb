//! # CLI Layer
//!
//! The only place that knows about the terminal: it parses arguments, asks
//! the user for input, prints results and runs resolved commands through the
//! shell. Everything else goes through [`nem::api::NemApi`].
//!
//! Every request is committed before anything is executed, so a command that
//! never returns (a server, a REPL) cannot hold back changes to the nem files.

use super::logging;
use super::render::{print_messages, render_exec, render_list};
use super::setup::Cli;
use clap::Parser;
use nem::commands::{CmdResult, Prompter};
use nem::config::NemConfig;
use nem::error::{NemError, Result};
use nem::init::initialize;
use std::io::{BufRead, IsTerminal, Write};
use std::process::Command;
use tracing::debug;

/// Reads answers from stdin when it is a terminal.
struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, label: &str) -> Option<String> {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        print!("{}: ", label);
        std::io::stdout().flush().ok()?;
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

/// Runs the CLI and returns the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = NemConfig::from_env()?;
    if let Some(root) = cli.root.clone() {
        config.root_db = Some(root);
    }
    let cwd = std::env::current_dir()
        .map_err(|e| NemError::Config(format!("could not read working directory: {}", e)))?;
    let shell = config.shell.clone();

    let mut ctx = initialize(&cwd, config)?;
    let result = ctx.api.handle_request(&cli.args, &mut TerminalPrompter)?;
    ctx.api.commit()?;

    present(&result);

    match result.exec {
        Some(command) if cli.dry_run => {
            println!("{}", command);
            Ok(0)
        }
        Some(command) => execute(&shell, &command),
        None => Ok(0),
    }
}

fn present(result: &CmdResult) {
    if let Some(help) = &result.help {
        print!("{}", help);
    }
    // Only listings carry layers.
    if !result.layers.is_empty() {
        print!("{}", render_list(&result.listed, &result.layers, result.verbose));
    }
    print_messages(&result.messages);
}

fn execute(shell: &str, command: &str) -> Result<i32> {
    eprintln!("{}", render_exec(command));
    debug!(shell, command, "running");
    let status = Command::new(shell)
        .arg("-c")
        .arg(command)
        .status()
        .map_err(|e| {
            NemError::Api(format!("failed to run `{}` with {}: {}", command, shell, e))
        })?;
    // Killed by a signal: no code, report failure.
    Ok(status.code().unwrap_or(1))
}
