//! # Rendering
//!
//! Turns [`CmdResult`]s into terminal text. Everything here returns strings so
//! it can be tested without a terminal; the handlers in `commands.rs` decide
//! where the text goes.
//!
//! A listing is a table of `[code]  command  description`, aligned on display
//! width so wide characters in commands do not break the columns. Codes are
//! blue and template placeholders yellow. The verbose listing adds the
//! positions of the nem files each command comes from, with a legend below.

use colored::*;
use nem::commands::{CmdMessage, MessageLevel};
use nem::resolve::ResolvedCommand;
use nem::store::LayerId;
use nem::template::{self, Segment};
use unicode_width::UnicodeWidthStr;

pub const EMPTY_LIST: &str = "no commands yet, add one with `nem /cc <command>`";

pub fn render_list(listed: &[ResolvedCommand], layers: &[LayerId], verbose: bool) -> String {
    if listed.is_empty() {
        return format!("{}\n", EMPTY_LIST.dimmed());
    }

    let codes: Vec<String> = listed.iter().map(|e| format!("[{}]", e.code)).collect();
    let sources: Vec<String> = listed
        .iter()
        .map(|e| source_positions(e, layers))
        .collect();
    let code_width = codes.iter().map(|c| c.width()).max().unwrap_or(0);
    let source_width = sources.iter().map(|s| s.width()).max().unwrap_or(0);
    let cmd_width = listed.iter().map(|e| e.cmd.width()).max().unwrap_or(0);

    let mut out = String::new();
    for ((entry, code), source) in listed.iter().zip(&codes).zip(&sources) {
        let mut line = String::new();
        if verbose {
            line.push_str(&pad(&source.dimmed().to_string(), source, source_width));
            line.push(' ');
        }
        line.push_str(&pad(&code.blue().to_string(), code, code_width));
        line.push_str("  ");
        if entry.desc.is_empty() {
            line.push_str(&highlight_placeholders(&entry.cmd));
        } else {
            line.push_str(&pad(&highlight_placeholders(&entry.cmd), &entry.cmd, cmd_width));
            line.push_str("  ");
            line.push_str(&entry.desc.dimmed().to_string());
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if verbose {
        out.push('\n');
        for (i, layer) in layers.iter().enumerate() {
            out.push_str(&format!("{} {}\n", format!("(db {})", i + 1).dimmed(), layer));
        }
    }
    out
}

/// The command with its placeholders coloured.
pub fn highlight_placeholders(cmd: &str) -> String {
    template::parse(cmd)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text,
            Segment::Field(raw, _) => format!("{{{}}}", raw).yellow().to_string(),
        })
        .collect()
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|message| {
            let content = match message.level {
                MessageLevel::Info => message.content.dimmed(),
                MessageLevel::Success => message.content.green(),
                MessageLevel::Warning => message.content.yellow(),
                MessageLevel::Error => message.content.red(),
            };
            format!("{}\n", content)
        })
        .collect()
}

pub fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

/// Line announcing a command about to run.
pub fn render_exec(command: &str) -> String {
    format!("{} {}", "exec:".dimmed(), command)
}

fn source_positions(entry: &ResolvedCommand, layers: &[LayerId]) -> String {
    let positions: Vec<String> = entry
        .layers
        .iter()
        .filter_map(|l| layers.iter().position(|x| x == l))
        .map(|i| (i + 1).to_string())
        .collect();
    format!("({})", positions.join(","))
}

/// Pads `styled` to `width` using the display width of its plain text.
fn pad(styled: &str, plain: &str, width: usize) -> String {
    let fill = width.saturating_sub(plain.width());
    format!("{}{}", styled, " ".repeat(fill))
}
