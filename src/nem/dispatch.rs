//! # Request Dispatch
//!
//! nem takes no subcommands in the usual sense. The first argument is either a
//! code to run or a `/`-prefixed abbreviation naming an operation:
//!
//! ```text
//! /<resource><action><options>
//! ```
//!
//! Each part is a single letter. The resource letter picks the first resource
//! (alphabetically) whose name starts with it, the action letter the first
//! action of that resource starting with it, and any letters after that are
//! options. `/clv` is `commands list` with the `v` option.
//!
//! Everything that is not a known operation is treated as a code, so a code
//! can never be shadowed by an abbreviation that does not exist.

use crate::error::{NemError, Result};
use std::fmt::Write;

/// What a parsed request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Document,
    Edit,
    Find,
    List,
    Remove,
    Init,
    /// Help for one resource, or for everything.
    Help(Option<&'static str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Run {
        op: Operation,
        opts: Vec<char>,
        args: Vec<String>,
    },
    Exec {
        code: String,
        args: Vec<String>,
    },
}

struct Action {
    name: &'static str,
    op: Operation,
    usage: &'static str,
    about: &'static str,
    min_args: usize,
    max_args: Option<usize>,
}

struct Resource {
    name: &'static str,
    about: &'static str,
    actions: &'static [Action],
}

// Kept sorted by name: lookups take the first prefix match.
static RESOURCES: &[Resource] = &[
    Resource {
        name: "commands",
        about: "manage the commands in your nem files",
        actions: &[
            Action {
                name: "create",
                op: Operation::Create,
                usage: "<command...>",
                about: "add a command to the closest nem file",
                min_args: 1,
                max_args: None,
            },
            Action {
                name: "document",
                op: Operation::Document,
                usage: "<code> <text...>",
                about: "set the description of a command",
                min_args: 2,
                max_args: None,
            },
            Action {
                name: "edit",
                op: Operation::Edit,
                usage: "<code> <new code>",
                about: "change the code of a command",
                min_args: 2,
                max_args: Some(2),
            },
            Action {
                name: "find",
                op: Operation::Find,
                usage: "<text...>",
                about: "list commands whose code or text contains <text>",
                min_args: 1,
                max_args: None,
            },
            Action {
                name: "help",
                op: Operation::Help(Some("commands")),
                usage: "",
                about: "show this help",
                min_args: 0,
                max_args: Some(0),
            },
            Action {
                name: "list",
                op: Operation::List,
                usage: "",
                about: "list all commands (option v: show nem files)",
                min_args: 0,
                max_args: Some(0),
            },
            Action {
                name: "remove",
                op: Operation::Remove,
                usage: "<code>",
                about: "remove a command from the closest nem file",
                min_args: 1,
                max_args: Some(1),
            },
        ],
    },
    Resource {
        name: "help",
        about: "show this help",
        actions: &[],
    },
    Resource {
        name: "nem",
        about: "manage nem files",
        actions: &[Action {
            name: "init",
            op: Operation::Init,
            usage: "<path...>",
            about: "create nem files at the given paths",
            min_args: 1,
            max_args: None,
        }],
    },
];

/// Turns command-line arguments into a [`Request`].
pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Request> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Request::Run {
            op: Operation::List,
            opts: Vec::new(),
            args: Vec::new(),
        });
    };
    let first = first.as_ref();
    let rest: Vec<String> = rest.iter().map(|a| a.as_ref().to_string()).collect();

    let Some(abbrev) = first.strip_prefix('/') else {
        return Ok(exec(first, rest));
    };

    let mut letters = abbrev.chars();
    let Some(r) = letters.next() else {
        return Ok(run(Operation::Help(None), Vec::new(), rest));
    };
    let Some(resource) = RESOURCES.iter().find(|res| res.name.starts_with(r)) else {
        return Ok(exec(first, rest));
    };

    if resource.actions.is_empty() {
        return Ok(run(Operation::Help(None), Vec::new(), rest));
    }
    let Some(a) = letters.next() else {
        return Ok(run(Operation::Help(Some(resource.name)), Vec::new(), rest));
    };
    let action = resource
        .actions
        .iter()
        .find(|act| act.name.starts_with(a))
        .ok_or_else(|| {
            NemError::Api(format!(
                "unknown action `{}` for {} (try /{}h)",
                a, resource.name, r
            ))
        })?;

    check_arity(resource, action, rest.len())?;
    Ok(run(action.op, letters.collect(), rest))
}

fn run(op: Operation, opts: Vec<char>, args: Vec<String>) -> Request {
    Request::Run { op, opts, args }
}

fn exec(code: &str, args: Vec<String>) -> Request {
    Request::Exec {
        code: code.to_string(),
        args,
    }
}

fn check_arity(resource: &Resource, action: &Action, given: usize) -> Result<()> {
    let too_few = given < action.min_args;
    let too_many = action.max_args.is_some_and(|max| given > max);
    if too_few || too_many {
        return Err(NemError::Api(format!(
            "usage: nem /{}{} {}",
            initial(resource.name),
            initial(action.name),
            action.usage
        )
        .trim_end()
        .to_string()));
    }
    Ok(())
}

fn initial(name: &str) -> char {
    name.chars().next().unwrap_or_default()
}

/// Help text built from the dispatch table.
///
/// With a resource name, only that resource's actions are listed.
pub fn help_text(resource: Option<&str>) -> String {
    let mut out = String::new();
    if resource.is_none() {
        out.push_str("Usage: nem <code> [args...]\n");
        out.push_str("       nem /<resource><action>[options] [args...]\n");
    }

    for res in RESOURCES
        .iter()
        .filter(|res| resource.is_none_or(|name| name == res.name))
    {
        let _ = writeln!(out, "\n/{}  {}: {}", initial(res.name), res.name, res.about);
        for action in res.actions {
            let abbrev = format!("/{}{}", initial(res.name), initial(action.name));
            let _ = writeln!(
                out,
                "  {:<5}{:<10}{:<18}{}",
                abbrev, action.name, action.usage, action.about
            );
        }
    }
    out
}
