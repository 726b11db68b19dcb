use crate::error::{NemError, Result};
use crate::template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the table holding command shortcuts.
pub const COMMANDS_TABLE: &str = "cmds";

/// A primitive field value as stored in a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Str,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::Str => "string",
            ValueKind::List => "list of strings",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(l) => write!(f, "{:?}", l),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(l: Vec<String>) -> Self {
        Value::List(l)
    }
}

/// One row: field name to value.
pub type Record = BTreeMap<String, Value>;

/// Typed view of a row in the `cmds` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub cmd: String,
    pub code: String,
    pub desc: String,
    pub arg_count: i64,
    pub args: Vec<String>,
}

impl Command {
    /// Builds a command, recording its named placeholders as `args`.
    pub fn new(cmd: impl Into<String>, code: impl Into<String>, desc: impl Into<String>) -> Self {
        let cmd = cmd.into();
        let args = template::named_placeholders(&cmd);
        Self {
            arg_count: args.len() as i64,
            args,
            code: code.into(),
            desc: desc.into(),
            cmd,
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("cmd".into(), Value::Str(self.cmd.clone()));
        record.insert("code".into(), Value::Str(self.code.clone()));
        record.insert("desc".into(), Value::Str(self.desc.clone()));
        record.insert("arg_count".into(), Value::Int(self.arg_count));
        record.insert("args".into(), Value::List(self.args.clone()));
        record
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            cmd: str_field(record, "cmd")?,
            code: str_field(record, "code")?,
            desc: str_field(record, "desc")?,
            arg_count: record.get("arg_count").and_then(Value::as_int).unwrap_or(0),
            args: record
                .get("args")
                .and_then(Value::as_list)
                .map(|l| l.to_vec())
                .unwrap_or_default(),
        })
    }
}

fn str_field(record: &Record, name: &str) -> Result<String> {
    record
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| NemError::Api(format!("Command row has no string field '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_command_records_named_placeholders() {
        let cmd = Command::new("git push {remote=origin} {branch=master}", "gp", "");
        assert_eq!(cmd.arg_count, 2);
        assert_eq!(cmd.args, vec!["remote=origin", "branch=master"]);
    }

    #[test]
    fn record_conversion_keeps_every_field() {
        let cmd = Command::new("cargo build --release", "cbr", "release build");
        let back = Command::from_record(&cmd.to_record()).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn from_record_tolerates_missing_optional_fields() {
        let mut record = Record::new();
        record.insert("cmd".into(), "echo".into());
        record.insert("code".into(), "e".into());
        record.insert("desc".into(), "".into());
        let cmd = Command::from_record(&record).unwrap();
        assert_eq!(cmd.arg_count, 0);
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn from_record_requires_code() {
        let mut record = Record::new();
        record.insert("cmd".into(), "echo".into());
        assert!(Command::from_record(&record).is_err());
    }
}
