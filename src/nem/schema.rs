//! Explicit schema declaration.
//!
//! Every table kind has a fixed, ordered field list with defaults. Defaults
//! seed fields missing from older files; a declared field holding a value of
//! another kind is rejected when the layer loads. Fields and tables the schema
//! does not declare are carried through untouched.

use crate::error::StoreError;
use crate::model::{Record, Value, COMMANDS_TABLE};
use crate::store::codec::LayerDocument;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub default: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            default: default.into(),
        });
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fills missing fields with defaults and checks declared field kinds.
    pub fn conform(&self, mut record: Record) -> Result<Record, StoreError> {
        for field in &self.fields {
            match record.get(&field.name) {
                None => {
                    record.insert(field.name.clone(), field.default.clone());
                }
                Some(value) if value.kind() != field.default.kind() => {
                    return Err(StoreError::Schema(format!(
                        "field '{}.{}' must be a {}, found {}",
                        self.name,
                        field.name,
                        field.default.kind(),
                        value.kind()
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub version: String,
    pub tables: Vec<TableSchema>,
}

impl Schema {
    /// The schema of a nem file: a single `cmds` table.
    pub fn nem() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            tables: vec![TableSchema::new(COMMANDS_TABLE)
                .field("cmd", "")
                .field("code", "")
                .field("desc", "")
                .field("arg_count", 0i64)
                .field("args", Vec::<String>::new())],
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn require_table(&self, name: &str) -> Result<&TableSchema, StoreError> {
        self.table(name)
            .ok_or_else(|| StoreError::Schema(format!("unknown table '{}'", name)))
    }

    /// Document used as the placeholder for a source that does not exist yet.
    pub fn empty_document(&self) -> LayerDocument {
        LayerDocument {
            version: self.version.clone(),
            tables: self
                .tables
                .iter()
                .map(|t| (t.name.clone(), Vec::new()))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}
