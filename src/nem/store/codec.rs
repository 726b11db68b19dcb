//! Layer (de)serialization.
//!
//! A layer on disk is a document with a `version` string and one array per
//! table:
//!
//! ```toml
//! version = "0.2.0"
//!
//! [[cmds]]
//! cmd = "git status"
//! code = "gs"
//! desc = ""
//! arg_count = 0
//! args = []
//! ```
//!
//! Files written by older releases nest the tables under `__table__` and keep
//! command arguments as `[short, name, default, description]` tuples. Both are
//! read and written back in the current layout, each tuple becoming the
//! `short=default` text of its placeholder.
//!
//! TOML is the default format. Sources with a `.json` extension use JSON.

use crate::model::{Record, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDocument")]
pub struct LayerDocument {
    pub version: String,
    #[serde(flatten)]
    pub tables: BTreeMap<String, Vec<Record>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Value(Value),
    /// Legacy argument tuples: `[short, name, default, description]`.
    Tuples(Vec<Vec<String>>),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Value(value) => value,
            RawValue::Tuples(tuples) => Value::List(
                tuples
                    .into_iter()
                    .map(|tuple| {
                        let short = tuple.first().cloned().unwrap_or_default();
                        match tuple.get(2).filter(|d| !d.is_empty()) {
                            Some(default) => format!("{}={}", short, default),
                            None => short,
                        }
                    })
                    .collect(),
            ),
        }
    }
}

type RawRecord = BTreeMap<String, RawValue>;

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    version: String,
    #[serde(rename = "__table__", default)]
    nested: BTreeMap<String, Vec<RawRecord>>,
    #[serde(flatten)]
    tables: BTreeMap<String, Vec<RawRecord>>,
}

fn into_records(rows: Vec<RawRecord>) -> impl Iterator<Item = Record> {
    rows.into_iter().map(|row| {
        row.into_iter()
            .map(|(field, value)| (field, Value::from(value)))
            .collect()
    })
}

impl From<RawDocument> for LayerDocument {
    fn from(raw: RawDocument) -> Self {
        let mut tables: BTreeMap<String, Vec<Record>> = raw
            .tables
            .into_iter()
            .map(|(name, rows)| (name, into_records(rows).collect()))
            .collect();
        for (name, rows) in raw.nested {
            tables.entry(name).or_default().extend(into_records(rows));
        }
        LayerDocument {
            version: raw.version,
            tables,
        }
    }
}

/// Turns a layer document into bytes and back.
///
/// `encode` must be a pure function of the document so that committing an
/// unchanged layer rewrites identical bytes.
pub trait LayerCodec {
    fn name(&self) -> &'static str;
    fn encode(&self, doc: &LayerDocument) -> Result<Vec<u8>, String>;
    fn decode(&self, bytes: &[u8]) -> Result<LayerDocument, String>;
}

pub struct TomlCodec;

impl LayerCodec for TomlCodec {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn encode(&self, doc: &LayerDocument) -> Result<Vec<u8>, String> {
        toml::to_string(doc)
            .map(String::into_bytes)
            .map_err(|e| e.to_string())
    }

    fn decode(&self, bytes: &[u8]) -> Result<LayerDocument, String> {
        let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
        toml::from_str(text).map_err(|e| e.to_string())
    }
}

pub struct JsonCodec;

impl LayerCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, doc: &LayerDocument) -> Result<Vec<u8>, String> {
        let mut out = serde_json::to_vec_pretty(doc).map_err(|e| e.to_string())?;
        out.push(b'\n');
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<LayerDocument, String> {
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }
}

static TOML_CODEC: TomlCodec = TomlCodec;
static JSON_CODEC: JsonCodec = JsonCodec;

/// Picks the codec for a source from its extension.
pub fn codec_for(path: &Path) -> &'static dyn LayerCodec {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => &JSON_CODEC,
        _ => &TOML_CODEC,
    }
}
