use super::backend::{SourceKind, StorageBackend};
use super::codec::{codec_for, LayerDocument};
use crate::error::StoreError;
use crate::model::Record;
use crate::schema::Schema;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identity of a layer: the path of the file it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(PathBuf);

impl LayerId {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<PathBuf> for LayerId {
    fn from(p: PathBuf) -> Self {
        Self(p)
    }
}

impl From<&Path> for LayerId {
    fn from(p: &Path) -> Self {
        Self(p.to_path_buf())
    }
}

impl From<&str> for LayerId {
    fn from(p: &str) -> Self {
        Self(PathBuf::from(p))
    }
}

/// Surrogate key of an in-memory row.
///
/// Assigned when the row is loaded or added and never persisted. Keys are
/// unique across every layer of a store, so a mutation can be routed by key
/// alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

#[derive(Debug, Default)]
pub struct RowIds {
    next: u64,
}

impl RowIds {
    pub fn next_id(&mut self) -> RowId {
        self.next += 1;
        RowId(self.next)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub fields: Record,
}

/// The in-memory contents of one source.
///
/// Rows keep their file order: they are appended, removed, or edited in
/// place, never reordered.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    version: String,
    tables: BTreeMap<String, Vec<Row>>,
}

impl Layer {
    /// Loads a source, writing an empty placeholder first if it does not exist.
    pub fn load<B: StorageBackend>(
        id: LayerId,
        backend: &B,
        schema: &Schema,
        ids: &mut RowIds,
    ) -> Result<Self, StoreError> {
        debug!(source = %id, "loading layer");
        let doc = match backend.probe(id.path())? {
            SourceKind::Other => return Err(StoreError::SourceUnavailable(id.0)),
            SourceKind::Missing => {
                debug!(source = %id, "source missing, writing placeholder");
                let doc = schema.empty_document();
                let bytes = encode(&id, &doc)?;
                backend.write(id.path(), &bytes)?;
                doc
            }
            SourceKind::File => {
                let bytes = backend.read(id.path())?;
                codec_for(id.path())
                    .decode(&bytes)
                    .map_err(|message| StoreError::Decode {
                        path: id.0.clone(),
                        message,
                    })?
            }
        };
        Self::from_document(id, doc, schema, ids)
    }

    pub fn from_document(
        id: LayerId,
        doc: LayerDocument,
        schema: &Schema,
        ids: &mut RowIds,
    ) -> Result<Self, StoreError> {
        let mut tables = BTreeMap::new();
        for (name, records) in doc.tables {
            let table_schema = schema.table(&name);
            let mut rows = Vec::with_capacity(records.len());
            for record in records {
                let fields = match table_schema {
                    Some(t) => t.conform(record).map_err(|e| with_source(e, &id))?,
                    None => record,
                };
                rows.push(Row {
                    id: ids.next_id(),
                    fields,
                });
            }
            tables.insert(name, rows);
        }
        for table in &schema.tables {
            tables.entry(table.name.clone()).or_insert_with(Vec::new);
        }
        Ok(Self {
            id,
            version: doc.version,
            tables,
        })
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.tables
            .values_mut()
            .flat_map(|rows| rows.iter_mut())
            .find(|row| row.id == id)
    }

    pub fn push(&mut self, table: &str, row: Row) {
        self.tables.entry(table.to_string()).or_default().push(row);
    }

    /// Removes every row of `table` for which `remove` holds; returns how many.
    pub fn remove_where<F: Fn(&Row) -> bool>(&mut self, table: &str, remove: F) -> usize {
        match self.tables.get_mut(table) {
            Some(rows) => {
                let before = rows.len();
                rows.retain(|row| !remove(row));
                before - rows.len()
            }
            None => 0,
        }
    }

    pub fn to_document(&self) -> LayerDocument {
        LayerDocument {
            version: self.version.clone(),
            tables: self
                .tables
                .iter()
                .map(|(name, rows)| {
                    (
                        name.clone(),
                        rows.iter().map(|r| r.fields.clone()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Encodes the current state with the codec matching the source.
    pub fn serialize(&self) -> Result<Vec<u8>, StoreError> {
        encode(&self.id, &self.to_document())
    }

    pub fn persist<B: StorageBackend>(&self, backend: &B) -> Result<(), StoreError> {
        let bytes = self.serialize()?;
        backend.write(self.id.path(), &bytes)
    }
}

fn encode(id: &LayerId, doc: &LayerDocument) -> Result<Vec<u8>, StoreError> {
    codec_for(id.path())
        .encode(doc)
        .map_err(|message| StoreError::Encode {
            path: id.0.clone(),
            message,
        })
}

fn with_source(err: StoreError, id: &LayerId) -> StoreError {
    match err {
        StoreError::Schema(msg) => StoreError::Schema(format!("{} in {}", msg, id)),
        other => other,
    }
}
