use super::layer::{LayerId, RowId};
use crate::error::{Result, StoreError};
use crate::model::{Command, Record, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub row: RowId,
    pub field: String,
    pub value: Value,
}

/// Field writes waiting for the next commit, in the order they were made.
///
/// Shared between the store and every handle it hands out. Applying the queue
/// front to back makes the last write to a field win.
#[derive(Debug, Default, Clone)]
pub struct PendingMutations(Rc<RefCell<Vec<Mutation>>>);

impl PendingMutations {
    pub fn push(&self, mutation: Mutation) {
        self.0.borrow_mut().push(mutation);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn take(&self) -> Vec<Mutation> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// A mutation-tracking view onto one row of one layer.
///
/// Reads see the row as it was when the handle was made plus this handle's
/// own writes. Writes go to the store's pending queue and reach the layer
/// only on commit. A handle whose row has been deleted is stale; writes made
/// through it are dropped at commit.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    layer: LayerId,
    table: String,
    row: RowId,
    fields: Record,
    pending: PendingMutations,
}

impl RecordHandle {
    pub(crate) fn new(
        layer: LayerId,
        table: impl Into<String>,
        row: RowId,
        fields: Record,
        pending: PendingMutations,
    ) -> Self {
        Self {
            layer,
            table: table.into(),
            row,
            fields,
            pending,
        }
    }

    pub fn layer(&self) -> &LayerId {
        &self.layer
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn row_id(&self) -> RowId {
        self.row
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Queues a field write. The field must exist and keep its value kind.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.fields.get(field) {
            None => {
                return Err(StoreError::Schema(format!(
                    "table '{}' has no field '{}'",
                    self.table, field
                ))
                .into())
            }
            Some(current) if current.kind() != value.kind() => {
                return Err(StoreError::Schema(format!(
                    "field '{}.{}' must be a {}, got {}",
                    self.table,
                    field,
                    current.kind(),
                    value.kind()
                ))
                .into())
            }
            Some(_) => {}
        }

        debug!(layer = %self.layer, row = ?self.row, field, "queueing field write");
        self.pending.push(Mutation {
            row: self.row,
            field: field.to_string(),
            value: value.clone(),
        });
        self.fields.insert(field.to_string(), value);
        Ok(())
    }

    pub fn to_command(&self) -> Result<Command> {
        Command::from_record(&self.fields)
    }
}
