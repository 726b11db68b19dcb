use super::layer::{Layer, LayerId, Row};
use super::record::{PendingMutations, RecordHandle};
use crate::error::{NemError, Result, StoreError};
use crate::model::{Record, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which layers an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSelection {
    /// The first layer in load order.
    Closest,
    All,
    Only(Vec<LayerId>),
}

impl LayerSelection {
    pub fn only(id: LayerId) -> Self {
        LayerSelection::Only(vec![id])
    }

    /// Resolves to concrete ids, in load order.
    pub(crate) fn resolve(
        &self,
        layers: &[Layer],
    ) -> std::result::Result<Vec<LayerId>, StoreError> {
        match self {
            LayerSelection::Closest => layers
                .first()
                .map(|l| vec![l.id().clone()])
                .ok_or(StoreError::NoLayers),
            LayerSelection::All => Ok(layers.iter().map(|l| l.id().clone()).collect()),
            LayerSelection::Only(ids) => {
                for id in ids {
                    if !layers.iter().any(|l| l.id() == id) {
                        return Err(StoreError::UnknownLayer(id.path().to_path_buf()));
                    }
                }
                Ok(layers
                    .iter()
                    .filter(|l| ids.contains(l.id()))
                    .map(|l| l.id().clone())
                    .collect())
            }
        }
    }
}

/// What `QuerySet::one` does when several rows match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// More than one match is an error.
    #[default]
    Unique,
    /// Take the first match in layer order.
    First,
}

/// Field-equality predicate, optionally restricted to some layers.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    eq: Vec<(String, Value)>,
    layers: Option<LayerSelection>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.eq.push((field.into(), value.into()));
        self
    }

    pub fn in_layers(mut self, layers: LayerSelection) -> Self {
        self.layers = Some(layers);
        self
    }

    fn matches(&self, record: &Record) -> bool {
        self.eq
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .eq
            .iter()
            .map(|(field, value)| format!("{} = {}", field, value))
            .collect();
        if parts.is_empty() {
            f.write_str("<any>")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Lazy, restartable walk over one table across layers.
///
/// Rows come in layer order, then in file order within a layer.
pub struct Cursor<'a> {
    layers: &'a [Layer],
    table: String,
    pending: PendingMutations,
    policy: MatchPolicy,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(
        layers: &'a [Layer],
        table: impl Into<String>,
        pending: PendingMutations,
        policy: MatchPolicy,
    ) -> Self {
        Self {
            layers,
            table: table.into(),
            pending,
            policy,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Every `(layer, row)` pair. Each call starts from the beginning.
    pub fn rows(&self) -> impl Iterator<Item = (&'a LayerId, &'a Row)> + '_ {
        let table = self.table.as_str();
        self.layers
            .iter()
            .flat_map(move |layer| layer.rows(table).iter().map(move |row| (layer.id(), row)))
    }

    /// 1-indexed position of a layer in load order.
    pub fn position(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id).map(|i| i + 1)
    }

    pub fn layer_ids(&self) -> impl Iterator<Item = &'a LayerId> {
        self.layers.iter().map(Layer::id)
    }

    pub fn all(&self) -> Vec<RecordHandle> {
        self.rows().map(|(id, row)| self.handle(id, row)).collect()
    }

    pub fn filter_by(&self, filter: Filter) -> Result<QuerySet> {
        let allowed = match &filter.layers {
            Some(selection) => Some(selection.resolve(self.layers)?),
            None => None,
        };
        let handles = self
            .rows()
            .filter(|(id, _)| allowed.as_ref().map_or(true, |a| a.contains(id)))
            .filter(|(_, row)| filter.matches(&row.fields))
            .map(|(id, row)| self.handle(id, row))
            .collect();
        Ok(QuerySet {
            handles,
            description: filter.to_string(),
            policy: self.policy,
        })
    }

    fn handle(&self, id: &LayerId, row: &Row) -> RecordHandle {
        RecordHandle::new(
            id.clone(),
            self.table.clone(),
            row.id,
            row.fields.clone(),
            self.pending.clone(),
        )
    }
}

/// Result of a filtered query.
#[derive(Debug)]
pub struct QuerySet {
    handles: Vec<RecordHandle>,
    description: String,
    policy: MatchPolicy,
}

impl QuerySet {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecordHandle> {
        self.handles.iter()
    }

    pub fn first(self) -> Option<RecordHandle> {
        self.handles.into_iter().next()
    }

    /// Exactly one handle, or `NotFound`. Several matches are resolved by the
    /// store's [`MatchPolicy`].
    pub fn one(self) -> Result<RecordHandle> {
        match (self.handles.len(), self.policy) {
            (0, _) => Err(NemError::NotFound(self.description)),
            (1, _) | (_, MatchPolicy::First) => self
                .handles
                .into_iter()
                .next()
                .ok_or(NemError::NotFound(self.description)),
            (count, MatchPolicy::Unique) => Err(NemError::Ambiguous {
                filter: self.description,
                count,
            }),
        }
    }
}

impl IntoIterator for QuerySet {
    type Item = RecordHandle;
    type IntoIter = std::vec::IntoIter<RecordHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}
