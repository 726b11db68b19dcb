//! # Storage Layer
//!
//! Commands live in nem files, and any number of nem files can be in play at
//! once: one per directory on the way from the working directory up to `/`,
//! plus a root file in the user's config directory. Each file is a [`Layer`];
//! the [`LayeredStore`] owns them in load order, closest first.
//!
//! ## Reads and writes
//!
//! - [`LayeredStore::query`] walks one table across every layer and hands out
//!   [`RecordHandle`]s, views onto single rows.
//! - Writing a field through a handle does not touch the layer. The write is
//!   queued in the store's [`PendingMutations`], keyed by the row's surrogate
//!   [`RowId`], and applied by [`LayeredStore::commit`].
//! - [`LayeredStore::add`] and [`LayeredStore::delete`] change the in-memory
//!   layers right away; they reach disk on commit like everything else.
//!
//! ## Commit
//!
//! Commit first applies every queued write, then serializes each layer and
//! hands the bytes to the [`StorageBackend`]. Persisting stops at the first
//! failing layer. Layers already written stay written and the applied writes
//! stay applied, so committing again is safe.
//!
//! ## Backends
//!
//! - [`fs_backend::FsBackend`]: production, plain files
//! - [`mem_backend::MemBackend`]: in-memory, for tests

use crate::error::Result;
use crate::model::Record;
use crate::schema::Schema;
use tracing::{debug, info, warn};

pub mod backend;
pub mod codec;
pub mod fs_backend;
pub mod layer;
pub mod mem_backend;
pub mod query;
pub mod record;

pub use backend::{SourceKind, StorageBackend};
pub use layer::{Layer, LayerId, Row, RowId};
pub use query::{Cursor, Filter, LayerSelection, MatchPolicy, QuerySet};
pub use record::{Mutation, PendingMutations, RecordHandle};

use layer::RowIds;

pub struct LayeredStore<B: StorageBackend> {
    backend: B,
    schema: Schema,
    layers: Vec<Layer>,
    pending: PendingMutations,
    row_ids: RowIds,
    policy: MatchPolicy,
}

impl<B: StorageBackend> LayeredStore<B> {
    pub fn new(backend: B, schema: Schema) -> Self {
        Self {
            backend,
            schema,
            layers: Vec::new(),
            pending: PendingMutations::default(),
            row_ids: RowIds::default(),
            policy: MatchPolicy::default(),
        }
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a store and loads `sources`, closest first.
    pub fn open(backend: B, schema: Schema, sources: &[LayerId]) -> Result<Self> {
        let mut store = Self::new(backend, schema);
        store.load(sources)?;
        Ok(store)
    }

    /// Loads every source in the given order, replacing the current layers.
    ///
    /// Fails on the first source that cannot be loaded and leaves the store
    /// as it was.
    pub fn load(&mut self, sources: &[LayerId]) -> Result<()> {
        let mut layers = Vec::with_capacity(sources.len());
        for source in sources {
            layers.push(Layer::load(
                source.clone(),
                &self.backend,
                &self.schema,
                &mut self.row_ids,
            )?);
        }
        debug!(count = layers.len(), "layers loaded");
        self.layers = layers;
        self.pending.take();
        Ok(())
    }

    /// Loads one more source as the farthest layer.
    ///
    /// Returns `false` if the source is already loaded.
    pub fn attach(&mut self, source: LayerId) -> Result<bool> {
        if self.position(&source).is_some() {
            return Ok(false);
        }
        let layer = Layer::load(source, &self.backend, &self.schema, &mut self.row_ids)?;
        self.layers.push(layer);
        Ok(true)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id().clone()).collect()
    }

    pub fn closest(&self) -> Option<&LayerId> {
        self.layers.first().map(Layer::id)
    }

    /// 1-indexed position of a layer in load order.
    pub fn position(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id).map(|i| i + 1)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn match_policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn pending_mutations(&self) -> usize {
        self.pending.len()
    }

    pub fn query(&self, table: &str) -> Result<Cursor<'_>> {
        self.schema.require_table(table)?;
        Ok(Cursor::new(
            &self.layers,
            table,
            self.pending.clone(),
            self.policy,
        ))
    }

    /// Appends `record` to `table` in every targeted layer.
    ///
    /// Each layer gets its own copy; the returned handles are in layer order.
    pub fn add(
        &mut self,
        table: &str,
        record: Record,
        target: &LayerSelection,
    ) -> Result<Vec<RecordHandle>> {
        let record = self.schema.require_table(table)?.conform(record)?;
        let targets = target.resolve(&self.layers)?;

        let mut handles = Vec::with_capacity(targets.len());
        for layer in self
            .layers
            .iter_mut()
            .filter(|l| targets.contains(l.id()))
        {
            let id = self.row_ids.next_id();
            layer.push(
                table,
                Row {
                    id,
                    fields: record.clone(),
                },
            );
            debug!(layer = %layer.id(), table, "row added");
            handles.push(RecordHandle::new(
                layer.id().clone(),
                table,
                id,
                record.clone(),
                self.pending.clone(),
            ));
        }
        Ok(handles)
    }

    /// Removes every row, in every layer, whose fields equal the handle's
    /// current values.
    ///
    /// Matching is by value, not identity: identical rows in other layers go
    /// too. Use [`LayeredStore::delete_in`] to limit the reach.
    pub fn delete(&mut self, handle: &RecordHandle) -> usize {
        self.delete_matching(handle, None)
    }

    /// Like [`LayeredStore::delete`], restricted to the selected layers.
    pub fn delete_in(&mut self, handle: &RecordHandle, scope: &LayerSelection) -> Result<usize> {
        let targets = scope.resolve(&self.layers)?;
        Ok(self.delete_matching(handle, Some(&targets)))
    }

    fn delete_matching(&mut self, handle: &RecordHandle, targets: Option<&[LayerId]>) -> usize {
        let values = handle.fields();
        let mut removed = 0;
        for layer in self.layers.iter_mut() {
            if targets.is_some_and(|t| !t.contains(layer.id())) {
                continue;
            }
            removed += layer.remove_where(handle.table(), |row| &row.fields == values);
        }
        debug!(table = handle.table(), removed, "rows deleted");
        removed
    }

    /// Applies queued writes, then persists every layer.
    pub fn commit(&mut self) -> Result<()> {
        let mutations = self.pending.take();
        let applied = mutations.len();
        for mutation in mutations {
            let row = self
                .layers
                .iter_mut()
                .find_map(|layer| layer.row_mut(mutation.row));
            match row {
                Some(row) => {
                    row.fields.insert(mutation.field, mutation.value);
                }
                None => warn!(
                    row = ?mutation.row,
                    field = %mutation.field,
                    "dropping write to a deleted row"
                ),
            }
        }

        for layer in &self.layers {
            layer.persist(&self.backend).map_err(|e| {
                warn!(layer = %layer.id(), error = %e, "failed to persist layer");
                e
            })?;
        }
        info!(layers = self.layers.len(), mutations = applied, "committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::mem_backend::MemBackend;
    use super::*;
    use crate::error::{NemError, StoreError};
    use crate::model::{Command, Value, COMMANDS_TABLE};
    use std::path::Path;

    const PROJECT: &str = "/home/u/proj/.nem.toml";
    const HOME: &str = "/home/u/.nem.toml";
    const ROOT: &str = "/home/u/.config/.nem.toml";

    fn nem_file(rows: &[(&str, &str)]) -> String {
        let mut out = String::from("version = \"0.1.0\"\n");
        for (code, cmd) in rows {
            out.push_str(&format!(
                "\n[[cmds]]\ncmd = \"{}\"\ncode = \"{}\"\ndesc = \"\"\n",
                cmd, code
            ));
        }
        out
    }

    fn store_with(backend: MemBackend) -> LayeredStore<MemBackend> {
        let sources = [LayerId::from(PROJECT), LayerId::from(HOME), LayerId::from(ROOT)];
        LayeredStore::open(backend, Schema::nem(), &sources).unwrap()
    }

    fn fixture() -> LayeredStore<MemBackend> {
        store_with(
            MemBackend::new()
                .with_file(PROJECT, &nem_file(&[("b", "cargo build"), ("t", "cargo test")]))
                .with_file(HOME, &nem_file(&[("gs", "git status")]))
                .with_file(ROOT, &nem_file(&[("l", "ls -la"), ("gs", "git status")])),
        )
    }

    fn codes(handles: &[RecordHandle]) -> Vec<(String, String)> {
        handles
            .iter()
            .map(|h| {
                (
                    h.layer().to_string(),
                    h.get_str("code").unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn query_all_follows_layer_then_file_order() {
        let store = fixture();
        let all = store.query(COMMANDS_TABLE).unwrap().all();
        assert_eq!(
            codes(&all),
            vec![
                (PROJECT.to_string(), "b".to_string()),
                (PROJECT.to_string(), "t".to_string()),
                (HOME.to_string(), "gs".to_string()),
                (ROOT.to_string(), "l".to_string()),
                (ROOT.to_string(), "gs".to_string()),
            ]
        );
    }

    #[test]
    fn cursor_is_restartable() {
        let store = fixture();
        let cursor = store.query(COMMANDS_TABLE).unwrap();
        assert_eq!(cursor.rows().count(), 5);
        assert_eq!(cursor.rows().count(), 5);
    }

    #[test]
    fn load_creates_missing_sources() {
        let store = store_with(MemBackend::new());
        assert_eq!(store.layers().len(), 3);
        assert!(store.backend().contents(Path::new(ROOT)).is_some());
    }

    #[test]
    fn load_fails_fast_on_directory_source() {
        let backend = MemBackend::new().with_dir(HOME);
        let sources = [LayerId::from(PROJECT), LayerId::from(HOME), LayerId::from(ROOT)];
        let err = LayeredStore::open(backend, Schema::nem(), &sources)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            NemError::Store(StoreError::SourceUnavailable(_))
        ));
    }

    #[test]
    fn query_unknown_table_is_a_schema_error() {
        let store = fixture();
        assert!(store.query("ignore").is_err());
    }

    #[test]
    fn filter_by_one_finds_single_match() {
        let store = fixture();
        let cursor = store.query(COMMANDS_TABLE).unwrap();
        let handle = cursor.filter_by(Filter::new().eq("code", "t")).unwrap().one().unwrap();
        assert_eq!(handle.get_str("cmd"), Some("cargo test"));
        assert_eq!(handle.layer(), &LayerId::from(PROJECT));
    }

    #[test]
    fn filter_by_one_without_match_is_not_found() {
        let store = fixture();
        let cursor = store.query(COMMANDS_TABLE).unwrap();
        let err = cursor.filter_by(Filter::new().eq("code", "zz")).unwrap().one();
        assert!(matches!(err, Err(NemError::NotFound(_))));
    }

    #[test]
    fn filter_by_one_with_several_matches_follows_policy() {
        let store = fixture();
        let cursor = store.query(COMMANDS_TABLE).unwrap();
        let err = cursor.filter_by(Filter::new().eq("code", "gs")).unwrap().one();
        assert!(matches!(err, Err(NemError::Ambiguous { count: 2, .. })));

        let store = fixture().with_match_policy(MatchPolicy::First);
        let cursor = store.query(COMMANDS_TABLE).unwrap();
        let first = cursor
            .filter_by(Filter::new().eq("code", "gs"))
            .unwrap()
            .one()
            .unwrap();
        assert_eq!(first.layer(), &LayerId::from(HOME));
    }

    #[test]
    fn filter_by_can_be_restricted_to_layers() {
        let store = fixture();
        let cursor = store.query(COMMANDS_TABLE).unwrap();
        let only_root = cursor
            .filter_by(
                Filter::new()
                    .eq("code", "gs")
                    .in_layers(LayerSelection::only(LayerId::from(ROOT))),
            )
            .unwrap()
            .one()
            .unwrap();
        assert_eq!(only_root.layer(), &LayerId::from(ROOT));

        let unknown = cursor.filter_by(
            Filter::new().in_layers(LayerSelection::only(LayerId::from("/elsewhere"))),
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn writes_are_invisible_to_fresh_queries_until_commit() {
        let mut store = fixture();
        let mut handle = store
            .query(COMMANDS_TABLE)
            .unwrap()
            .filter_by(Filter::new().eq("code", "b"))
            .unwrap()
            .one()
            .unwrap();
        handle.set("code", "cb").unwrap();
        assert_eq!(handle.get_str("code"), Some("cb"));
        assert_eq!(store.pending_mutations(), 1);

        let fresh = store
            .query(COMMANDS_TABLE)
            .unwrap()
            .filter_by(Filter::new().eq("cmd", "cargo build"))
            .unwrap()
            .one()
            .unwrap();
        assert_eq!(fresh.get_str("code"), Some("b"));

        store.commit().unwrap();
        let after = store
            .query(COMMANDS_TABLE)
            .unwrap()
            .filter_by(Filter::new().eq("cmd", "cargo build"))
            .unwrap()
            .one()
            .unwrap();
        assert_eq!(after.get_str("code"), Some("cb"));
        assert_eq!(store.pending_mutations(), 0);
    }

    #[test]
    fn commit_applies_every_write_and_last_write_wins() {
        let mut store = fixture();
        let mut handles = store.query(COMMANDS_TABLE).unwrap().all();
        handles[0].set("desc", "first").unwrap();
        handles[0].set("desc", "build it").unwrap();
        handles[1].set("desc", "test it").unwrap();
        handles[3].set("cmd", "ls -lah").unwrap();
        store.commit().unwrap();

        let fresh = store.query(COMMANDS_TABLE).unwrap().all();
        assert_eq!(fresh[0].get_str("desc"), Some("build it"));
        assert_eq!(fresh[1].get_str("desc"), Some("test it"));
        assert_eq!(fresh[3].get_str("cmd"), Some("ls -lah"));

        let persisted = store.backend().contents(Path::new(ROOT)).unwrap();
        assert!(persisted.contains("ls -lah"));
    }

    #[test]
    fn commit_preserves_row_order() {
        let mut store = fixture();
        let mut handles = store.query(COMMANDS_TABLE).unwrap().all();
        handles[1].set("code", "a").unwrap();
        store.commit().unwrap();

        let project: Vec<_> = store.layers()[0]
            .rows(COMMANDS_TABLE)
            .iter()
            .map(|r| r.fields["code"].clone())
            .collect();
        assert_eq!(project, vec![Value::Str("b".into()), Value::Str("a".into())]);
    }

    #[test]
    fn add_to_closest_touches_only_first_layer() {
        let mut store = fixture();
        let cmd = Command::new("git log", "gl", "");
        let handles = store
            .add(COMMANDS_TABLE, cmd.to_record(), &LayerSelection::Closest)
            .unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].layer(), &LayerId::from(PROJECT));

        assert_eq!(store.layers()[0].rows(COMMANDS_TABLE).len(), 3);
        assert_eq!(store.layers()[1].rows(COMMANDS_TABLE).len(), 1);
        assert_eq!(store.layers()[2].rows(COMMANDS_TABLE).len(), 2);
    }

    #[test]
    fn add_to_several_layers_makes_independent_copies() {
        let mut store = fixture();
        let mut handles = store
            .add(
                COMMANDS_TABLE,
                Command::new("git log", "gl", "").to_record(),
                &LayerSelection::All,
            )
            .unwrap();
        assert_eq!(handles.len(), 3);
        handles[2].set("code", "glg").unwrap();
        store.commit().unwrap();

        let gl = store
            .query(COMMANDS_TABLE)
            .unwrap()
            .filter_by(Filter::new().eq("code", "gl"))
            .unwrap();
        assert_eq!(gl.len(), 2);
        assert_eq!(
            store.layers()[2].rows(COMMANDS_TABLE)[2].fields["code"],
            Value::Str("glg".into())
        );
    }

    #[test]
    fn add_fills_schema_defaults() {
        let mut store = fixture();
        let mut record = Record::new();
        record.insert("cmd".into(), "make".into());
        record.insert("code".into(), "m".into());
        let handles = store
            .add(COMMANDS_TABLE, record, &LayerSelection::Closest)
            .unwrap();
        assert_eq!(handles[0].get("arg_count"), Some(&Value::Int(0)));
    }

    #[test]
    fn delete_matches_by_value_across_every_layer() {
        let mut store = fixture();
        let handle = store
            .query(COMMANDS_TABLE)
            .unwrap()
            .filter_by(Filter::new().eq("code", "gs").in_layers(LayerSelection::only(HOME.into())))
            .unwrap()
            .one()
            .unwrap();

        let removed = store.delete(&handle);
        assert_eq!(removed, 2);
        assert!(store.layers()[1].rows(COMMANDS_TABLE).is_empty());
        assert_eq!(store.layers()[2].rows(COMMANDS_TABLE).len(), 1);
    }

    #[test]
    fn delete_in_limits_to_selected_layers() {
        let mut store = fixture();
        let handle = store
            .query(COMMANDS_TABLE)
            .unwrap()
            .filter_by(Filter::new().eq("code", "gs").in_layers(LayerSelection::only(HOME.into())))
            .unwrap()
            .one()
            .unwrap();

        let removed = store
            .delete_in(&handle, &LayerSelection::only(HOME.into()))
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.layers()[2].rows(COMMANDS_TABLE).len(), 2);
    }

    #[test]
    fn writes_through_deleted_handles_are_dropped() {
        let mut store = fixture();
        let mut handle = store
            .query(COMMANDS_TABLE)
            .unwrap()
            .filter_by(Filter::new().eq("code", "l"))
            .unwrap()
            .one()
            .unwrap();
        store.delete(&handle);
        handle.set("desc", "gone").unwrap();
        store.commit().unwrap();
        assert_eq!(store.layers()[2].rows(COMMANDS_TABLE).len(), 1);
    }

    #[test]
    fn failed_commit_keeps_applied_writes_and_can_be_retried() {
        let mut store = fixture();
        let mut handles = store.query(COMMANDS_TABLE).unwrap().all();
        handles[4].set("desc", "zz-root-marker").unwrap();
        handles[0].set("desc", "zz-project-marker").unwrap();

        store.backend().fail_writes_to(HOME);
        let err = store.commit().unwrap_err();
        assert!(err.is_store_error());
        assert!(store
            .backend()
            .contents(Path::new(PROJECT))
            .unwrap()
            .contains("zz-project-marker"));
        assert!(!store
            .backend()
            .contents(Path::new(ROOT))
            .unwrap()
            .contains("zz-root-marker"));
        assert_eq!(store.pending_mutations(), 0);
        let root_gs = &store.layers()[2].rows(COMMANDS_TABLE)[1];
        assert_eq!(
            root_gs.fields.get("desc").and_then(Value::as_str),
            Some("zz-root-marker")
        );

        store.backend().heal();
        store.commit().unwrap();
        assert!(store
            .backend()
            .contents(Path::new(ROOT))
            .unwrap()
            .contains("zz-root-marker"));
    }

    #[test]
    fn recommit_without_changes_rewrites_identical_bytes() {
        let mut store = fixture();
        store.commit().unwrap();
        let first = store.backend().contents(Path::new(PROJECT)).unwrap();
        store.commit().unwrap();
        assert_eq!(store.backend().contents(Path::new(PROJECT)).unwrap(), first);
    }

    #[test]
    fn attach_appends_farthest_layer_once() {
        let mut store = fixture();
        assert!(store.attach(LayerId::from("/tmp/extra.nem.toml")).unwrap());
        assert!(!store.attach(LayerId::from(PROJECT)).unwrap());
        assert_eq!(store.position(&LayerId::from("/tmp/extra.nem.toml")), Some(4));
        assert_eq!(store.closest(), Some(&LayerId::from(PROJECT)));
    }
}
