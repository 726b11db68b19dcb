//! # Code Resolution
//!
//! Every layer picks its codes on its own, so the same code can show up more
//! than once across layers. Resolution folds all command rows into one table
//! where each display code names exactly one command:
//!
//! - first sighting of a code: the entry is created
//! - same code, same command: the layer is added to the entry's sources
//! - same code, different command: the row gets a new display code, the
//!   original one suffixed with the layer's 1-indexed load position, the
//!   suffix repeated until the code is free (`gs` -> `gs2` -> `gs22`)
//!
//! Rows are visited closest layer first, so closer layers keep the plain code.

use crate::error::{NemError, Result};
use crate::model::{Command, COMMANDS_TABLE};
use crate::store::{Cursor, LayerId, LayeredStore, StorageBackend};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// The code users type.
    pub code: String,
    /// The code as stored in the rows this entry came from.
    pub stored_code: String,
    pub cmd: String,
    pub desc: String,
    /// Layers that define this command under `stored_code`, in load order,
    /// each listed once.
    pub layers: Vec<LayerId>,
}

/// Display code to command, in resolution order.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    entries: Vec<ResolvedCommand>,
    by_code: HashMap<String, usize>,
}

impl CodeTable {
    pub fn get(&self, code: &str) -> Option<&ResolvedCommand> {
        self.by_code.get(code).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedCommand> {
        self.entries.iter()
    }

    pub fn lookup(&self, code: &str) -> Result<&ResolvedCommand> {
        self.get(code)
            .ok_or_else(|| NemError::UnknownCode(code.to_string()))
    }

    fn insert(&mut self, entry: ResolvedCommand) {
        self.by_code.insert(entry.code.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Entries ordered farthest layer first.
    ///
    /// Each entry is listed under the farthest layer it comes from, so the
    /// closest layer's commands end up last, nearest the prompt.
    pub fn display_order(&self, layers: &[LayerId]) -> Vec<&ResolvedCommand> {
        let mut listed = vec![false; self.entries.len()];
        let mut out = Vec::with_capacity(self.entries.len());
        for layer in layers.iter().rev() {
            for (i, entry) in self.entries.iter().enumerate() {
                if !listed[i] && entry.layers.contains(layer) {
                    listed[i] = true;
                    out.push(entry);
                }
            }
        }
        out
    }
}

/// Resolves the command rows visible through `cursor`.
pub fn resolve(cursor: &Cursor<'_>) -> Result<CodeTable> {
    let mut table = CodeTable::default();

    for (layer, row) in cursor.rows() {
        let command = Command::from_record(&row.fields)?;

        let existing = table.by_code.get(&command.code).copied();
        match existing {
            None => table.insert(entry(command.code.clone(), command, layer)),
            Some(i) if table.entries[i].cmd == command.cmd => {
                let layers = &mut table.entries[i].layers;
                if !layers.contains(layer) {
                    layers.push(layer.clone());
                }
            }
            Some(_) => {
                let suffix = cursor.position(layer).unwrap_or_default().to_string();
                let mut code = format!("{}{}", command.code, suffix);
                while table.contains(&code) {
                    code.push_str(&suffix);
                }
                table.insert(entry(code, command, layer));
            }
        }
    }

    Ok(table)
}

/// Resolves the `cmds` table of a store.
pub fn resolve_codes<B: StorageBackend>(store: &LayeredStore<B>) -> Result<CodeTable> {
    resolve(&store.query(COMMANDS_TABLE)?)
}

fn entry(code: String, command: Command, layer: &LayerId) -> ResolvedCommand {
    ResolvedCommand {
        code,
        stored_code: command.code,
        cmd: command.cmd,
        desc: command.desc,
        layers: vec![layer.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::store::mem_backend::MemBackend;

    fn nem_file(rows: &[(&str, &str)]) -> String {
        let mut out = String::from("version = \"0.1.0\"\n");
        for (code, cmd) in rows {
            out.push_str(&format!(
                "\n[[cmds]]\ncmd = \"{}\"\ncode = \"{}\"\ndesc = \"{} desc\"\n",
                cmd, code, code
            ));
        }
        out
    }

    fn store(layers: &[&[(&str, &str)]]) -> LayeredStore<MemBackend> {
        let mut backend = MemBackend::new();
        let mut ids = Vec::new();
        for (i, rows) in layers.iter().enumerate() {
            let path = format!("/l{}/.nem.toml", i + 1);
            backend = backend.with_file(path.as_str(), &nem_file(rows));
            ids.push(LayerId::from(path.as_str()));
        }
        LayeredStore::open(backend, Schema::nem(), &ids).unwrap()
    }

    fn id(n: usize) -> LayerId {
        LayerId::from(format!("/l{}/.nem.toml", n).as_str())
    }

    #[test]
    fn same_code_same_command_is_merged() {
        let s = store(&[&[("gs", "git status")], &[("gs", "git status")]]);
        let table = resolve_codes(&s).unwrap();
        assert_eq!(table.len(), 1);
        let gs = table.get("gs").unwrap();
        assert_eq!(gs.cmd, "git status");
        assert_eq!(gs.layers, vec![id(1), id(2)]);
    }

    #[test]
    fn duplicate_rows_in_one_layer_list_the_layer_once() {
        let s = store(&[
            &[("gs", "git status"), ("gs", "git status")],
            &[("gs", "git status")],
        ]);
        let table = resolve_codes(&s).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("gs").unwrap().layers, vec![id(1), id(2)]);
    }

    #[test]
    fn collision_gets_layer_suffix() {
        let s = store(&[&[("gs", "git status")], &[("gs", "git stash")]]);
        let table = resolve_codes(&s).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("gs").unwrap().cmd, "git status");
        assert_eq!(table.get("gs").unwrap().layers, vec![id(1)]);

        let gs2 = table.get("gs2").unwrap();
        assert_eq!(gs2.cmd, "git stash");
        assert_eq!(gs2.stored_code, "gs");
        assert_eq!(gs2.desc, "gs desc");
        assert_eq!(gs2.layers, vec![id(2)]);
    }

    #[test]
    fn collision_suffix_escalates_past_taken_codes() {
        let s = store(&[
            &[("gs", "git status"), ("gs2", "git show")],
            &[("gs", "git stash"), ("gs", "git switch")],
        ]);
        let table = resolve_codes(&s).unwrap();
        assert_eq!(table.get("gs2").unwrap().cmd, "git show");
        assert_eq!(table.get("gs22").unwrap().cmd, "git stash");
        assert_eq!(table.get("gs222").unwrap().cmd, "git switch");
    }

    #[test]
    fn suffix_uses_load_position() {
        let s = store(&[
            &[("e", "echo one")],
            &[],
            &[("e", "echo three")],
        ]);
        let table = resolve_codes(&s).unwrap();
        assert_eq!(table.get("e3").unwrap().cmd, "echo three");
    }

    #[test]
    fn resolution_is_deterministic() {
        let s = store(&[&[("gs", "git status")], &[("gs", "git stash")]]);
        let a: Vec<_> = resolve_codes(&s).unwrap().iter().cloned().collect();
        let b: Vec<_> = resolve_codes(&s).unwrap().iter().cloned().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn lookup_unknown_code_fails() {
        let s = store(&[&[("gs", "git status")]]);
        let table = resolve_codes(&s).unwrap();
        assert!(matches!(table.lookup("zz"), Err(NemError::UnknownCode(_))));
    }

    #[test]
    fn display_order_lists_farthest_layer_first() {
        let s = store(&[
            &[("b", "cargo build"), ("gs", "git status")],
            &[("gs", "git status"), ("l", "ls")],
        ]);
        let table = resolve_codes(&s).unwrap();
        let ordered: Vec<_> = table
            .display_order(&s.layer_ids())
            .into_iter()
            .map(|e| e.code.as_str())
            .collect();
        assert_eq!(ordered, vec!["gs", "l", "b"]);
    }
}
