use crate::error::{NemError, Result};
use crate::model::COMMANDS_TABLE;
use crate::resolve::ResolvedCommand;
use crate::store::{Filter, LayerSelection, LayeredStore, RecordHandle, StorageBackend};

/// Handles for the rows a resolved entry was built from.
///
/// A replicated command yields a handle for every copy, duplicates within one
/// layer included, so they can be updated together.
pub fn source_rows<B: StorageBackend>(
    store: &LayeredStore<B>,
    entry: &ResolvedCommand,
) -> Result<Vec<RecordHandle>> {
    let cursor = store.query(COMMANDS_TABLE)?;
    let mut handles = Vec::with_capacity(entry.layers.len());
    for layer in &entry.layers {
        let rows = cursor.filter_by(
            Filter::new()
                .eq("code", entry.stored_code.as_str())
                .eq("cmd", entry.cmd.as_str())
                .in_layers(LayerSelection::only(layer.clone())),
        )?;
        if rows.is_empty() {
            return Err(NemError::NotFound(format!(
                "[{}] `{}` in nem file {}",
                entry.stored_code, entry.cmd, layer
            )));
        }
        handles.extend(rows);
    }
    Ok(handles)
}

/// Stored codes of the rows in the closest layer.
pub fn closest_codes<B: StorageBackend>(store: &LayeredStore<B>) -> Result<Vec<String>> {
    let rows = store
        .query(COMMANDS_TABLE)?
        .filter_by(Filter::new().in_layers(LayerSelection::Closest))?;
    Ok(rows
        .iter()
        .filter_map(|h| h.get_str("code").map(str::to_string))
        .collect())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::schema::Schema;
    use crate::store::mem_backend::MemBackend;
    use crate::store::{LayerId, LayeredStore};

    pub const PROJECT: &str = "/home/u/proj/.nem.toml";
    pub const ROOT: &str = "/home/u/.config/.nem.toml";

    pub fn nem_file(rows: &[(&str, &str)]) -> String {
        let mut out = String::from("version = \"0.1.0\"\n");
        for (code, cmd) in rows {
            out.push_str(&format!(
                "\n[[cmds]]\ncmd = \"{}\"\ncode = \"{}\"\ndesc = \"\"\n",
                cmd, code
            ));
        }
        out
    }

    /// A project layer over a root layer.
    pub fn two_layers(project: &[(&str, &str)], root: &[(&str, &str)]) -> LayeredStore<MemBackend> {
        let backend = MemBackend::new()
            .with_file(PROJECT, &nem_file(project))
            .with_file(ROOT, &nem_file(root));
        LayeredStore::open(
            backend,
            Schema::nem(),
            &[LayerId::from(PROJECT), LayerId::from(ROOT)],
        )
        .unwrap()
    }
}
