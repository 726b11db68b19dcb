use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::error::Result;
use crate::resolve::resolve_codes;
use crate::store::{LayeredStore, StorageBackend};

/// Sets the description of a command.
pub fn run<B: StorageBackend>(
    store: &mut LayeredStore<B>,
    code: &str,
    text: &str,
) -> Result<CmdResult> {
    let table = resolve_codes(store)?;
    let entry = table.lookup(code)?;

    for mut handle in helpers::source_rows(store, entry)? {
        handle.set("desc", text)?;
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "documented [{}] `{}`",
        code, entry.cmd
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::two_layers;

    #[test]
    fn documents_duplicate_rows_in_one_layer() {
        let mut store = two_layers(&[("gs", "git status"), ("gs", "git status")], &[]);
        run(&mut store, "gs", "show status").unwrap();
        store.commit().unwrap();
        let gs = resolve_codes(&store).unwrap().get("gs").cloned().unwrap();
        assert_eq!(gs.desc, "show status");
        assert_eq!(gs.layers.len(), 1);
    }

    #[test]
    fn sets_description() {
        let mut store = two_layers(&[("b", "cargo build")], &[]);
        run(&mut store, "b", "debug build").unwrap();
        store.commit().unwrap();
        assert_eq!(
            resolve_codes(&store).unwrap().get("b").unwrap().desc,
            "debug build"
        );
    }
}
