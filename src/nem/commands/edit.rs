use crate::commands::{helpers, CmdMessage, CmdResult};
use crate::error::{NemError, Result};
use crate::resolve::resolve_codes;
use crate::store::{LayeredStore, StorageBackend};

/// Changes the code of a command in every layer it was resolved from.
pub fn run<B: StorageBackend>(
    store: &mut LayeredStore<B>,
    code: &str,
    new_code: &str,
) -> Result<CmdResult> {
    if new_code.is_empty() {
        return Err(NemError::Api("the new code cannot be empty".into()));
    }
    let table = resolve_codes(store)?;
    if table.contains(new_code) {
        return Err(NemError::CodeExists(new_code.to_string()));
    }
    let entry = table.lookup(code)?;

    for mut handle in helpers::source_rows(store, entry)? {
        handle.set("code", new_code)?;
    }

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "command `{}` code updated {} -> {}",
        entry.cmd, code, new_code
    )));
    Ok(result)
}
