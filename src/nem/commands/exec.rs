use crate::commands::CmdResult;
use crate::error::Result;
use crate::resolve::resolve_codes;
use crate::store::{LayeredStore, StorageBackend};
use crate::template;

/// Resolves `code` and fills its template with `args`.
pub fn run<B: StorageBackend, S: AsRef<str>>(
    store: &LayeredStore<B>,
    code: &str,
    args: &[S],
) -> Result<CmdResult> {
    let table = resolve_codes(store)?;
    let entry = table.lookup(code)?;
    let command = template::fill(&entry.cmd, args)?;
    tracing::debug!(code, %command, "resolved command");
    Ok(CmdResult::default().with_exec(command))
}
