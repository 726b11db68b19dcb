use crate::commands::CmdResult;
use crate::error::Result;
use crate::resolve::resolve_codes;
use crate::store::{LayeredStore, StorageBackend};

/// Every resolved command, farthest layer first.
pub fn run<B: StorageBackend>(store: &LayeredStore<B>, verbose: bool) -> Result<CmdResult> {
    let table = resolve_codes(store)?;
    let layers = store.layer_ids();
    let listed = table
        .display_order(&layers)
        .into_iter()
        .cloned()
        .collect();
    let mut result = CmdResult::default().with_listed(listed).with_layers(layers);
    result.verbose = verbose;
    Ok(result)
}
