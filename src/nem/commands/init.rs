use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NemError, Result};
use crate::store::{LayerId, LayeredStore, StorageBackend};
use std::path::Path;

/// Creates (or loads) a nem file at each path and adds it as a layer.
///
/// Relative paths are taken from `base`. New files are written as empty
/// placeholders right away.
pub fn run<B: StorageBackend, P: AsRef<Path>>(
    store: &mut LayeredStore<B>,
    base: &Path,
    paths: &[P],
) -> Result<CmdResult> {
    if paths.is_empty() {
        return Err(NemError::Api("please specify at least one nem file path".into()));
    }

    let mut result = CmdResult::default();
    for path in paths {
        let path = base.join(path.as_ref());
        let id = LayerId::from(path);
        if store.attach(id.clone())? {
            result.add_message(CmdMessage::success(format!("initialized nem file {}", id)));
        } else {
            result.add_message(CmdMessage::info(format!("nem file {} is already in use", id)));
        }
    }
    Ok(result)
}
