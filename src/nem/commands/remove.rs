use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NemError, Result, StoreError};
use crate::model::COMMANDS_TABLE;
use crate::store::{Filter, LayerSelection, LayeredStore, StorageBackend};

/// Removes the command stored under `code` in the closest layer.
///
/// Farther layers are left alone, even if they hold an identical row.
pub fn run<B: StorageBackend>(store: &mut LayeredStore<B>, code: &str) -> Result<CmdResult> {
    let closest = store.closest().cloned().ok_or(StoreError::NoLayers)?;
    let handle = store
        .query(COMMANDS_TABLE)?
        .filter_by(
            Filter::new()
                .eq("code", code)
                .in_layers(LayerSelection::Closest),
        )?
        .one()
        .map_err(|e| match e {
            NemError::NotFound(_) => {
                NemError::NotFound(format!("code {} in nem file {}", code, closest))
            }
            other => other,
        })?;

    store.delete_in(&handle, &LayerSelection::Closest)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "removed command `{}` with code {}",
        handle.get_str("cmd").unwrap_or_default(),
        code
    )));
    result.affected.push(handle.to_command()?);
    Ok(result)
}
