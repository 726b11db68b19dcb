use crate::commands::CmdResult;
use crate::error::Result;
use crate::resolve::resolve_codes;
use crate::store::{LayeredStore, StorageBackend};

/// Resolved commands whose code or command text contains `query`.
pub fn run<B: StorageBackend>(store: &LayeredStore<B>, query: &str) -> Result<CmdResult> {
    let table = resolve_codes(store)?;
    let matches = table
        .iter()
        .filter(|e| e.cmd.contains(query) || e.code.contains(query))
        .cloned()
        .collect();
    Ok(CmdResult::default()
        .with_listed(matches)
        .with_layers(store.layer_ids()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::fixtures::two_layers;

    #[test]
    fn matches_code_or_command() {
        let store = two_layers(&[("b", "cargo build"), ("gs", "git status")], &[("l", "ls")]);
        let result = run(&store, "git").unwrap();
        assert_eq!(result.listed.len(), 1);
        assert_eq!(result.listed[0].code, "gs");

        let result = run(&store, "l").unwrap();
        let codes: Vec<_> = result.listed.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["b", "l"]);
    }
}
