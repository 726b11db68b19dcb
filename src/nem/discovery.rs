use crate::store::LayerId;
use std::path::Path;
use tracing::debug;

/// Collects the nem files that apply to `cwd`, closest first.
///
/// Walks from `cwd` up towards `/` (the filesystem root itself is not
/// searched) collecting every regular file called `file_name`, then appends
/// `root_db`, the fallback that is always in play. A root file met during the
/// walk is not listed twice.
pub fn gather_sources(cwd: &Path, file_name: &str, root_db: &Path) -> Vec<LayerId> {
    let mut sources = Vec::new();
    let mut current = Some(cwd);

    while let Some(dir) = current {
        let parent = dir.parent();
        if parent.is_none() {
            break;
        }
        let candidate = dir.join(file_name);
        debug!(dir = %dir.display(), "searching for nem file");
        if candidate.is_file() {
            sources.push(LayerId::from(candidate));
        }
        current = parent;
    }

    let root = LayerId::from(root_db);
    if !sources.contains(&root) {
        sources.push(root);
    }
    debug!(?sources, "gathered nem files");
    sources
}
