use crate::api::NemApi;
use crate::config::NemConfig;
use crate::discovery::gather_sources;
use crate::error::Result;
use crate::schema::Schema;
use crate::store::fs_backend::FsBackend;
use crate::store::LayeredStore;
use std::path::Path;

pub struct NemContext {
    pub api: NemApi<FsBackend>,
    pub config: NemConfig,
}

/// Opens every nem file that applies to `cwd`.
///
/// The root nem file is created on the spot if it does not exist yet.
pub fn initialize(cwd: &Path, config: NemConfig) -> Result<NemContext> {
    let root_db = config.root_db_path()?;
    let sources = gather_sources(cwd, &config.file_name, &root_db);
    let store = LayeredStore::open(FsBackend::new(), Schema::nem(), &sources)?
        .with_match_policy(config.match_policy);
    Ok(NemContext {
        api: NemApi::new(store, cwd),
        config,
    })
}
