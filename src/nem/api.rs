//! # API Facade
//!
//! [`NemApi`] is the single entry point into nem for any front end. It owns
//! the [`LayeredStore`], routes requests to the command layer and hands back
//! [`CmdResult`]s. It never prints and never runs anything: an exec request
//! comes back as a resolved command line for the caller to run.
//!
//! Changes made by a request stay in memory until [`NemApi::commit`].
//!
//! `NemApi<B>` is generic over the storage backend, so the whole request path
//! can be tested against [`crate::store::mem_backend::MemBackend`].

use crate::commands::{self, CmdResult, Prompter};
use crate::dispatch::{self, Operation, Request};
use crate::error::Result;
use crate::store::{LayeredStore, StorageBackend};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct NemApi<B: StorageBackend> {
    store: LayeredStore<B>,
    cwd: PathBuf,
}

impl<B: StorageBackend> NemApi<B> {
    /// `cwd` is the base for relative paths given to `nem init`.
    pub fn new(store: LayeredStore<B>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            store,
            cwd: cwd.into(),
        }
    }

    pub fn store(&self) -> &LayeredStore<B> {
        &self.store
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Parses raw arguments and runs the request they describe.
    pub fn handle_request<S: AsRef<str>>(
        &mut self,
        args: &[S],
        prompter: &mut dyn Prompter,
    ) -> Result<CmdResult> {
        let request = dispatch::parse(args)?;
        debug!(?request, "dispatching");
        match request {
            Request::Exec { code, args } => self.exec(&code, &args),
            Request::Run { op, opts, args } => match op {
                Operation::Create => self.create_command(&args, prompter),
                Operation::Document => self.document_command(&args[0], &args[1..].join(" ")),
                Operation::Edit => self.edit_command(&args[0], &args[1]),
                Operation::Find => self.find_commands(&args.join(" ")),
                Operation::List => self.list_commands(opts.contains(&'v')),
                Operation::Remove => self.remove_command(&args[0]),
                Operation::Init => self.init_sources(&args),
                Operation::Help(resource) => Ok(self.help(resource)),
            },
        }
    }

    pub fn create_command<S: AsRef<str>>(
        &mut self,
        words: &[S],
        prompter: &mut dyn Prompter,
    ) -> Result<CmdResult> {
        commands::create::run(&mut self.store, words, prompter)
    }

    pub fn document_command(&mut self, code: &str, text: &str) -> Result<CmdResult> {
        commands::document::run(&mut self.store, code, text)
    }

    pub fn edit_command(&mut self, code: &str, new_code: &str) -> Result<CmdResult> {
        commands::edit::run(&mut self.store, code, new_code)
    }

    pub fn find_commands(&self, query: &str) -> Result<CmdResult> {
        commands::find::run(&self.store, query)
    }

    pub fn list_commands(&self, verbose: bool) -> Result<CmdResult> {
        commands::list::run(&self.store, verbose)
    }

    pub fn remove_command(&mut self, code: &str) -> Result<CmdResult> {
        commands::remove::run(&mut self.store, code)
    }

    pub fn init_sources<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<CmdResult> {
        commands::init::run(&mut self.store, &self.cwd, paths)
    }

    pub fn exec<S: AsRef<str>>(&self, code: &str, args: &[S]) -> Result<CmdResult> {
        commands::exec::run(&self.store, code, args)
    }

    pub fn help(&self, resource: Option<&str>) -> CmdResult {
        CmdResult::default().with_help(dispatch::help_text(resource))
    }

    /// Writes every pending change to the backing sources.
    pub fn commit(&mut self) -> Result<()> {
        self.store.commit()
    }
}
