//! # nem
//!
//! nem keeps short codes for long shell commands. Codes live in nem files,
//! and every directory may have one. Inside a project you get the commands of
//! every nem file from there up to `/`, plus your personal root file. Closer
//! files win when codes clash.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (cli/, wired by main.rs)                               │
//! │  - argument parsing, prompting, rendering, running commands │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs, dispatch.rs)                                  │
//! │  - turns `/cl`-style requests and codes into operations     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs, resolve.rs)                       │
//! │  - business logic over resolved codes                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - layered record store, queued writes, commit              │
//! │  - FsBackend (production), MemBackend (tests)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing from `api.rs` inward writes to the terminal or exits the process.
//!
//! ## Codes
//!
//! A code is stored per nem file. When two files use the same code for
//! different commands, the one from the farther file is shown with the file's
//! position appended (`gs` in the second file becomes `gs2`). See
//! [`resolve`].

pub mod api;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod init;
pub mod mnemonic;
pub mod model;
pub mod resolve;
pub mod schema;
pub mod store;
pub mod template;
