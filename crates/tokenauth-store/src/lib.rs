//! File-backed bearer token store with live reload.
//!
//! The store keeps an allow-list of tokens read from a YAML file and follows
//! the file as it is written, removed, and recreated.
//!
//! ```yaml
//! tokens:
//!   - name: ci
//!     token: 3f9c2a
//!     description: build pipeline
//!   - name: legacy
//!     token: 77aa01
//!     is_disabled: true
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), tokenauth_common::StoreError> {
//! use tokenauth_store::TokenStore;
//!
//! let store = TokenStore::initialize("/etc/tokenauth/tokens.yml").await?;
//! if store.is_token_valid("3f9c2a") {
//!     println!("authorized");
//! }
//! # Ok(())
//! # }
//! ```

pub mod store;
pub mod token_file;
pub mod watcher;

pub use store::{ReloadOutcome, TokenStore};
pub use token_file::{default_token_file_path, read_token_file, TokenFileContents};
pub use watcher::{FileAction, TokenFileWatcher};
