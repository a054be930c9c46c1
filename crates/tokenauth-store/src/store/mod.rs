//! The live-reloading token store.
//!
//! Combines the token file loader with the file watcher so the in-memory
//! token set follows the file on disk.

mod token_store;


pub use token_store::{ReloadOutcome, TokenStore};
