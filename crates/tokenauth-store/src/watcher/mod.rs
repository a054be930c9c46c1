//! Token file watcher.
//!
//! Uses the `notify` crate to watch the token file's directory and turns
//! write and remove events on the file into store reloads and clears.

mod token_watcher;

#[cfg(test)]
mod tests;

pub use token_watcher::{classify, FileAction, TokenFileWatcher};

#[cfg(test)]
pub(crate) use token_watcher::run_event_loop;
