//! Token file reading, parsing, and path resolution.

mod loader;
mod paths;


pub use loader::{parse_tokens, read_token_file, TokenFileContents};
pub use paths::{default_token_file_path, resolve_token_file_path};
