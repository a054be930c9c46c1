//! Reads the YAML token file into a [`TokenSet`].

use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use tokenauth_common::{StoreError, Token, TokenSet};
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenFile {
    tokens: Option<Vec<Token>>,
}

/// What was found at the token file path.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenFileContents {
    /// The file does not exist (yet).
    Missing,
    /// The file exists but holds no YAML document.
    Empty,
    Tokens(TokenSet),
}

/// Read and parse the token file at `path`.
///
/// A missing file is not an error: it may be provisioned after startup.
pub fn read_token_file(path: &Path) -> Result<TokenFileContents, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "token file does not exist");
            return Ok(TokenFileContents::Missing);
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        return Ok(TokenFileContents::Empty);
    }

    parse_tokens(path, &content).map(TokenFileContents::Tokens)
}

/// Parse token file content. `path` is only used for error reporting.
pub fn parse_tokens(path: &Path, content: &str) -> Result<TokenSet, StoreError> {
    let file: TokenFile = serde_yaml::from_str(content).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let tokens = file.tokens.unwrap_or_default();
    for token in tokens.iter().filter(|t| t.secret.is_empty()) {
        warn!(
            path = %path.display(),
            name = %token.name,
            "token record has an empty secret"
        );
    }

    Ok(TokenSet::new(tokens))
}
