use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read token file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse token file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("token file watch error: {0}")]
    Watch(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TokenAuthError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
