//! Core token store implementation.
//!
//! Contains the [`TokenStore`] struct: the authoritative in-memory token set
//! for one token file, with reload/clear/query under a single lock.

use crate::token_file::{self, TokenFileContents};
use crate::watcher::TokenFileWatcher;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokenauth_common::{EventBus, StoreError, StoreEvent, TokenSet, TokenValidator};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Result of a successful [`TokenStore::reload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new set with this many tokens was installed.
    Loaded(usize),
    /// The token file does not exist; the current set was kept.
    Missing,
    /// The token file is empty; the current set was kept.
    Empty,
}

struct Generation {
    tokens: TokenSet,
    number: u64,
}

/// A file-backed, live-reloadable token allow-list.
///
/// Reads and writes of the token set share one mutex, so a query always sees
/// a complete set: the one before a reload or the one after it.
pub struct TokenStore {
    path: PathBuf,
    current: Mutex<Generation>,
    events: EventBus,
}

impl TokenStore {
    /// Create an empty store bound to `path` without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: Mutex::new(Generation {
                tokens: TokenSet::default(),
                number: 0,
            }),
            events: EventBus::default(),
        }
    }

    /// Load the token file at `path` and start watching it for changes.
    ///
    /// The initial load is best-effort: a missing or broken token file is
    /// logged and the store starts empty. Failing to set up the file watcher
    /// is returned, since the store could never pick up changes without it.
    ///
    /// The watch loop runs on the current Tokio runtime for as long as the
    /// runtime lives.
    pub async fn initialize(path: impl Into<PathBuf>) -> Result<Arc<Self>, StoreError> {
        Self::initialize_with_shutdown(path, CancellationToken::new()).await
    }

    /// Like [`TokenStore::initialize`], but the watch loop stops once
    /// `shutdown` is cancelled.
    pub async fn initialize_with_shutdown(
        path: impl Into<PathBuf>,
        shutdown: CancellationToken,
    ) -> Result<Arc<Self>, StoreError> {
        let store = Arc::new(Self::new(path));
        store.start(shutdown).await?;
        Ok(store)
    }

    /// Run the best-effort initial load and start the watch loop.
    ///
    /// Subscribe before calling this to observe the initial load's outcome
    /// on the event bus.
    pub async fn start(self: &Arc<Self>, shutdown: CancellationToken) -> Result<(), StoreError> {
        match self.reload() {
            Ok(outcome) => debug!(?outcome, "initial token load"),
            Err(e) => warn!(error = %e, "initial token load failed, starting with no tokens"),
        }

        let watcher = TokenFileWatcher::new(self.path())?;
        watcher.spawn(Arc::clone(self), shutdown)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True iff an enabled token with this secret is in the current set.
    pub fn is_token_valid(&self, secret: &str) -> bool {
        self.lock().tokens.contains_valid(secret)
    }

    /// Re-read the token file and replace the whole token set.
    ///
    /// A missing or empty file keeps the current set. Read and parse errors
    /// also keep the current set and are returned to the caller.
    pub fn reload(&self) -> Result<ReloadOutcome, StoreError> {
        let contents = match token_file::read_token_file(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                self.events.publish(StoreEvent::ReloadFailed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let outcome = match contents {
            TokenFileContents::Tokens(tokens) => {
                let count = tokens.len();
                self.install(tokens);
                info!(path = %self.path.display(), tokens = count, "token set reloaded");
                self.events.publish(StoreEvent::Reloaded { tokens: count });
                ReloadOutcome::Loaded(count)
            }
            TokenFileContents::Missing => {
                self.events.publish(StoreEvent::ReloadSkipped);
                ReloadOutcome::Missing
            }
            TokenFileContents::Empty => {
                debug!(path = %self.path.display(), "token file is empty, keeping current tokens");
                self.events.publish(StoreEvent::ReloadSkipped);
                ReloadOutcome::Empty
            }
        };

        Ok(outcome)
    }

    /// Drop every token. Used when the token file is removed.
    pub fn clear(&self) {
        self.install(TokenSet::default());
        info!(path = %self.path.display(), "token file removed, all tokens cleared");
        self.events.publish(StoreEvent::Cleared);
    }

    /// A copy of the current token set.
    pub fn snapshot(&self) -> TokenSet {
        self.lock().tokens.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of token sets installed so far by reloads and clears.
    pub fn generation(&self) -> u64 {
        self.lock().number
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, event: StoreEvent) {
        self.events.publish(event);
    }

    pub(crate) fn install(&self, tokens: TokenSet) {
        let mut current = self.lock();
        current.tokens = tokens;
        current.number += 1;
    }

    // Every write replaces the whole generation, so a poisoned lock still
    // guards a complete set.
    fn lock(&self) -> MutexGuard<'_, Generation> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenValidator for TokenStore {
    fn is_token_valid(&self, secret: &str) -> bool {
        TokenStore::is_token_valid(self, secret)
    }
}
