//! Core token file watcher implementation.
//!
//! Contains the [`TokenFileWatcher`] struct that watches the directory of a
//! token file with the `notify` crate and drives a [`TokenStore`] from the
//! events that concern the file.

use crate::store::TokenStore;
use crate::token_file::resolve_token_file_path;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokenauth_common::{StoreError, StoreEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// What a filesystem event asks the store to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Reload,
    Clear,
}

/// Map a directory event to a store action for the file at `target`.
///
/// Content writes reload and removals clear. Creates, renames, metadata
/// changes, and events for other files in the directory are ignored.
/// A rescan request (the backend dropped events) always reloads.
pub fn classify(event: &Event, target: &Path) -> Option<FileAction> {
    if event.need_rescan() {
        return Some(FileAction::Reload);
    }

    if !event.paths.iter().any(|p| p == target) {
        return None;
    }

    match event.kind {
        EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other) => {
            Some(FileAction::Reload)
        }
        EventKind::Remove(_) => Some(FileAction::Clear),
        _ => None,
    }
}

/// Watches a token file and keeps a store in sync with it.
///
/// The file's parent directory is watched rather than the file, so the file
/// may be absent at startup, deleted, and recreated.
pub struct TokenFileWatcher {
    target: PathBuf,
}

impl TokenFileWatcher {
    /// Resolve `path` for watching. Fails if its directory cannot be resolved.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let target = resolve_token_file_path(path)?;
        if !target.exists() {
            warn!(
                "token file {} does not exist yet, will watch for creation",
                target.display()
            );
        }

        Ok(Self { target })
    }

    /// Absolute path events are matched against.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Start watching and spawn the event loop on the current Tokio runtime.
    ///
    /// Setup errors are returned here. Once running, watcher errors are
    /// logged and published, and the loop keeps going until `shutdown` is
    /// cancelled.
    pub fn spawn(
        self,
        store: Arc<TokenStore>,
        shutdown: CancellationToken,
    ) -> Result<JoinHandle<()>, StoreError> {
        let dir = self
            .target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                StoreError::Watch(format!("{} has no parent directory", self.target.display()))
            })?;

        // Bridge the sync notify callback into async. Unbounded so that no
        // write event is ever dropped.
        let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                let _ = event_tx.send(result);
            },
            notify::Config::default(),
        )
        .map_err(|e| StoreError::Watch(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| StoreError::Watch(format!("failed to watch {}: {e}", dir.display())))?;

        info!("watching token file {}", self.target.display());

        let target = self.target;
        Ok(tokio::spawn(async move {
            run_event_loop(watcher, event_rx, store, target, shutdown).await;
        }))
    }
}

/// Apply watcher events to `store` until `shutdown` is cancelled.
///
/// `watcher` is held for the loop's lifetime and never touched otherwise;
/// dropping a notify watcher stops event delivery.
pub(crate) async fn run_event_loop<W: Send + 'static>(
    watcher: W,
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    store: Arc<TokenStore>,
    target: PathBuf,
    shutdown: CancellationToken,
) {
    let _watcher = watcher;

    loop {
        let result = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("token file watcher shutting down");
                break;
            }
            msg = event_rx.recv() => match msg {
                Some(result) => result,
                None => {
                    warn!("token file watcher channel closed");
                    break;
                }
            },
        };

        let event = match result {
            Ok(event) => event,
            Err(e) => {
                error!("token file watcher error: {e}");
                store.publish(StoreEvent::WatchError {
                    error: e.to_string(),
                });
                continue;
            }
        };

        match classify(&event, &target) {
            Some(FileAction::Reload) => {
                debug!(kind = ?event.kind, "token file written");
                if let Err(e) = store.reload() {
                    warn!(error = %e, "token reload failed, keeping previous tokens");
                }
            }
            Some(FileAction::Clear) => store.clear(),
            None => trace!(kind = ?event.kind, paths = ?event.paths, "ignoring event"),
        }
    }
}
