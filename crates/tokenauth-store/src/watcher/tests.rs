//! Tests for the token file watcher.

use super::*;
use crate::store::TokenStore;
use notify::event::{
    AccessKind, AccessMode, CreateKind, DataChange, Flag, MetadataKind, ModifyKind, RemoveKind,
    RenameMode,
};
use notify::{Event, EventKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokenauth_common::StoreEvent;
use tokio_util::sync::CancellationToken;

fn event(kind: EventKind, path: &Path) -> Event {
    Event::new(kind).add_path(path.to_path_buf())
}

/// Poll `condition` until it holds or five seconds pass.
async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

#[test]
fn content_writes_reload() {
    let target = PathBuf::from("/srv/auth/tokens.yml");
    for kind in [
        EventKind::Modify(ModifyKind::Data(DataChange::Content)),
        EventKind::Modify(ModifyKind::Data(DataChange::Any)),
        EventKind::Modify(ModifyKind::Any),
        EventKind::Modify(ModifyKind::Other),
    ] {
        assert_eq!(classify(&event(kind, &target), &target), Some(FileAction::Reload));
    }
}

#[test]
fn removals_clear() {
    let target = PathBuf::from("/srv/auth/tokens.yml");
    let e = event(EventKind::Remove(RemoveKind::File), &target);
    assert_eq!(classify(&e, &target), Some(FileAction::Clear));

    let e = event(EventKind::Remove(RemoveKind::Any), &target);
    assert_eq!(classify(&e, &target), Some(FileAction::Clear));
}

#[test]
fn other_kinds_are_ignored() {
    let target = PathBuf::from("/srv/auth/tokens.yml");
    for kind in [
        EventKind::Create(CreateKind::File),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)),
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
        EventKind::Access(AccessKind::Close(AccessMode::Write)),
        EventKind::Any,
    ] {
        assert_eq!(classify(&event(kind, &target), &target), None, "{kind:?}");
    }
}

#[test]
fn events_for_other_files_are_ignored() {
    let target = PathBuf::from("/srv/auth/tokens.yml");
    let sibling = PathBuf::from("/srv/auth/tokens.yml.bak");
    let write = EventKind::Modify(ModifyKind::Data(DataChange::Content));

    assert_eq!(classify(&event(write, &sibling), &target), None);
    assert_eq!(
        classify(&event(EventKind::Remove(RemoveKind::File), &sibling), &target),
        None
    );
    assert_eq!(classify(&Event::new(write), &target), None);
}

#[test]
fn rescan_reloads_even_without_paths() {
    let target = PathBuf::from("/srv/auth/tokens.yml");
    let overflow = Event::new(EventKind::Other).set_flag(Flag::Rescan);
    assert_eq!(classify(&overflow, &target), Some(FileAction::Reload));
}

#[test]
fn watcher_new_with_nonexistent_file_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let watcher = TokenFileWatcher::new(&dir.path().join("tokens.yml")).unwrap();
    assert!(watcher.target().is_absolute());
    assert!(watcher.target().ends_with("tokens.yml"));
}

#[test]
fn watcher_new_with_nonexistent_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = TokenFileWatcher::new(&dir.path().join("missing").join("tokens.yml"));
    assert!(result.is_err());
}

#[tokio::test]
async fn write_reloads_and_remove_clears() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.yml");
    let store = Arc::new(TokenStore::new(&path));
    let shutdown = CancellationToken::new();

    TokenFileWatcher::new(&path)
        .unwrap()
        .spawn(Arc::clone(&store), shutdown.clone())
        .unwrap();

    std::fs::write(&path, "tokens: [{name: a, token: abc}]\n").unwrap();
    assert!(eventually(|| store.is_token_valid("abc")).await);

    std::fs::remove_file(&path).unwrap();
    assert!(eventually(|| !store.is_token_valid("abc")).await);
    assert!(store.is_empty());

    std::fs::write(&path, "tokens: [{name: a, token: abc}]\n").unwrap();
    assert!(eventually(|| store.is_token_valid("abc")).await);

    shutdown.cancel();
}

#[tokio::test]
async fn sibling_removal_does_not_clear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.yml");
    let sibling = dir.path().join("notes.txt");
    std::fs::write(&path, "tokens: [{name: a, token: abc}]\n").unwrap();
    std::fs::write(&sibling, "unrelated").unwrap();

    let store = Arc::new(TokenStore::new(&path));
    store.reload().unwrap();
    let mut events = store.subscribe();
    let shutdown = CancellationToken::new();

    TokenFileWatcher::new(&path)
        .unwrap()
        .spawn(Arc::clone(&store), shutdown.clone())
        .unwrap();

    std::fs::remove_file(&sibling).unwrap();
    // Rewriting the token file acts as a barrier: its reload is published
    // after anything the sibling removal could have caused.
    std::fs::write(&path, "tokens: [{name: a, token: abc}, {name: b, token: def}]\n").unwrap();

    let first_reload = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await.unwrap() {
                StoreEvent::Reloaded { tokens } => break tokens,
                StoreEvent::Cleared => panic!("sibling removal cleared the store"),
                _ => continue,
            }
        }
    })
    .await
    .unwrap();

    assert!(first_reload >= 1);
    assert!(eventually(|| store.is_token_valid("def")).await);
    assert!(store.is_token_valid("abc"));

    shutdown.cancel();
}

#[tokio::test]
async fn malformed_write_keeps_previous_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.yml");
    std::fs::write(&path, "tokens: [{name: a, token: abc}]\n").unwrap();

    let store = Arc::new(TokenStore::new(&path));
    store.reload().unwrap();
    let mut events = store.subscribe();
    let shutdown = CancellationToken::new();

    TokenFileWatcher::new(&path)
        .unwrap()
        .spawn(Arc::clone(&store), shutdown.clone())
        .unwrap();

    std::fs::write(&path, "tokens: [{name: a, token: \"abc\"\n").unwrap();

    let error = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let StoreEvent::ReloadFailed { error } = events.recv().await.unwrap() {
                break error;
            }
        }
    })
    .await
    .unwrap();

    assert!(error.contains("tokens.yml"));
    assert!(store.is_token_valid("abc"));

    shutdown.cancel();
}

#[tokio::test]
async fn cancelled_loop_stops_reacting() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.yml");
    let store = Arc::new(TokenStore::new(&path));
    let shutdown = CancellationToken::new();

    let handle = TokenFileWatcher::new(&path)
        .unwrap()
        .spawn(Arc::clone(&store), shutdown.clone())
        .unwrap();

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    std::fs::write(&path, "tokens: [{name: a, token: abc}]\n").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!store.is_token_valid("abc"));
    assert_eq!(store.generation(), 0);
}

#[tokio::test]
async fn watcher_error_is_published_and_loop_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.yml");
    let store = Arc::new(TokenStore::new(&path));
    let mut events = store.subscribe();
    let shutdown = CancellationToken::new();
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();

    let handle = tokio::spawn(run_event_loop(
        (),
        event_rx,
        Arc::clone(&store),
        path.clone(),
        shutdown.clone(),
    ));

    event_tx.send(Err(notify::Error::generic("boom"))).unwrap();
    std::fs::write(&path, "tokens: [{name: a, token: abc}]\n").unwrap();
    event_tx
        .send(Ok(event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &path,
        )))
        .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(first, StoreEvent::WatchError { error } if error.contains("boom")));

    let second = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second, StoreEvent::Reloaded { tokens: 1 });
    assert!(store.is_token_valid("abc"));

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn rescan_event_reloads_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tokens.yml");
    std::fs::write(&path, "tokens: [{name: a, token: abc}]\n").unwrap();
    let store = Arc::new(TokenStore::new(&path));
    let shutdown = CancellationToken::new();
    let (event_tx, event_rx) = tokio::sync::mpsc::unbounded_channel();

    tokio::spawn(run_event_loop(
        (),
        event_rx,
        Arc::clone(&store),
        path.clone(),
        shutdown.clone(),
    ));

    event_tx
        .send(Ok(Event::new(EventKind::Other).set_flag(Flag::Rescan)))
        .unwrap();
    assert!(eventually(|| store.is_token_valid("abc")).await);

    shutdown.cancel();
}
