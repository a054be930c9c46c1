use tokio::sync::broadcast;

/// Something that happened to a token store.
///
/// Published for failures that never reach a caller (the initial load and
/// anything the background watch loop does) so they stay observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A new token set was installed.
    Reloaded { tokens: usize },
    /// The token file was absent or empty; the current set was kept.
    ReloadSkipped,
    /// Reading or parsing the token file failed; the current set was kept.
    ReloadFailed { error: String },
    /// The token file was removed and the set emptied.
    Cleared,
    /// The file watcher reported an error and kept running.
    WatchError { error: String },
}

pub struct EventBus {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: StoreEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
