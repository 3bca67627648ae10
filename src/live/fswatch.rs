//! Filesystem bridge for subscriptions
//!
//! Watches the `collections/` tree with notify and refreshes subscribers
//! whenever a record file changes on disk. This is how a watching process
//! observes mutations made by *other* processes; in-process mutations publish
//! directly and do not need it. Running the watcher alongside in-process
//! writes can deliver an extra identical snapshot per write.

use crate::error::Result;
use crate::Store;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use tokio::sync::mpsc;

/// Keeps the underlying watcher alive; dropping it stops the bridge.
pub struct FsWatcher {
    _watcher: RecommendedWatcher,
}

/// Start watching the store's collections directory.
///
/// Must be called from within a tokio runtime; the forwarding task exits when
/// the watcher is dropped.
pub fn spawn(store: Store) -> Result<FsWatcher> {
    let collections_root = store.collections_root();
    let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();

    // The notify callback runs on the watcher's own thread; hand paths over
    // to the async side through an unbounded channel.
    let mut watcher =
        notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
            Err(e) => tracing::error!("file watcher error: {}", e),
        })?;
    watcher.watch(&collections_root, RecursiveMode::Recursive)?;
    tracing::info!(path = %collections_root.display(), "watching collections for external changes");

    tokio::spawn(async move {
        while let Some(path) = rx.recv().await {
            if let Some(collection) = collection_of(&collections_root, &path) {
                store.refresh_subscribers(&collection).await;
            }
        }
    });

    Ok(FsWatcher { _watcher: watcher })
}

/// Map an event path back to the collection it belongs to.
fn collection_of(collections_root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(collections_root).ok()?;
    match rel.components().next()? {
        Component::Normal(name) => name.to_str().map(str::to_string),
        _ => None,
    }
}
