//! roster - a file-backed student records manager
//!
//! A small document store with live queries, plus the record-management
//! screen built on top of it. Records live in named collections, one YAML
//! file per record; subscriptions push a fresh snapshot to interested
//! watchers after every mutation.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        roster                            │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────┐  │
//! │  │  rosterq   │  │  Management  │  │   Dashboard      │  │
//! │  │  Filters   │  │  Screen      │  │   Export (tera)  │  │
//! │  └─────┬──────┘  └──────┬───────┘  └────────┬─────────┘  │
//! │        ▼                ▼                   ▼            │
//! │  ┌──────────────────────────────────────────────────────┐│
//! │  │                       Store                          ││
//! │  │   add / set / get / list / query / update / delete   ││
//! │  │            subscribe / subscribe_record              ││
//! │  └──────────────┬──────────────────────┬────────────────┘│
//! │                 ▼                      ▼                 │
//! │  ┌──────────────────────┐  ┌────────────────────────────┐│
//! │  │    Storage Layer     │  │        ChangeHub           ││
//! │  │  (YAML record files) │  │  (snapshot subscriptions)  ││
//! │  └──────────────────────┘  └────────────────────────────┘│
//! │                 │                      ▲                 │
//! │                 ▼                      │                 │
//! │  ┌──────────────────────────────────────────────────────┐│
//! │  │       File System   /collections/{name}/*.yaml       ││
//! │  │              (notify bridge for external edits)      ││
//! │  └──────────────────────────────────────────────────────┘│
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod live;
pub mod query;
pub mod storage;
pub mod validation;
pub mod view;

pub use error::{Error, Result};

use chrono::Utc;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub use live::{FsWatcher, RecordSubscription, Subscription};
pub use rosterq::{Condition, Literal, Operator};
pub use storage::collection::Collection;
pub use storage::record::{Fields, Record, Value};

use validation::{validate_collection_name, validate_record_id};

/// The store handle
///
/// Cheap to clone; all clones share the same subscription hub. Every read
/// goes to the filesystem -- there is no cache -- and every operation may
/// suspend on I/O. Construct one per store directory and inject it into
/// consumers so tests can run against a temporary directory.
#[derive(Clone)]
pub struct Store {
    root: PathBuf,
    hub: live::ChangeHub,
}

impl Store {
    /// Open or create a store at the given path
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let root = path.into();
        let collections = root.join("collections");
        tokio::fs::create_dir_all(&collections)
            .await
            .map_err(|source| Error::FileWriteError {
                path: collections,
                source,
            })?;

        Ok(Self {
            root,
            hub: live::ChangeHub::new(),
        })
    }

    /// Root path of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the collections directory
    pub fn collections_root(&self) -> PathBuf {
        self.root.join("collections")
    }

    fn collection(&self, name: &str) -> Result<Collection> {
        validate_collection_name(name)?;
        Ok(Collection::open(name, &self.root))
    }

    /// Insert a record under a store-generated identifier and return it.
    /// Both timestamps are stamped with the current time.
    pub async fn add(&self, collection: &str, fields: Fields) -> Result<String> {
        let coll = self.collection(collection)?;
        let id = Uuid::new_v4().to_string();
        let record = Record::new(&id, fields);
        coll.write(&record).await?;
        tracing::debug!(collection, id = %record.id, "record added");

        self.refresh_subscribers(collection).await;
        Ok(id)
    }

    /// Insert or fully replace the record at a caller-supplied identifier.
    ///
    /// Both timestamps are stamped unconditionally: re-`set`ting an existing
    /// id overwrites its original creation time. Callers who need to retain
    /// the creation time should `get` first and `set` the merged result, or
    /// use [`Store::update`].
    pub async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let coll = self.collection(collection)?;
        validate_record_id(id)?;
        let record = Record::new(id, fields);
        coll.write(&record).await?;
        tracing::debug!(collection, id, "record set");

        self.refresh_subscribers(collection).await;
        Ok(())
    }

    /// Fetch one record; `Ok(None)` when absent.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>> {
        let coll = self.collection(collection)?;
        validate_record_id(id)?;
        coll.get(id).await
    }

    /// Every record in the collection, in store order. No pagination;
    /// bounding the result size is the caller's concern.
    pub async fn list_all(&self, collection: &str) -> Result<Vec<Record>> {
        let coll = self.collection(collection)?;
        coll.list().await
    }

    /// Records matching a conjunction of conditions, optionally ordered
    /// ascending by one field and capped. An empty condition list behaves
    /// exactly like [`Store::list_all`]. Conditions and ordering may
    /// reference the pseudo-fields `id`, `createdAt`, and `updatedAt`;
    /// records missing a referenced field never match and sort first.
    pub async fn query(
        &self,
        collection: &str,
        conditions: &[Condition],
        order_by: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        let coll = self.collection(collection)?;
        let records = coll.list().await?;
        Ok(query::run(records, conditions, order_by, limit))
    }

    /// Merge the given fields into an existing record, leaving unmentioned
    /// fields untouched; bumps the update timestamp only.
    pub async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let coll = self.collection(collection)?;
        validate_record_id(id)?;

        let mut record =
            coll.get(id)
                .await?
                .ok_or_else(|| Error::RecordNotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                })?;
        record.fields.extend(fields);
        record.updated_at = Utc::now();
        coll.write(&record).await?;
        tracing::debug!(collection, id, "record updated");

        self.refresh_subscribers(collection).await;
        Ok(())
    }

    /// Remove a record. Deleting an absent identifier is a no-op.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let coll = self.collection(collection)?;
        validate_record_id(id)?;
        let existed = coll.delete(id).await?;
        tracing::debug!(collection, id, existed, "record deleted");

        if existed {
            self.refresh_subscribers(collection).await;
        }
        Ok(())
    }

    /// Subscribe to the set of records matching the conditions. The
    /// subscription yields the current matching set immediately, then a fresh
    /// snapshot after every mutation of the collection.
    pub async fn subscribe(
        &self,
        collection: &str,
        conditions: Vec<Condition>,
    ) -> Result<Subscription> {
        let coll = self.collection(collection)?;
        let current = coll.list().await?;
        Ok(self.hub.register_query(collection, conditions, current))
    }

    /// Subscribe to a single record; yields `None` when it is deleted or
    /// never existed.
    pub async fn subscribe_record(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<RecordSubscription> {
        let coll = self.collection(collection)?;
        validate_record_id(id)?;
        let current = coll.get(id).await?;
        Ok(self.hub.register_record(collection, id, current))
    }

    /// Start the notify-based bridge that refreshes subscribers when record
    /// files change on disk (edits made by other processes).
    pub fn watch_files(&self) -> Result<FsWatcher> {
        live::fswatch::spawn(self.clone())
    }

    /// Re-read a collection and push snapshots to its watchers. A failed
    /// read terminates those subscriptions with an error.
    pub(crate) async fn refresh_subscribers(&self, collection: &str) {
        if !self.hub.has_watchers(collection) {
            return;
        }
        match Collection::open(collection, &self.root).list().await {
            Ok(records) => self.hub.publish(collection, &records),
            Err(e) => self.hub.publish_error(collection, &e.to_string()),
        }
    }
}
