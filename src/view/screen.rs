//! Screen state machine for record management
//!
//! Holds the list, the loading flag, the modal state, and the form, and runs
//! every persistence call through the injected store. There is no optimistic
//! local update: every mutation is followed by a full reload.

use super::form::StudentForm;
use crate::storage::record::Record;
use crate::Store;

/// State of the record management screen.
pub struct RosterScreen {
    store: Store,
    collection: String,
    /// Rows currently displayed.
    pub records: Vec<Record>,
    /// True while a reload is in flight.
    pub loading: bool,
    /// True while the create/edit form is open.
    pub modal_open: bool,
    /// The id being edited; `None` means the form is in create mode.
    pub editing: Option<String>,
    /// The form backing the modal.
    pub form: StudentForm,
    /// Pending user-visible notification, set on any failed operation.
    pub last_error: Option<String>,
    issued_reloads: u64,
}

impl RosterScreen {
    /// Create a screen over the `students` collection.
    pub fn new(store: Store) -> Self {
        Self::with_collection(store, "students")
    }

    /// Create a screen over an arbitrary collection.
    pub fn with_collection(store: Store, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            records: Vec::new(),
            loading: false,
            modal_open: false,
            editing: None,
            form: StudentForm::default(),
            last_error: None,
            issued_reloads: 0,
        }
    }

    /// Full reload of the list. Guarded by a monotonic ticket: if a newer
    /// reload was issued while this one was in flight, its result is
    /// discarded so the latest request always wins.
    pub async fn reload(&mut self) {
        let ticket = self.begin_reload();
        let result = self.store.list_all(&self.collection).await;
        self.apply_reload(ticket, result);
    }

    fn begin_reload(&mut self) -> u64 {
        self.issued_reloads += 1;
        self.loading = true;
        self.issued_reloads
    }

    fn apply_reload(&mut self, ticket: u64, result: crate::Result<Vec<Record>>) {
        if ticket < self.issued_reloads {
            tracing::debug!(ticket, "stale reload discarded");
            return;
        }
        self.loading = false;
        match result {
            Ok(records) => self.records = records,
            Err(e) => {
                tracing::error!(collection = %self.collection, "reload failed: {}", e);
                self.last_error = Some(format!("Failed to load students: {}", e));
            }
        }
    }

    /// Open the modal in create mode with a blank form.
    pub fn open_create(&mut self) {
        self.form.clear();
        self.editing = None;
        self.modal_open = true;
    }

    /// Open the modal in edit mode, populated from the row's current values.
    /// Returns false when no displayed row has the id.
    pub fn open_edit(&mut self, id: &str) -> bool {
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            return false;
        };
        self.form = StudentForm::from_record(record);
        self.editing = Some(id.to_string());
        self.modal_open = true;
        true
    }

    /// Submit the form: update when editing, add otherwise. On success the
    /// form is cleared, the modal closes, and the list reloads. On failure
    /// the modal stays open with the form populated and a notification is
    /// recorded; nothing was applied locally, so there is nothing to roll
    /// back.
    pub async fn submit(&mut self) -> bool {
        if let Err(message) = self.form.validate() {
            self.last_error = Some(message);
            return false;
        }

        let outcome = match self.editing.clone() {
            Some(id) => {
                self.store
                    .update(&self.collection, &id, self.form.to_fields())
                    .await
            }
            None => self
                .store
                .add(&self.collection, self.form.to_fields())
                .await
                .map(|_| ()),
        };

        match outcome {
            Ok(()) => {
                self.form.clear();
                self.editing = None;
                self.modal_open = false;
                self.reload().await;
                true
            }
            Err(e) => {
                tracing::error!(collection = %self.collection, "save failed: {}", e);
                self.last_error = Some(format!("Failed to save student: {}", e));
                false
            }
        }
    }

    /// Delete a row. Without confirmation this is a strict no-op: no store
    /// call is made and the row remains. With confirmation, deletes and
    /// reloads.
    pub async fn delete(&mut self, id: &str, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        match self.store.delete(&self.collection, id).await {
            Ok(()) => {
                self.reload().await;
                true
            }
            Err(e) => {
                tracing::error!(collection = %self.collection, id, "delete failed: {}", e);
                self.last_error = Some(format!("Failed to delete student: {}", e));
                false
            }
        }
    }

    /// Close the modal, discarding form state. No persistence side effects.
    pub fn cancel(&mut self) {
        self.form.clear();
        self.editing = None;
        self.modal_open = false;
    }

    /// Take the pending notification, if any, leaving the slot empty.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }
}
