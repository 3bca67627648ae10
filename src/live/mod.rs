//! Live change notification for roster
//!
//! Subscriptions deliver an initial snapshot of the matching records, then a
//! fresh snapshot after every mutation that touches the collection, until the
//! subscriber unsubscribes. A failure while producing a snapshot is delivered
//! on the same channel and terminates the subscription; callers re-subscribe
//! explicitly.
//!
//! In-process mutations publish through [`ChangeHub`] directly. Changes made
//! by other processes are picked up by the optional filesystem watcher in
//! [`fswatch`].

pub mod fswatch;
mod hub;

pub use fswatch::FsWatcher;
pub use hub::{ChangeHub, RecordSubscription, Subscription};
