//! Shared collections and the selection trackers that follow them.
//!
//! # Core Types
//!
//! - `OrderedUniqueCollection`: insertion-ordered set with structural signals
//! - `SharedCollection`: the collection several consumers display, with the
//!   two-phase bulk `update`
//! - `SelectionTracker`: one consumer's selection, preserved across updates
//! - `MutationTracker`: a tracker with the extra mutation rules
//! - `TrackerPolicy`: configuration of a tracker
//!
//! # Notification Flow
//!
//! ```text
//!                  update(new)
//!                      │
//!                      ▼
//! ┌──────────────────────────────────┐   before_update / after_update
//! │         SharedCollection         │──────────────────────────────┐
//! │  ┌────────────────────────────┐  │                              ▼
//! │  │  OrderedUniqueCollection   │  │ rows_inserted      ┌──────────────────┐
//! │  │  (batch: one catch-up)     │──┼──rows_removed─────>│ SelectionTracker │
//! │  └────────────────────────────┘  │                    └──────────────────┘
//! └──────────────────────────────────┘                              │
//!                ▲                       contents_changed(Tracker)  │
//!                └──────────────────────────────────────────────────┘
//! ```
//!
//! Structural signals and update observers are separate registries.
//! Structural signals describe row changes of any mutation; update observers
//! only see bulk updates, with both the old and the new contents.

mod collection;
pub mod heuristics;
mod hint;
mod item;
mod mutation;
mod observer;
mod policy;
mod shared;
mod tracker;

pub use collection::{ChangeSource, CollectionSignals, ContentsChange, OrderedUniqueCollection};
pub use heuristics::{Resolution, Rule};
pub use hint::{compute_display_hint, display_width};
pub use item::Item;
pub use mutation::MutationTracker;
pub use observer::{UpdateObserver, UpdateObservers, UpdateSnapshot};
pub use policy::{MutationPolicy, SelectionPolicy, TrackerPolicy};
pub use shared::{SharedCollection, SharedCollectionBuilder};
pub use tracker::{SelectionTracker, TrackerId};
