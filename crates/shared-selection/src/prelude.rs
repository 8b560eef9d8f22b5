//! Prelude module for shared-selection.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use shared_selection::prelude::*;
//! ```

// ============================================================================
// Signal/Slot and Property System
// ============================================================================

pub use shared_selection_core::{ConnectionId, Property, Signal};

// ============================================================================
// Collections and Trackers
// ============================================================================

pub use crate::model::{
    ChangeSource, ContentsChange, Item, MutationPolicy, MutationTracker, OrderedUniqueCollection,
    SelectionPolicy, SelectionTracker, SharedCollection, TrackerPolicy, UpdateObserver,
    UpdateSnapshot,
};

// ============================================================================
// Table Rows
// ============================================================================

pub use crate::row::{CellValue, ColumnKind, RowEntry};
pub use crate::RowError;
