//! Core systems for shared-selection.
//!
//! [`Signal`] carries notifications, [`Property`] detects changes, and
//! [`logging`] names the `tracing` targets shared by the workspace. Slots run
//! on the emitting thread, before `emit` returns.
//!
//! # Example
//!
//! ```
//! use shared_selection_core::{Property, Signal};
//!
//! struct Choice {
//!     index: Property<Option<usize>>,
//!     index_changed: Signal<Option<usize>>,
//! }
//!
//! impl Choice {
//!     fn select(&self, index: Option<usize>) {
//!         if self.index.set(index) {
//!             self.index_changed.emit(index);
//!         }
//!     }
//! }
//!
//! let choice = Choice { index: Property::new(None), index_changed: Signal::new() };
//! let id = choice.index_changed.connect(|index| println!("now {index:?}"));
//! choice.select(Some(1));
//! choice.select(Some(1)); // no emission
//! choice.index_changed.disconnect(id);
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionId, Signal};
