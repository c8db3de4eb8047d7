//! Core systems for Horizon Grid.
//!
//! This crate provides the foundational pieces shared by the grid crates:
//!
//! - **Signal/Slot System**: Type-safe change notifications from a view to its host
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
