//! Horizon Grid - a tabular data view engine.
//!
//! A [`TabularView`] loads typed rows from JSON, CSV or table markup and
//! derives from them a filtered, sorted, paged and selectable view. The host
//! draws the [`Frame`](view::Frame) snapshots the view publishes and feeds
//! user input back through plain method calls.
//!
//! # Example
//!
//! ```
//! use horizon_grid::prelude::*;
//!
//! let mut view = TabularView::new(GridConfig::default().with_rows_per_page(2));
//! view.load_json(r#"{
//!     "fields": [
//!         {"index": 0, "title": "State"},
//!         {"index": 1, "title": "Qty", "dataType": "int"}
//!     ],
//!     "rows": [
//!         {"cells": ["CA", "12"]},
//!         {"cells": ["NY", "3"]},
//!         {"cells": ["TX", "7"]}
//!     ]
//! }"#)?;
//!
//! view.sort(1, false);
//! view.filter_by_hidden_values(&[0], &["TX"], false);
//!
//! let frame = view.frame().expect("rendered");
//! assert_eq!(frame.rows[0].texts(), ["NY", "3"]);
//! assert_eq!(frame.total_pages, 1);
//!
//! let stale = Predicate::compile(&Expr::column(1).lt(Expr::int(5)), view.fields());
//! assert_eq!(view.delete_rows(&stale), 1);
//! # Ok::<(), GridError>(())
//! ```
//!
//! # Modules
//!
//! - [`model`] - fields, rows, cells and typed compare values
//! - [`source`] - JSON payloads, CSV and markup parsing, remote fetching
//! - [`view`] - the view itself, its signals and frames
//! - [`predicate`] - compiled row predicates for updates and deletes
//! - [`config`] - typed configuration, loadable from TOML
//! - [`registry`] - host-owned registry of views

pub mod config;
pub mod error;
pub mod model;
pub mod predicate;
pub mod prelude;
pub mod registry;
pub mod source;
pub mod view;

pub use config::GridConfig;
pub use error::{GridError, Result};
pub use predicate::{Expr, Predicate};
pub use view::TabularView;

pub use horizon_grid_core::{ConnectionGuard, ConnectionId, Signal};
