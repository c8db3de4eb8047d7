//! Commonly used types.
//!
//! ```
//! use horizon_grid::prelude::*;
//! ```

pub use crate::config::GridConfig;
pub use crate::error::{GridError, Result};
pub use crate::model::{DataType, Field, Row, RowId, SortState};
pub use crate::predicate::{Expr, Predicate};
pub use crate::registry::{ViewKey, ViewRegistry};
pub use crate::source::{CsvOptions, FieldSpec, Payload, RowSpec};
pub use crate::view::traits::{Filterable, Loadable, Paginated, Selectable, Sortable};
pub use crate::view::{ClickModifiers, InsertPosition, PagingMode, SelectionMode, SelectionUnit, TabularView};
