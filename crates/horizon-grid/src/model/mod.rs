//! The data model of a view: fields, rows, cells and their typed values.
//!
//! Every cell is converted once, when it enters the view, through the data
//! type of its field. The resulting [`CompareValue`] drives sorting, range
//! filters and predicates; the display string drives hidden-value and text
//! filters.

mod data_type;
mod field;
mod row;
mod value;

pub use data_type::{Conversion, DataType, convert_with};
pub use field::{Field, SortState};
pub use row::{Cell, Row, RowId};
pub use value::{CompareValue, DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT};
