//! Data sources for loading a view.
//!
//! Every source produces a [`Payload`]; the view loads payloads only.

mod csv_source;
mod markup;
mod payload;
mod remote;

pub use csv_source::{CsvOptions, parse_csv, read_csv};
pub use markup::parse_markup;
pub use payload::{CellSpec, FieldSpec, Payload, RowSpec};
pub use remote::{DataFetcher, FetchRequest, SortKey};

pub(crate) use remote::RemoteState;
