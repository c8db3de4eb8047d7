//! Typed view configuration.
//!
//! Configuration is plain data with named fields and validated enumerated
//! values. It can be built in code or read from TOML:
//!
//! ```
//! use horizon_grid::config::GridConfig;
//! use horizon_grid::view::SelectionMode;
//!
//! let config = GridConfig::from_toml_str(r#"
//! rows-per-page = 25
//! selection-mode = "single"
//! deferred-render = true
//!
//! [initial-sort]
//! column = 2
//! descending = true
//! "#).unwrap();
//!
//! assert_eq!(config.rows_per_page, 25);
//! assert_eq!(config.selection_mode, SelectionMode::Single);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::view::{PagingMode, SelectionMode, SelectionUnit};

/// Upper bound for `rows-per-page`.
pub const MAX_ROWS_PER_PAGE: usize = 100_000;

/// A sort applied once after each load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InitialSort {
    pub column: usize,
    #[serde(default)]
    pub descending: bool,
}

/// Configuration of a [`TabularView`](crate::TabularView).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GridConfig {
    /// Rows per page; `0` shows every filtered row on a single page.
    pub rows_per_page: usize,
    pub selection_mode: SelectionMode,
    pub selection_unit: SelectionUnit,
    pub initial_sort: Option<InitialSort>,
    /// Coalesce re-renders until the host calls `tick()`.
    pub deferred_render: bool,
    pub paging: PagingMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows_per_page: 0,
            selection_mode: SelectionMode::default(),
            selection_unit: SelectionUnit::default(),
            initial_sort: None,
            deferred_render: false,
            paging: PagingMode::default(),
        }
    }
}

impl GridConfig {
    /// Parses and validates TOML configuration.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| GridError::io(path, err))?;
        Self::from_toml_str(&text)
    }

    /// Rejects settings no view can honour.
    pub fn validate(&self) -> Result<()> {
        if self.rows_per_page > MAX_ROWS_PER_PAGE {
            return Err(GridError::invalid_config(
                "rows-per-page",
                format!("{} exceeds the maximum of {MAX_ROWS_PER_PAGE}", self.rows_per_page),
            ));
        }
        if self.paging == PagingMode::Remote && self.rows_per_page == 0 {
            return Err(GridError::invalid_config(
                "rows-per-page",
                "remote paging needs a page size",
            ));
        }
        Ok(())
    }

    pub fn with_rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = rows_per_page;
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    pub fn with_selection_unit(mut self, unit: SelectionUnit) -> Self {
        self.selection_unit = unit;
        self
    }

    pub fn with_initial_sort(mut self, column: usize, descending: bool) -> Self {
        self.initial_sort = Some(InitialSort { column, descending });
        self
    }

    pub fn with_deferred_render(mut self, deferred: bool) -> Self {
        self.deferred_render = deferred;
        self
    }

    pub fn with_paging(mut self, paging: PagingMode) -> Self {
        self.paging = paging;
        self
    }
}
