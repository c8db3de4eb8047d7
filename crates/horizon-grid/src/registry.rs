//! Host-owned registry of views.
//!
//! Hosts that manage several views keep them in a [`ViewRegistry`] and refer
//! to them by [`ViewKey`]. Keys are generational: a key to a removed view
//! never resolves to a view inserted later. Views may also carry a unique
//! name.
//!
//! There is no global registry; the host owns the value and shares it as it
//! sees fit, e.g. through [`SharedViewRegistry`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use slotmap::{SlotMap, new_key_type};

use horizon_grid_core::logging::targets;

use crate::error::{GridError, Result};
use crate::view::TabularView;

new_key_type! {
    /// Identifies a view in a [`ViewRegistry`].
    pub struct ViewKey;
}

/// A registry shared between threads.
pub type SharedViewRegistry = Arc<RwLock<ViewRegistry>>;

struct Entry {
    name: Option<String>,
    view: TabularView,
}

/// Views keyed by [`ViewKey`], with optional unique names.
#[derive(Default)]
pub struct ViewRegistry {
    views: SlotMap<ViewKey, Entry>,
    names: HashMap<String, ViewKey>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry wrapped for sharing.
    pub fn shared() -> SharedViewRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Adds an unnamed view.
    pub fn insert(&mut self, view: TabularView) -> ViewKey {
        self.views.insert(Entry { name: None, view })
    }

    /// Adds a view under a unique name.
    pub fn insert_named(&mut self, name: impl Into<String>, view: TabularView) -> Result<ViewKey> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(GridError::name_conflict(name));
        }
        let key = self.views.insert(Entry {
            name: Some(name.clone()),
            view,
        });
        tracing::debug!(target: targets::VIEW, name = %name, "view registered");
        self.names.insert(name, key);
        Ok(key)
    }

    pub fn get(&self, key: ViewKey) -> Option<&TabularView> {
        self.views.get(key).map(|entry| &entry.view)
    }

    pub fn get_mut(&mut self, key: ViewKey) -> Option<&mut TabularView> {
        self.views.get_mut(key).map(|entry| &mut entry.view)
    }

    /// Looks up a view key by name.
    pub fn key_of(&self, name: &str) -> Option<ViewKey> {
        self.names.get(name).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<&TabularView> {
        self.get(self.key_of(name)?)
    }

    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut TabularView> {
        let key = self.key_of(name)?;
        self.get_mut(key)
    }

    /// The name a view was registered under.
    pub fn name_of(&self, key: ViewKey) -> Option<&str> {
        self.views.get(key)?.name.as_deref()
    }

    /// Removes a view, releasing its name.
    pub fn remove(&mut self, key: ViewKey) -> Option<TabularView> {
        let entry = self.views.remove(key)?;
        if let Some(name) = &entry.name {
            self.names.remove(name);
        }
        Some(entry.view)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ViewKey, &TabularView)> {
        self.views.iter().map(|(key, entry)| (key, &entry.view))
    }
}

static_assertions::assert_impl_all!(ViewRegistry: Send, Sync);
