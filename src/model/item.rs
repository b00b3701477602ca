use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::Handle;

/// An object that can be picked up and thrown (a slipper, say).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarryableItem {
    pub name: String,
    /// Link to the item's physical representation
    pub handle: Handle,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Radius of the random spread added to the throw direction
    #[serde(default = "default_accuracy")]
    pub accuracy: f32,
}

fn default_mass() -> f32 { 1.0 }
fn default_accuracy() -> f32 { 0.1 }

impl CarryableItem {
    pub fn new(name: impl Into<String>, handle: Handle) -> Self {
        Self {
            name: name.into(),
            handle,
            mass: default_mass(),
            accuracy: default_accuracy(),
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = accuracy;
        self
    }
}

/// All carryable items known to the interaction controller, indexed by handle.
#[derive(Debug, Default, Clone)]
pub struct ItemRegistry {
    items: Vec<CarryableItem>,
    index: HashMap<Handle, usize>,
}

impl ItemRegistry {
    pub fn new() -> Self { Self::default() }

    /// Register an item. Re-registering a handle replaces the previous definition.
    pub fn register(&mut self, item: CarryableItem) {
        if let Some(&idx) = self.index.get(&item.handle) {
            warn!(handle = item.handle.0, name = %item.name, "replacing carryable item registered under the same handle");
            self.items[idx] = item;
            return;
        }
        self.index.insert(item.handle, self.items.len());
        self.items.push(item);
    }

    pub fn get(&self, handle: Handle) -> Option<&CarryableItem> {
        self.index.get(&handle).and_then(|&idx| self.items.get(idx))
    }

    pub fn contains(&self, handle: Handle) -> bool { self.index.contains_key(&handle) }

    pub fn len(&self) -> usize { self.items.len() }

    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &CarryableItem> { self.items.iter() }
}

impl FromIterator<CarryableItem> for ItemRegistry {
    fn from_iter<T: IntoIterator<Item = CarryableItem>>(iter: T) -> Self {
        let mut registry = Self::new();
        for item in iter {
            registry.register(item);
        }
        registry
    }
}
