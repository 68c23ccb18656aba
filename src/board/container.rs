use std::rc::Rc;

use crate::board::item::{Item, ItemField};
use crate::board::BoardContext;
use crate::store::{ItemStore, StoreError};

/// Persistence identity of a container. The holding area is a singleton;
/// a tier's identity is derived from its (mutable) color and name, so a
/// rename changes the key the container saves under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContainerKey {
    HoldingArea,
    Tier { color: String, name: String },
}

impl ContainerKey {
    /// The string key the container's record is stored under
    pub fn storage_key(&self) -> String {
        match self {
            ContainerKey::HoldingArea => "holding-area".to_string(),
            ContainerKey::Tier { color, name } => format!("tier_{}_{}", color, name),
        }
    }
}

/// The in-memory ordered item list for one container.
///
/// The model is the sole mutator of its list and is authoritative for the
/// session: every public mutation persists through the ItemStore afterwards,
/// and a persistence failure is reported but never rolls the list back.
pub struct ContainerModel {
    key: ContainerKey,
    group: String,
    items: Vec<Item>,
    store: Rc<ItemStore>,
    ctx: Rc<BoardContext>,
}

impl ContainerModel {
    /// Create the model for a container, loading its persisted list.
    /// A container that was never saved starts empty.
    pub fn load(
        key: ContainerKey,
        group: &str,
        store: Rc<ItemStore>,
        ctx: Rc<BoardContext>,
    ) -> Result<Self, StoreError> {
        let items = store.load(&key.storage_key())?;
        Ok(ContainerModel {
            key,
            group: group.to_string(),
            items,
            store,
            ctx,
        })
    }

    pub fn key(&self) -> &ContainerKey {
        &self.key
    }

    /// The drag group this container belongs to. Containers in the same
    /// group can exchange items mid-drag.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The ordered item list; order is exactly the rendering order.
    pub fn list(&self) -> &[Item] {
        &self.items
    }

    /// Append an item at the end of the list
    pub fn append(&mut self, item: Item) {
        self.items.push(item);
        self.persist();
    }

    /// Remove the item with the given id. Idempotent: removing an id that
    /// is not present is a no-op.
    pub fn remove_by_id(&mut self, id: i64) {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    /// Replace `link_url` or `notes` on the matching item, preserving its
    /// position. Unknown ids are ignored.
    pub fn update_field(&mut self, id: i64, field: ItemField, value: String) {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return;
        };
        match field {
            ItemField::LinkUrl => item.link_url = Some(value),
            ItemField::Notes => item.notes = Some(value),
        }
        self.persist();
    }

    /// Atomically swap the entire ordered list (drag reordering and
    /// cross-container transfer go through this or the indexed helpers).
    pub fn replace_all(&mut self, items: Vec<Item>) {
        self.items = items;
        self.persist();
    }

    /// Re-derive the storage key after a tier's color or name was edited.
    /// The in-memory list is carried over and saved under the new key; the
    /// old key's record is deleted so it does not linger as an orphan.
    /// No-op on the holding area, whose identity never changes.
    pub fn set_tier_identity(&mut self, color: String, name: String) {
        let ContainerKey::Tier { .. } = self.key else {
            return;
        };
        let old_key = self.key.storage_key();
        self.key = ContainerKey::Tier { color, name };
        self.persist();
        if let Err(e) = self.store.remove(&old_key) {
            eprintln!("Failed to drop old tier record {}: {}", old_key, e);
        }
    }

    /// Remove and return the item at `index` without persisting.
    /// Used by the board's move operation, which persists both sides once
    /// the whole transfer has been applied in memory.
    pub(crate) fn take_at(&mut self, index: usize) -> Option<Item> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Insert at `index` (clamped to the list length) without persisting
    pub(crate) fn insert_at(&mut self, index: usize, item: Item) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Write the current list through the store. Capacity failures surface
    /// one user-visible warning per failed save; the in-memory list stays
    /// authoritative either way.
    pub(crate) fn persist(&self) {
        match self.store.save(&self.key.storage_key(), &self.items) {
            Ok(()) => {}
            Err(StoreError::CapacityExceeded { .. }) => {
                self.ctx
                    .warn("Board storage is full; the latest change was not saved");
            }
            Err(e) => {
                eprintln!("Failed to persist {}: {}", self.key.storage_key(), e);
            }
        }
    }
}

impl std::fmt::Debug for ContainerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerModel")
            .field("key", &self.key)
            .field("items", &self.items.len())
            .finish()
    }
}
